//! Chained vehicle routing fixtures.
//!
//! Every vehicle anchors one chain of customers. A customer's `previous`
//! variable points at its vehicle or at the customer visited before it; the
//! `next` and `vehicle` shadows are maintained by the trailing-entity and
//! anchor listeners.

use optiplan_core::domain::listener::{
    AnchorVariableListener, TrailingEntityListener, VariableListenerGraph,
};
use optiplan_core::domain::{
    ChainedVariableAccessor, EntityDescriptor, ShadowKind, VariableAccessor, VariableDescriptor,
};
use optiplan_core::{
    ChainValue, HardSoftScore, PlanningSolution, Result, SolutionDescriptor, ValueRange,
};
use optiplan_scoring::{ConstraintSetBackend, DefaultScoreDirectorFactory, UniConstraint};

#[derive(Clone, Debug, PartialEq)]
pub struct Vehicle {
    pub id: u64,
    /// Depot position on a line.
    pub depot: i64,
    /// Shadow: first customer of the chain.
    pub next_customer: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: u64,
    pub location: i64,
    pub previous: Option<ChainValue>,
    /// Shadow: the customer trailing this one.
    pub next: Option<usize>,
    /// Shadow: the anchor of this customer's chain.
    pub vehicle: Option<usize>,
    /// A vehicle that must not visit this customer.
    pub forbidden_vehicle: Option<usize>,
}

impl Customer {
    pub fn new(id: u64, location: i64) -> Self {
        Self {
            id,
            location,
            previous: None,
            next: None,
            vehicle: None,
            forbidden_vehicle: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RoutingSolution {
    pub vehicles: Vec<Vehicle>,
    pub customers: Vec<Customer>,
    pub score: Option<HardSoftScore>,
}

impl RoutingSolution {
    /// Vehicles at the given depots and unassigned customers at `locations`.
    pub fn new(depots: &[i64], locations: &[i64]) -> Self {
        Self {
            vehicles: depots
                .iter()
                .enumerate()
                .map(|(i, &depot)| Vehicle {
                    id: i as u64,
                    depot,
                    next_customer: None,
                })
                .collect(),
            customers: locations
                .iter()
                .enumerate()
                .map(|(i, &location)| Customer::new(i as u64, location))
                .collect(),
            score: None,
        }
    }

    /// Assigns chains directly, e.g. `[vec![0, 1], vec![2]]`. Shadows are
    /// left for the listeners to fill in.
    pub fn with_routes(mut self, routes: &[Vec<usize>]) -> Self {
        for (vehicle, route) in routes.iter().enumerate() {
            let mut previous = ChainValue::Anchor(vehicle);
            for &customer in route {
                self.customers[customer].previous = Some(previous);
                previous = ChainValue::Entity(customer);
            }
        }
        self
    }

    /// Customers of one vehicle in visiting order, following the shadows.
    pub fn route(&self, vehicle: usize) -> Vec<usize> {
        let mut route = Vec::new();
        let mut current = self.vehicles[vehicle].next_customer;
        while let Some(customer) = current {
            route.push(customer);
            current = self.customers[customer].next;
        }
        route
    }

    fn location_of(&self, value: ChainValue) -> i64 {
        match value {
            ChainValue::Anchor(v) => self.vehicles[v].depot,
            ChainValue::Entity(c) => self.customers[c].location,
        }
    }
}

impl PlanningSolution for RoutingSolution {
    type Score = HardSoftScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

fn customer_count(s: &RoutingSolution) -> usize {
    s.customers.len()
}

pub fn chain_accessor() -> ChainedVariableAccessor<RoutingSolution> {
    ChainedVariableAccessor {
        previous: VariableAccessor::new(
            |s: &RoutingSolution, i| s.customers[i].previous,
            |s: &mut RoutingSolution, i, v| s.customers[i].previous = v,
        ),
        next: |s: &RoutingSolution, v| match v {
            ChainValue::Anchor(a) => s.vehicles[a].next_customer,
            ChainValue::Entity(e) => s.customers[e].next,
        },
        set_next: |s: &mut RoutingSolution, v, next| match v {
            ChainValue::Anchor(a) => s.vehicles[a].next_customer = next,
            ChainValue::Entity(e) => s.customers[e].next = next,
        },
        anchor_count: |s: &RoutingSolution| s.vehicles.len(),
    }
}

fn chain_values(s: &RoutingSolution) -> Vec<ChainValue> {
    (0..s.vehicles.len())
        .map(ChainValue::Anchor)
        .chain((0..s.customers.len()).map(ChainValue::Entity))
        .collect()
}

pub fn routing_descriptor() -> SolutionDescriptor<RoutingSolution> {
    SolutionDescriptor::new("RoutingSolution").with_entity(
        EntityDescriptor::new::<Customer>("Customer", customer_count)
            .with_planning_id(|s: &RoutingSolution, i| s.customers[i].id)
            .with_variable(
                VariableDescriptor::chained("previous", chain_accessor())
                    .with_value_range(ValueRange::computed(chain_values)),
            )
            .with_variable(VariableDescriptor::shadow(
                "next",
                "previous",
                ShadowKind::InverseRelation,
            ))
            .with_variable(
                VariableDescriptor::shadow("vehicle", "previous", ShadowKind::Anchor)
                    .with_shadow_accessor(VariableAccessor::new(
                        |s: &RoutingSolution, i| s.customers[i].vehicle,
                        |s: &mut RoutingSolution, i, v| s.customers[i].vehicle = v,
                    )),
            ),
    )
}

pub fn routing_listeners(
    descriptor: &SolutionDescriptor<RoutingSolution>,
) -> Result<VariableListenerGraph<RoutingSolution>> {
    Ok(VariableListenerGraph::new()
        .with_listener(TrailingEntityListener::new(descriptor, 0, "previous", "next")?)
        .with_listener(AnchorVariableListener::new(descriptor, 0, "previous", "vehicle")?))
}

/// Distance driven to reach the customer, plus the way back to the depot for
/// the last customer of a chain.
fn distance(s: &RoutingSolution, i: usize) -> HardSoftScore {
    let customer = &s.customers[i];
    let Some(previous) = customer.previous else {
        return HardSoftScore::ZERO;
    };
    let mut driven = (s.location_of(previous) - customer.location).abs();
    if customer.next.is_none() {
        if let Some(vehicle) = customer.vehicle {
            driven += (customer.location - s.vehicles[vehicle].depot).abs();
        }
    }
    HardSoftScore::of_soft(-driven)
}

fn forbidden_vehicle(s: &RoutingSolution, i: usize) -> HardSoftScore {
    let customer = &s.customers[i];
    match (customer.vehicle, customer.forbidden_vehicle) {
        (Some(v), Some(forbidden)) if v == forbidden => HardSoftScore::of_hard(-1),
        _ => HardSoftScore::ZERO,
    }
}

pub type RoutingBackend = ConstraintSetBackend<
    RoutingSolution,
    (
        UniConstraint<RoutingSolution, HardSoftScore>,
        UniConstraint<RoutingSolution, HardSoftScore>,
    ),
>;

pub fn routing_backend() -> RoutingBackend {
    ConstraintSetBackend::new((
        UniConstraint::new("distance", 0, customer_count, distance),
        UniConstraint::new("forbidden vehicle", 0, customer_count, forbidden_vehicle),
    ))
}

pub fn create_routing_factory() -> DefaultScoreDirectorFactory<RoutingSolution, RoutingBackend> {
    DefaultScoreDirectorFactory::new(routing_descriptor(), routing_backend)
        .expect("routing descriptor is valid")
        .with_listeners(routing_listeners)
}

/// Total distance of every route, calculated from scratch.
pub fn total_distance(s: &RoutingSolution) -> i64 {
    (0..s.vehicles.len())
        .map(|v| {
            let mut position = s.vehicles[v].depot;
            let mut driven = 0;
            for c in s.route(v) {
                driven += (s.customers[c].location - position).abs();
                position = s.customers[c].location;
            }
            driven + (position - s.vehicles[v].depot).abs()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use optiplan_scoring::ScoreDirector;

    #[test]
    fn test_listeners_fill_shadows() {
        let solution = RoutingSolution::new(&[0, 100], &[10, 20, 30, 90])
            .with_routes(&[vec![0, 1, 2], vec![3]]);
        let mut director = create_routing_factory().build(solution).unwrap();
        let score = director.calculate_score().unwrap();

        let working = director.working_solution();
        assert_eq!(working.route(0), vec![0, 1, 2]);
        assert_eq!(working.route(1), vec![3]);
        assert_eq!(working.customers[2].vehicle, Some(0));
        assert_eq!(score, HardSoftScore::of(0, -total_distance(working)));
        assert_eq!(total_distance(working), 60 + 20);
    }
}
