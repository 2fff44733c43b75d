//! Tests for the listener graph and the built-in listeners.

use std::sync::{Arc, Mutex};

use super::*;
use crate::domain::{
    ChainValue, ChainedVariableAccessor, EntityDescriptor, EntityRef, ListVariableAccessor,
    ShadowKind, SolutionDescriptor, ValueRange, VariableAccessor, VariableDescriptor,
};
use crate::error::{OptiplanError, Result};

#[derive(Default)]
struct RecordingSink {
    events: Vec<(&'static str, EntityRef, &'static str)>,
}

impl<S> ShadowVariableSink<S> for RecordingSink {
    fn before_shadow_changed(&mut self, _: &S, entity: EntityRef, variable: &'static str) {
        self.events.push(("before", entity, variable));
    }

    fn after_shadow_changed(&mut self, _: &S, entity: EntityRef, variable: &'static str) {
        self.events.push(("after", entity, variable));
    }
}

impl RecordingSink {
    fn assert_paired(&self) {
        assert_eq!(self.events.len() % 2, 0);
        for pair in self.events.chunks(2) {
            assert_eq!(pair[0].0, "before");
            assert_eq!(pair[1].0, "after");
            assert_eq!(pair[0].1, pair[1].1);
            assert_eq!(pair[0].2, pair[1].2);
        }
    }
}

// Chained routes: customers point at a vehicle (anchor) or another customer.

struct Customer;

#[derive(Clone, Debug, PartialEq)]
struct Routes {
    vehicles: usize,
    previous: Vec<Option<ChainValue>>,
    next: Vec<Option<usize>>,
    vehicle_next: Vec<Option<usize>>,
    anchor: Vec<Option<usize>>,
}

impl Routes {
    fn new(vehicles: usize, previous: Vec<Option<ChainValue>>) -> Self {
        let customers = previous.len();
        Routes {
            vehicles,
            previous,
            next: vec![None; customers],
            vehicle_next: vec![None; vehicles],
            anchor: vec![None; customers],
        }
    }
}

fn route_values(r: &Routes) -> Vec<ChainValue> {
    (0..r.vehicles)
        .map(ChainValue::Anchor)
        .chain((0..r.previous.len()).map(ChainValue::Entity))
        .collect()
}

fn routes_descriptor() -> SolutionDescriptor<Routes> {
    let chain: ChainedVariableAccessor<Routes> = ChainedVariableAccessor {
        previous: VariableAccessor::new(
            |r: &Routes, i| r.previous[i],
            |r: &mut Routes, i, v| r.previous[i] = v,
        ),
        next: |r: &Routes, v| match v {
            ChainValue::Anchor(a) => r.vehicle_next[a],
            ChainValue::Entity(e) => r.next[e],
        },
        set_next: |r: &mut Routes, v, n| match v {
            ChainValue::Anchor(a) => r.vehicle_next[a] = n,
            ChainValue::Entity(e) => r.next[e] = n,
        },
        anchor_count: |r: &Routes| r.vehicles,
    };
    SolutionDescriptor::new("Routes").with_entity(
        EntityDescriptor::new::<Customer>("Customer", |r: &Routes| r.previous.len())
            .with_variable(
                VariableDescriptor::chained("previous", chain)
                    .with_value_range(ValueRange::computed(route_values)),
            )
            .with_variable(VariableDescriptor::shadow(
                "next",
                "previous",
                ShadowKind::InverseRelation,
            ))
            .with_variable(
                VariableDescriptor::shadow("anchor", "previous", ShadowKind::Anchor)
                    .with_shadow_accessor(VariableAccessor::new(
                        |r: &Routes, i| r.anchor[i],
                        |r: &mut Routes, i, v| r.anchor[i] = v,
                    )),
            ),
    )
}

fn routes_graph(descriptor: &SolutionDescriptor<Routes>) -> VariableListenerGraph<Routes> {
    VariableListenerGraph::new()
        .with_listener(TrailingEntityListener::new(descriptor, 0, "previous", "next").unwrap())
        .with_listener(AnchorVariableListener::new(descriptor, 0, "previous", "anchor").unwrap())
}

/// vehicle 0 -> c0 -> c1 -> c2, vehicle 1 -> c3
fn two_routes() -> Routes {
    Routes::new(
        2,
        vec![
            Some(ChainValue::Anchor(0)),
            Some(ChainValue::Entity(0)),
            Some(ChainValue::Entity(1)),
            Some(ChainValue::Anchor(1)),
        ],
    )
}

fn change_previous(
    graph: &mut VariableListenerGraph<Routes>,
    routes: &mut Routes,
    customer: usize,
    value: Option<ChainValue>,
    sink: &mut RecordingSink,
) -> Result<()> {
    graph.before_variable_changed(routes, EntityRef::new(0, customer), "previous", sink)?;
    routes.previous[customer] = value;
    Ok(())
}

#[test]
fn test_reset_builds_inverse_and_anchor() {
    let descriptor = routes_descriptor();
    descriptor.validate().unwrap();
    let mut graph = routes_graph(&descriptor);
    let mut routes = two_routes();

    graph.reset_working_solution(&mut routes).unwrap();

    assert_eq!(routes.vehicle_next, vec![Some(0), Some(3)]);
    assert_eq!(routes.next, vec![Some(1), Some(2), None, None]);
    assert_eq!(routes.anchor, vec![Some(0), Some(0), Some(0), Some(1)]);
}

#[test]
fn test_reassign_chain_tail_onto_other_chain() {
    let descriptor = routes_descriptor();
    let mut graph = routes_graph(&descriptor);
    let mut routes = two_routes();
    graph.reset_working_solution(&mut routes).unwrap();
    let mut sink = RecordingSink::default();

    change_previous(&mut graph, &mut routes, 2, Some(ChainValue::Entity(3)), &mut sink).unwrap();
    graph.trigger(&mut routes, &mut sink).unwrap();

    assert_eq!(routes.next[3], Some(2));
    assert_eq!(routes.next[1], None);
    assert_eq!(routes.anchor[2], Some(1));
    assert_eq!(routes.anchor[3], Some(1));
    assert!(!graph.has_pending());
    sink.assert_paired();
}

#[test]
fn test_move_chain_segment_updates_all_anchors() {
    let descriptor = routes_descriptor();
    let mut graph = routes_graph(&descriptor);
    let mut routes = two_routes();
    graph.reset_working_solution(&mut routes).unwrap();
    let mut sink = RecordingSink::default();

    // Move c1 (trailed by c2) behind c3: close the gap, then hang c1 on c3.
    change_previous(&mut graph, &mut routes, 2, Some(ChainValue::Entity(0)), &mut sink).unwrap();
    change_previous(&mut graph, &mut routes, 1, Some(ChainValue::Entity(3)), &mut sink).unwrap();
    graph.trigger(&mut routes, &mut sink).unwrap();

    assert_eq!(routes.next, vec![Some(2), None, None, Some(1)]);
    assert_eq!(routes.anchor, vec![Some(0), Some(1), Some(0), Some(1)]);
    sink.assert_paired();
}

#[test]
fn test_duplicate_trailing_entity_is_corruption() {
    let descriptor = routes_descriptor();
    let mut graph = routes_graph(&descriptor);
    let mut routes = Routes::new(
        1,
        vec![Some(ChainValue::Anchor(0)), Some(ChainValue::Anchor(0))],
    );

    let err = graph.reset_working_solution(&mut routes).unwrap_err();
    assert!(matches!(err, OptiplanError::TrailingEntityCorruption(_)));
    assert!(err.is_corruption());
}

#[test]
fn test_change_onto_trailed_value_is_corruption() {
    let descriptor = routes_descriptor();
    let mut graph = routes_graph(&descriptor);
    let mut routes = two_routes();
    graph.reset_working_solution(&mut routes).unwrap();
    let mut sink = RecordingSink::default();

    // c3 onto vehicle 0 while c0 still trails it.
    change_previous(&mut graph, &mut routes, 3, Some(ChainValue::Anchor(0)), &mut sink).unwrap();
    let err = graph.trigger(&mut routes, &mut sink).unwrap_err();
    assert!(matches!(err, OptiplanError::TrailingEntityCorruption(_)));
}

#[test]
fn test_remove_entity_clears_its_shadows() {
    let descriptor = routes_descriptor();
    let mut graph = routes_graph(&descriptor);
    let mut routes = two_routes();
    graph.reset_working_solution(&mut routes).unwrap();
    let mut sink = RecordingSink::default();

    graph
        .before_entity_removed(&mut routes, EntityRef::new(0, 3), &mut sink)
        .unwrap();

    assert_eq!(routes.vehicle_next[1], None);
    assert_eq!(routes.anchor[3], None);
    graph.trigger(&mut routes, &mut sink).unwrap();
    sink.assert_paired();
}

#[test]
fn test_remove_entity_with_pending_change_unregisters_once() {
    let descriptor = routes_descriptor();
    let mut graph = routes_graph(&descriptor);
    let mut routes = two_routes();
    graph.reset_working_solution(&mut routes).unwrap();
    let mut sink = RecordingSink::default();

    change_previous(&mut graph, &mut routes, 2, Some(ChainValue::Entity(3)), &mut sink).unwrap();
    graph
        .before_entity_removed(&mut routes, EntityRef::new(0, 2), &mut sink)
        .unwrap();

    assert_eq!(routes.next[3], None);
    assert_eq!(routes.next[1], None);
    assert_eq!(routes.anchor[2], None);
}

// List variable: workers own ordered task lists.

struct Worker;
struct Task;

#[derive(Clone, Debug, PartialEq)]
struct Plan {
    lists: Vec<Vec<usize>>,
    index: Vec<Option<usize>>,
}

fn plan_descriptor() -> SolutionDescriptor<Plan> {
    let list: ListVariableAccessor<Plan> = ListVariableAccessor {
        len: |p: &Plan, w| p.lists[w].len(),
        element: |p: &Plan, w, i| p.lists[w][i],
        insert: |p: &mut Plan, w, i, t| p.lists[w].insert(i, t),
        remove: |p: &mut Plan, w, i| p.lists[w].remove(i),
        element_count: |p: &Plan| p.index.len(),
    };
    SolutionDescriptor::new("Plan")
        .with_entity(
            EntityDescriptor::new::<Worker>("Worker", |p: &Plan| p.lists.len())
                .with_variable(VariableDescriptor::list("tasks", list)),
        )
        .with_entity(
            EntityDescriptor::new::<Task>("Task", |p: &Plan| p.index.len()).with_variable(
                VariableDescriptor::shadow("index", "tasks", ShadowKind::Index)
                    .with_shadow_accessor(VariableAccessor::new(
                        |p: &Plan, i| p.index[i],
                        |p: &mut Plan, i, v| p.index[i] = v,
                    )),
            ),
        )
}

fn plan_graph(descriptor: &SolutionDescriptor<Plan>) -> VariableListenerGraph<Plan> {
    VariableListenerGraph::new()
        .with_listener(IndexVariableListener::new(descriptor, 0, "tasks", 1, "index").unwrap())
}

#[test]
fn test_remove_first_element_reindexes_suffix() {
    let descriptor = plan_descriptor();
    descriptor.validate().unwrap();
    let mut graph = plan_graph(&descriptor);
    let mut plan = Plan {
        lists: vec![vec![0, 1, 2, 3]],
        index: vec![None; 4],
    };
    graph.reset_working_solution(&mut plan).unwrap();
    assert_eq!(plan.index, vec![Some(0), Some(1), Some(2), Some(3)]);
    assert_eq!(descriptor.uninitialized_variable_count(&plan), 0);

    let owner = EntityRef::new(0, 0);
    let mut sink = RecordingSink::default();
    graph
        .before_list_variable_changed(&mut plan, owner, "tasks", 0, 4, &mut sink)
        .unwrap();
    let removed = plan.lists[0].remove(0);
    graph.after_list_variable_changed(owner, "tasks", 0, 3);
    graph.list_element_unassigned(0, "tasks", removed);
    graph.trigger(&mut plan, &mut sink).unwrap();

    assert_eq!(plan.lists[0], vec![1, 2, 3]);
    assert_eq!(plan.index, vec![None, Some(0), Some(1), Some(2)]);
    // One bracket per shifted element plus the unassigned one.
    assert_eq!(sink.events.len(), 8);
    sink.assert_paired();
    assert_eq!(descriptor.uninitialized_variable_count(&plan), 1);
}

#[test]
fn test_move_within_list_touches_only_suffix() {
    let descriptor = plan_descriptor();
    let mut graph = plan_graph(&descriptor);
    let mut plan = Plan {
        lists: vec![vec![0, 1, 2, 3], vec![4]],
        index: vec![None; 5],
    };
    graph.reset_working_solution(&mut plan).unwrap();

    let mut sink = RecordingSink::default();
    let source = EntityRef::new(0, 0);
    let target = EntityRef::new(0, 1);
    graph
        .before_list_variable_changed(&mut plan, source, "tasks", 2, 4, &mut sink)
        .unwrap();
    graph
        .before_list_variable_changed(&mut plan, target, "tasks", 0, 1, &mut sink)
        .unwrap();
    let task = plan.lists[0].remove(3);
    plan.lists[1].insert(0, task);
    graph.after_list_variable_changed(source, "tasks", 3, 3);
    graph.after_list_variable_changed(target, "tasks", 0, 2);
    graph.trigger(&mut plan, &mut sink).unwrap();

    assert_eq!(plan.index, vec![Some(0), Some(1), Some(2), Some(0), Some(1)]);
    let touched: Vec<_> = sink.events.iter().map(|e| e.1.entity_index).collect();
    assert_eq!(touched, vec![3, 3, 4, 4]);
}

#[test]
fn test_remove_owner_unsets_element_indexes() {
    let descriptor = plan_descriptor();
    let mut graph = plan_graph(&descriptor);
    let mut plan = Plan {
        lists: vec![vec![0, 1], vec![2]],
        index: vec![None; 3],
    };
    graph.reset_working_solution(&mut plan).unwrap();

    let mut sink = RecordingSink::default();
    graph
        .before_entity_removed(&mut plan, EntityRef::new(0, 0), &mut sink)
        .unwrap();
    assert_eq!(plan.index, vec![None, None, Some(0)]);
    sink.assert_paired();
}

// Graph mechanics with a listener that records what it is told.

#[derive(Debug)]
struct Probe {
    source: ListenerSource,
    log: Arc<Mutex<Vec<String>>>,
}

impl VariableListener<Plan> for Probe {
    fn source(&self) -> ListenerSource {
        self.source
    }

    fn before_variable_changed(
        &mut self,
        _: &mut Plan,
        entity: usize,
        _: &mut dyn ShadowVariableSink<Plan>,
    ) -> Result<()> {
        self.log.lock().unwrap().push(format!("{}:before:{}", self.source.variable, entity));
        Ok(())
    }

    fn after_variable_changed(
        &mut self,
        _: &mut Plan,
        entity: usize,
        _: &mut dyn ShadowVariableSink<Plan>,
    ) -> Result<()> {
        self.log.lock().unwrap().push(format!("{}:after:{}", self.source.variable, entity));
        Ok(())
    }
}

#[test]
fn test_unique_events_and_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut graph = VariableListenerGraph::new()
        .with_listener(Probe {
            source: ListenerSource::new(0, "a"),
            log: log.clone(),
        })
        .with_listener(Probe {
            source: ListenerSource::new(0, "b"),
            log: log.clone(),
        })
        .with_listener(Probe {
            source: ListenerSource::new(1, "a"),
            log: log.clone(),
        });
    let mut plan = Plan {
        lists: vec![],
        index: vec![],
    };
    let mut sink = NoopShadowSink;

    graph
        .before_variable_changed(&mut plan, EntityRef::new(0, 7), "b", &mut sink)
        .unwrap();
    graph
        .before_variable_changed(&mut plan, EntityRef::new(0, 7), "a", &mut sink)
        .unwrap();
    graph
        .before_variable_changed(&mut plan, EntityRef::new(0, 7), "a", &mut sink)
        .unwrap();
    assert!(graph.has_pending());
    graph.trigger(&mut plan, &mut sink).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["b:before:7", "a:before:7", "a:after:7", "b:after:7"]
    );
    assert!(!graph.has_pending());
}
