//! Tests for the descriptor registry.

use super::*;
use crate::domain::{EntityRef, ShadowKind, ValueRange, VariableAccessor};
use crate::error::OptiplanError;

trait Staff {}

struct Nurse;
struct Doctor;
struct Room;

impl Staff for Nurse {}
impl Staff for Doctor {}

#[derive(Clone)]
struct Hospital {
    nurses: Vec<Option<i64>>,
    doctors: Vec<Option<i64>>,
    pinned: Vec<bool>,
}

fn nurse_shift() -> VariableAccessor<Hospital, i64> {
    VariableAccessor::new(|h: &Hospital, i| h.nurses[i], |h: &mut Hospital, i, v| h.nurses[i] = v)
}

fn doctor_shift() -> VariableAccessor<Hospital, i64> {
    VariableAccessor::new(
        |h: &Hospital, i| h.doctors[i],
        |h: &mut Hospital, i, v| h.doctors[i] = v,
    )
}

fn descriptor() -> SolutionDescriptor<Hospital> {
    SolutionDescriptor::new("Hospital")
        .with_entity(
            EntityDescriptor::new::<Nurse>("Nurse", |h: &Hospital| h.nurses.len())
                .with_supertype::<dyn Staff>()
                .with_movable_filter(|h, i| !h.pinned[i])
                .with_variable(
                    VariableDescriptor::genuine("shift", nurse_shift())
                        .with_value_range(ValueRange::integers(0, 3)),
                ),
        )
        .with_entity(
            EntityDescriptor::new::<Doctor>("Doctor", |h: &Hospital| h.doctors.len())
                .with_supertype::<dyn Staff>()
                .with_variable(
                    VariableDescriptor::genuine("shift", doctor_shift())
                        .with_value_range(ValueRange::integers(0, 3))
                        .with_nullable(true),
                ),
        )
}

fn hospital() -> Hospital {
    Hospital {
        nurses: vec![Some(0), None, None],
        doctors: vec![None, Some(2)],
        pinned: vec![true, false, false],
    }
}

#[test]
fn test_validate_ok() {
    assert!(descriptor().validate().is_ok());
}

#[test]
fn test_missing_value_range_is_config_error() {
    let descriptor = SolutionDescriptor::new("Hospital").with_entity(
        EntityDescriptor::new::<Nurse>("Nurse", |h: &Hospital| h.nurses.len())
            .with_variable(VariableDescriptor::genuine("shift", nurse_shift())),
    );
    let err = descriptor.validate().unwrap_err();
    assert_eq!(
        err,
        OptiplanError::MissingValueRange {
            entity: "Nurse",
            variable: "shift"
        }
    );
    assert!(err.is_config());
}

#[test]
fn test_value_range_type_mismatch() {
    let descriptor = SolutionDescriptor::new("Hospital").with_entity(
        EntityDescriptor::new::<Nurse>("Nurse", |h: &Hospital| h.nurses.len()).with_variable(
            VariableDescriptor::genuine("shift", nurse_shift())
                .with_value_range(ValueRange::<Hospital, u8>::fixed(vec![1u8])),
        ),
    );
    assert!(matches!(descriptor.validate(), Err(OptiplanError::Config(_))));
}

#[test]
fn test_shadow_with_unknown_source() {
    let descriptor = SolutionDescriptor::new("Hospital").with_entity(
        EntityDescriptor::new::<Nurse>("Nurse", |h: &Hospital| h.nurses.len())
            .with_variable(
                VariableDescriptor::genuine("shift", nurse_shift())
                    .with_value_range(ValueRange::integers(0, 3)),
            )
            .with_variable(VariableDescriptor::shadow("ward", "missing", ShadowKind::Custom)),
    );
    assert!(matches!(descriptor.validate(), Err(OptiplanError::Config(_))));
}

#[test]
fn test_supertype_lookup_returns_subtypes() {
    let descriptor = descriptor();
    let h = hospital();

    assert_eq!(descriptor.entity_descriptor_indices_for::<dyn Staff>().unwrap(), &[0, 1]);
    let staff = descriptor.entity_refs_of::<dyn Staff>(&h).unwrap();
    assert_eq!(staff.len(), 5);

    let doctors = descriptor.entity_refs_of::<Doctor>(&h).unwrap();
    assert_eq!(doctors, vec![EntityRef::new(1, 0), EntityRef::new(1, 1)]);
    assert_eq!(descriptor.entity_descriptor_index_for::<Nurse>().unwrap(), 0);
    assert!(descriptor.entity_descriptor_index_for::<dyn Staff>().is_err());
}

#[test]
fn test_unregistered_type() {
    let err = descriptor().entity_refs_of::<Room>(&hospital()).unwrap_err();
    assert!(matches!(err, OptiplanError::UnregisteredEntityType(_)));
}

#[test]
fn test_uninitialized_count_skips_nullable() {
    let descriptor = descriptor();
    assert_eq!(descriptor.uninitialized_variable_count(&hospital()), 2);
}

#[test]
fn test_movable_filter() {
    let descriptor = descriptor();
    let h = hospital();
    assert!(!descriptor.is_movable(&h, EntityRef::new(0, 0)));
    assert!(descriptor.is_movable(&h, EntityRef::new(0, 1)));
    assert!(descriptor.is_movable(&h, EntityRef::new(1, 0)));
}

#[test]
fn test_typed_accessors() {
    let descriptor = descriptor();
    let mut h = hospital();

    let shift = descriptor.variable_accessor::<i64>(0, "shift").unwrap();
    (shift.set)(&mut h, 1, Some(2));
    assert_eq!((shift.get)(&h, 1), Some(2));

    assert!(descriptor.variable_accessor::<u8>(0, "shift").is_err());
    assert!(descriptor.variable_accessor::<i64>(0, "ward").is_err());

    let range = descriptor.value_range::<i64>(1, "shift").unwrap();
    assert_eq!(range.values(&h), vec![0, 1, 2]);
}
