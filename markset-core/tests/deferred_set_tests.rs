use markset_core::common_tests::set_core_tests::*;
use markset_core::{DeferredGuard, HarrisList};

type DeferredList = HarrisList<i32, DeferredGuard>;

#[test]
fn test_basic() {
    let set = DeferredList::default();
    test_basic_operations(&set);
}

#[test]
fn test_idempotent_calls() {
    let set = DeferredList::default();
    test_idempotence(&set);
}

#[test]
fn test_boundaries() {
    let set = DeferredList::default();
    test_empty_and_boundaries(&set);
}

#[test]
fn test_sequential() {
    test_sequential_operations::<DeferredList>();
}

#[test]
fn test_disjoint_workload() {
    test_disjoint_workload_convergence::<DeferredList>();
}

#[test]
fn test_concurrent_add() {
    test_concurrent_adds::<DeferredList>();
}

#[test]
fn test_concurrent_remove() {
    test_concurrent_removes::<DeferredList>();
}

#[test]
fn test_concurrent_mixed() {
    test_concurrent_mixed_operations::<DeferredList>();
}
