//! Loom model tests for HarrisList.
//!
//! ```bash
//! RUSTFLAGS="--cfg loom" cargo test -p markset-core --test loom_harris_list --release
//! ```

#![cfg(loom)]

use loom::sync::Arc;
use loom::thread;

use markset_core::{DeferredGuard, HarrisList};

type LoomList = HarrisList<i32, DeferredGuard>;

#[test]
fn loom_disjoint_add_remove() {
    loom::model(|| {
        let list: Arc<LoomList> = Arc::new([1, 3].into_iter().collect());

        let adder = {
            let list = Arc::clone(&list);
            thread::spawn(move || list.add(2))
        };
        let remover = {
            let list = Arc::clone(&list);
            thread::spawn(move || list.remove(&1))
        };

        assert!(adder.join().unwrap());
        assert!(remover.join().unwrap());

        assert!(list.contains(&2));
        assert!(list.contains(&3));
        assert!(!list.contains(&1));
    });
}

#[test]
fn loom_insert_next_to_removed_node() {
    // The add splices after the node being removed: only one CAS on 1.next wins,
    // and the add retries instead of being lost.
    loom::model(|| {
        let list: Arc<LoomList> = Arc::new([1, 3].into_iter().collect());

        let adder = {
            let list = Arc::clone(&list);
            thread::spawn(move || list.add(2))
        };
        let remover = {
            let list = Arc::clone(&list);
            thread::spawn(move || list.remove(&1))
        };

        adder.join().unwrap();
        remover.join().unwrap();

        assert!(list.contains(&2));
        assert!(!list.contains(&1));
        assert_eq!(list.len(), 2);
    });
}

#[test]
fn loom_concurrent_remove_single_winner() {
    loom::model(|| {
        let list: Arc<LoomList> = Arc::new([5].into_iter().collect());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let list = Arc::clone(&list);
                thread::spawn(move || list.remove(&5))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|removed| *removed)
            .count();

        assert_eq!(winners, 1);
        assert!(list.is_empty());
    });
}

#[test]
fn loom_concurrent_add_single_winner() {
    loom::model(|| {
        let list: Arc<LoomList> = Arc::new(LoomList::new());

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let list = Arc::clone(&list);
                thread::spawn(move || list.add(7))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|added| *added)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(list.len(), 1);
    });
}
