use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rstest::rstest;
use serial_test::serial;

use markset_core::common_tests::set_stress_tests::*;
use markset_core::{DeferredGuard, HarrisList, Hashed, SetKey};

type DeferredList = HarrisList<i32, DeferredGuard>;

// Helper function to create a fresh list for each test
fn create_test_list() -> Arc<DeferredList> {
    Arc::new(DeferredList::new())
}

#[test]
#[serial(stress_tests)]
fn stress_remove_same_value() {
    test_concurrent_remove_same_value::<DeferredList>();
}

#[test]
#[serial(stress_tests)]
fn stress_add_same_value() {
    test_concurrent_add_same_value::<DeferredList>();
}

#[test]
#[serial(stress_tests)]
fn stress_per_key_accounting() {
    test_per_key_accounting::<DeferredList>();
}

#[test]
#[serial(stress_tests)]
fn stress_contains_during_modifications() {
    test_contains_during_modifications::<DeferredList>();
}

#[test]
#[serial(stress_tests)]
fn stress_memory_ordering() {
    test_memory_ordering::<DeferredList>();
}

#[test]
#[serial(stress_tests)]
fn test_snapshots_stay_sorted_under_churn() {
    let list = create_test_list();
    let stop_flag = Arc::new(AtomicBool::new(false));

    let mut handles = vec![];
    for t in 0..6 {
        let list = Arc::clone(&list);
        let stop = Arc::clone(&stop_flag);
        handles.push(thread::spawn(move || {
            let mut i = 0;
            while !stop.load(Ordering::Relaxed) {
                let key = (i * 37 + t * 11) % 256;
                if (i + t) % 3 == 0 {
                    list.remove(&key);
                } else {
                    list.add(key);
                }
                i += 1;
            }
        }));
    }

    let snapshots = Arc::new(AtomicUsize::new(0));
    {
        let list = Arc::clone(&list);
        let stop = Arc::clone(&stop_flag);
        let snapshots = Arc::clone(&snapshots);
        handles.push(thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let snapshot = list.snapshot();
                for window in snapshot.windows(2) {
                    assert!(
                        window[0] < window[1],
                        "snapshot not sorted: {:?}",
                        snapshot
                    );
                }
                snapshots.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    thread::sleep(Duration::from_millis(300));
    stop_flag.store(true, Ordering::Relaxed);

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(snapshots.load(Ordering::Relaxed) > 0);
}

#[rstest]
#[serial(stress_tests)]
#[case::two_threads(2)]
#[case::eight_threads(8)]
#[case::thirty_two_threads(32)]
fn test_every_removed_node_is_retired_once(#[case] num_threads: usize) {
    let list = create_test_list();
    let per_thread = 200;
    let barrier = Arc::new(Barrier::new(num_threads));
    let removed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            let removed = Arc::clone(&removed);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..5 {
                    for i in 0..per_thread {
                        // Overlapping key ranges between neighbouring threads.
                        let key = ((t * per_thread / 2 + i) % 1024) as i32;
                        if (i + round) % 2 == 0 {
                            list.add(key);
                        } else if list.remove(&key) {
                            removed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // A full traversal unlinks whatever the removers left behind.
    for key in 0..1024 {
        list.add(key);
    }

    // DeferredGuard panics on a second retirement of the same node, so
    // reaching this point means retirement was unique; with every marked
    // node unlinked the counts must agree.
    assert_eq!(list.guard().retired_count(), removed.load(Ordering::Relaxed));
    assert_eq!(list.len(), 1024);
}

#[test]
#[serial(stress_tests)]
fn test_hashed_items_concurrently() {
    let list: Arc<HarrisList<Hashed<String>, DeferredGuard>> = Arc::new(HarrisList::new());
    let num_threads = 4;
    let per_thread = 100;

    let handles: Vec<_> = (0..num_threads)
        .map(|t| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for i in 0..per_thread {
                    assert!(list.add(Hashed::new(format!("item-{}-{}", t, i))));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), num_threads * per_thread);

    let snapshot = list.snapshot();
    for window in snapshot.windows(2) {
        assert!(window[0].set_key() < window[1].set_key());
    }

    let wanted = Hashed::new("item-2-17".to_string());
    assert!(list.contains(&wanted));
    assert_eq!(
        list.get(&wanted).map(|item| item.0.clone()),
        Some(wanted.0.clone())
    );
    assert!(list.remove(&wanted));
    assert!(!list.contains(&wanted));
}
