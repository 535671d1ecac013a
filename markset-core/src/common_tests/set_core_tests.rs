use std::collections::BTreeSet;
use std::sync::Arc;
use std::thread;

use crate::data_structures::Set;

/// Test basic add, contains, and duplicate rejection
pub fn test_basic_operations<C>(set: &C)
where
    C: Set<i32>,
{
    assert!(set.add(5));
    assert!(set.add(10));
    assert!(set.add(3));
    assert!(set.add(7));
    assert!(set.add(1));

    // Duplicates rejected
    assert!(!set.add(5));
    assert!(!set.add(10));

    assert!(set.contains(&1));
    assert!(set.contains(&3));
    assert!(set.contains(&5));
    assert!(set.contains(&7));
    assert!(set.contains(&10));
    assert!(!set.contains(&2));
    assert!(!set.contains(&99));

    assert!(set.remove(&3));
    assert!(!set.contains(&3));
    assert!(!set.remove(&3)); // Already removed

    assert!(set.contains(&1));
    assert!(set.contains(&5));
    assert!(set.contains(&7));
    assert!(set.contains(&10));
}

/// add(x), add(x) -> (true, false); remove(x), remove(x) -> (true, false)
pub fn test_idempotence<C>(set: &C)
where
    C: Set<i32>,
{
    assert_eq!((set.add(4), set.add(4)), (true, false));
    assert_eq!((set.remove(&4), set.remove(&4)), (true, false));

    // Re-adding after removal works.
    assert!(set.add(4));
    assert!(set.contains(&4));
}

/// Operations on an empty set and at the extremes of the key range
pub fn test_empty_and_boundaries<C>(set: &C)
where
    C: Set<i32>,
{
    assert!(!set.contains(&0));
    assert!(!set.remove(&0));

    assert!(set.add(i32::MIN));
    assert!(set.add(i32::MAX));
    assert!(set.add(0));

    assert!(set.contains(&i32::MIN));
    assert!(set.contains(&i32::MAX));
    assert!(!set.add(i32::MIN));

    assert!(set.remove(&i32::MAX));
    assert!(set.remove(&i32::MIN));
    assert!(!set.contains(&i32::MAX));
    assert!(set.contains(&0));
}

/// Replay a fixed sequence against a BTreeSet model
pub fn test_sequential_operations<C>()
where
    C: Set<i32> + Default,
{
    let set = C::default();
    let mut model = BTreeSet::new();

    // Deterministic pseudo-random walk over a small key space.
    let mut state: u32 = 0x2545_f491;
    for _ in 0..2000 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;

        let key = (state % 64) as i32;
        match state % 3 {
            0 => assert_eq!(set.add(key), model.insert(key), "add({})", key),
            1 => assert_eq!(set.remove(&key), model.remove(&key), "remove({})", key),
            _ => assert_eq!(
                set.contains(&key),
                model.contains(&key),
                "contains({})",
                key
            ),
        }
    }

    for key in 0..64 {
        assert_eq!(
            set.contains(&key),
            model.contains(&key),
            "final key {}",
            key
        );
    }
}

/// Seed {1,3,5,7,9}; one thread adds 2,10,8,4,6 while another removes 1,9,7,3,5
pub fn test_disjoint_workload_convergence<C>()
where
    C: Set<i32> + Default + Send + Sync + 'static,
{
    for _ in 0..200 {
        let set = Arc::new(C::default());
        for key in [1, 3, 5, 7, 9] {
            assert!(set.add(key));
        }

        let adder = {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                [2, 10, 8, 4, 6]
                    .into_iter()
                    .map(|key| set.add(key))
                    .collect::<Vec<_>>()
            })
        };

        let remover = {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                [1, 9, 7, 3, 5]
                    .iter()
                    .map(|key| set.remove(key))
                    .collect::<Vec<_>>()
            })
        };

        assert!(adder.join().unwrap().into_iter().all(|added| added));
        assert!(remover.join().unwrap().into_iter().all(|removed| removed));

        for key in 0..=11 {
            let expected = [2, 4, 6, 8, 10].contains(&key);
            assert_eq!(set.contains(&key), expected, "key {}", key);
        }
    }
}

/// N threads add N disjoint key ranges; nothing is lost
pub fn test_concurrent_adds<C>()
where
    C: Set<i32> + Default + Send + Sync + 'static,
{
    let set = Arc::new(C::default());
    let num_threads = 4;
    let items_per_thread = 250;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for i in 0..items_per_thread {
                    // Interleave ranges so threads contend on neighbouring nodes.
                    assert!(set.add(i * num_threads + thread_id));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..(num_threads * items_per_thread) {
        assert!(set.contains(&i), "Missing key: {}", i);
    }
}

/// N threads remove N disjoint, already present key ranges; all are gone
pub fn test_concurrent_removes<C>()
where
    C: Set<i32> + Default + Send + Sync + 'static,
{
    let set = Arc::new(C::default());
    let num_threads = 4;
    let items_per_thread = 250;
    let total = num_threads * items_per_thread;

    for i in 0..total {
        set.add(i);
    }
    // Survivors outside the removed range.
    set.add(-1);
    set.add(total);

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                for i in 0..items_per_thread {
                    assert!(set.remove(&(i * num_threads + thread_id)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..total {
        assert!(!set.contains(&i), "Key still present: {}", i);
    }
    assert!(set.contains(&-1));
    assert!(set.contains(&total));
}

/// Mixed adds and removes per thread on private keys, exact final membership
pub fn test_concurrent_mixed_operations<C>()
where
    C: Set<i32> + Default + Send + Sync + 'static,
{
    let set = Arc::new(C::default());
    let num_threads = 4;
    let items_per_thread = 200;

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let set = Arc::clone(&set);
            thread::spawn(move || {
                let base = thread_id * items_per_thread;
                for i in 0..items_per_thread {
                    assert!(set.add(base + i));
                }
                // Remove the odd ones again.
                for i in (1..items_per_thread).step_by(2) {
                    assert!(set.remove(&(base + i)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for key in 0..(num_threads * items_per_thread) {
        assert_eq!(set.contains(&key), key % 2 == 0, "key {}", key);
    }
}
