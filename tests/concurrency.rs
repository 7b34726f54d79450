//! Sharing built arrays across threads.

use std::sync::Arc;
use std::thread;

use polypack::{Builder, CompactArray};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const THREADS: usize = 8;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn compact_array_is_send_sync() {
    assert_send_sync::<CompactArray>();
    assert_send_sync::<Builder>();
}

fn monotone(seed: u64, n: usize, step: u32) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v = 0u32;
    (0..n)
        .map(|_| {
            v += rng.gen_range(0..step);
            v
        })
        .collect()
}

#[test]
fn shared_reads() {
    let values = Arc::new(monotone(7, 100_000, 64));
    let a = Arc::new(CompactArray::from_u32(&values));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let a = Arc::clone(&a);
            let values = Arc::clone(&values);
            thread::spawn(move || {
                for i in (t..values.len()).step_by(THREADS) {
                    assert_eq!(a.get(i).unwrap(), values[i], "thread={} i={}", t, i);
                }

                let start = t * 10_000;
                let end = start + 12_345;
                let mut out = vec![0; end - start];
                a.slice(start, end, &mut out).unwrap();
                assert_eq!(out, &values[start..end], "thread={}", t);
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn concurrent_builds() {
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            thread::spawn(move || {
                let values = monotone(t as u64, 5_000, 1 << (t + 2));
                let a = CompactArray::from_u32(&values);
                assert_eq!(a.to_vec(), values, "thread={}", t);
                (values, a)
            })
        })
        .collect();

    for h in handles {
        let (values, a) = h.join().unwrap();
        assert_eq!(a, CompactArray::from_u32(&values));
    }
}
