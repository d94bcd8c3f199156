//! Worker pool example
//!
//! A fixed pool of workers parks on a shared handoff queue while producers
//! submit jobs. Workers are woken in the order they went idle, and a stop
//! marker per worker shuts the pool down.
//!
//! Run with `RUST_LOG=handoff=debug cargo run --example worker_pool` to see
//! the park/wake protocol in the logs.

use handoff::{Builder, MetricsCollector};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
enum Task {
    Hash { id: u64, rounds: u32 },
    Stop,
}

fn run(id: u64, rounds: u32) -> u64 {
    (0..rounds).fold(id, |acc, round| {
        acc.wrapping_mul(6364136223846793005).wrapping_add(u64::from(round))
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .init();

    println!("Worker Pool Example");
    println!("===================");

    let workers = 4;
    let producers = 2;
    let tasks_per_producer = 10_000;

    let queue = Arc::new(
        Builder::new()
            .name("worker-pool")
            .initial_capacity(1024)
            .build::<Task>(),
    );

    println!("\n1. Starting {} workers", workers);
    let worker_handles: Vec<_> = (0..workers)
        .map(|worker| {
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name(format!("worker-{worker}"))
                .spawn(move || {
                    let mut done = 0u64;
                    let mut checksum = 0u64;
                    loop {
                        match queue.dequeue() {
                            Task::Hash { id, rounds } => {
                                checksum ^= run(id, rounds);
                                done += 1;
                            }
                            Task::Stop => break,
                        }
                    }
                    (done, checksum)
                })
                .expect("spawn worker")
        })
        .collect();

    // Let the pool go idle so the first jobs go through the parked path.
    while queue.waiting() < workers {
        thread::sleep(Duration::from_millis(1));
    }
    println!("   {} workers parked", queue.waiting());

    println!("\n2. Submitting {} tasks", producers * tasks_per_producer);
    let start = Instant::now();
    let producer_handles: Vec<_> = (0..producers)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for seq in 0..tasks_per_producer {
                    let id = (producer * tasks_per_producer + seq) as u64;
                    queue.enqueue(Task::Hash {
                        id,
                        rounds: 64 + (seq % 64) as u32,
                    });
                }
            })
        })
        .collect();

    for handle in producer_handles {
        handle.join().unwrap();
    }
    for _ in 0..workers {
        queue.enqueue(Task::Stop);
    }

    println!("\n3. Results:");
    let mut total = 0;
    for (worker, handle) in worker_handles.into_iter().enumerate() {
        let (done, checksum) = handle.join().unwrap();
        println!("   worker-{worker}: {done} tasks (checksum {checksum:016x})");
        total += done;
    }

    let metrics = queue.metrics();
    println!("   Completed: {} in {:?}", total, start.elapsed());
    println!("   Dequeues (visited): {}", queue.visited());
    println!("   Fast path rate: {:.1}%", metrics.fast_path_rate());
    println!("   Park rate: {:.1}%", metrics.park_rate());
    println!(
        "   Wakeups: {} edge + {} chained",
        metrics.edge_signals, metrics.chained_signals
    );
    println!("   Peak backlog: {}", metrics.peak_len);

    assert_eq!(total, (producers * tasks_per_producer) as u64);
    println!("\nWorker pool example completed successfully!");
}
