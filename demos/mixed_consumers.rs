//! Mixed consumers example
//!
//! Shows how parked consumers keep their place in line while a polling
//! consumer uses `try_take` opportunistically. Items that have arrived for
//! parked consumers are reserved and the poller is told so.

use handoff::{Error, HandoffQueue};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Mixed Consumers Example");
    println!("=======================");

    let queue: Arc<HandoffQueue<&'static str>> = Arc::new(HandoffQueue::new());

    println!("\n1. Two consumers park on an empty queue");
    let parked: Vec<_> = ["alice", "bob"]
        .into_iter()
        .enumerate()
        .map(|(i, who)| {
            let handle = {
                let queue = Arc::clone(&queue);
                thread::spawn(move || (who, queue.dequeue()))
            };
            while queue.waiting() <= i {
                thread::sleep(Duration::from_millis(1));
            }
            handle
        })
        .collect();
    println!("   waiting = {}", queue.waiting());

    println!("\n2. Three items arrive");
    for item in ["first", "second", "third"] {
        queue.enqueue(item);
    }

    println!("\n3. A poller asks for work");
    loop {
        match queue.try_take() {
            Ok(item) => {
                println!("   poller took {item:?}");
                break;
            }
            Err(Error::Reserved { waiting }) => {
                println!("   everything is reserved for {waiting} parked consumer(s), retrying");
                thread::sleep(Duration::from_millis(1));
            }
            Err(err) => {
                println!("   poller gave up: {err}");
                break;
            }
        }
    }

    println!("\n4. Parked consumers are served in park order");
    for handle in parked {
        let (who, item) = handle.join().unwrap();
        println!("   {who} received {item:?}");
    }

    println!("\n5. A timed consumer on an empty queue");
    match queue.dequeue_timeout(Duration::from_millis(50)) {
        Ok(item) => println!("   unexpected item {item:?}"),
        Err(err) => println!("   {err}"),
    }

    let stats = queue.stats();
    println!(
        "\nsize = {}, waiting = {}, visited = {}",
        stats.size, stats.waiting, stats.visited
    );
}
