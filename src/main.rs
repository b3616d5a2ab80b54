// loosepool - concurrent, self-shrinking object pool
// This is just a binary wrapper - the actual library is in lib.rs
// Run examples with: cargo run --example basic

use loosepool::{LoosePool, PoolConfig, ResourceFactory};
use std::convert::Infallible;

struct Messages;

impl ResourceFactory for Messages {
    type Resource = String;
    type Args = ();
    type Error = Infallible;

    fn create(&self) -> Result<String, Infallible> {
        Ok(String::from("pooled message"))
    }
}

fn main() {
    println!("=== loosepool ===");
    println!("See demos/ directory for usage examples");
    println!("Run: cargo run --example basic");
    println!();

    println!("Quick Demo:");
    let pool = LoosePool::new(Messages, PoolConfig::default());

    {
        let message = pool.checkout().unwrap();
        println!("  Got resource: {}", *message);
    }

    println!("  Available after return: {}", pool.available());
    println!("  Stats: {}", pool.stats());
}
