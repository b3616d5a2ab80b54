//! Basic usage examples for loosepool

use loosepool::{LoosePool, PoolConfig, ResourceFactory};
use std::convert::Infallible;

/// Builds connection strings, numbered by port when asked.
struct Connections;

impl ResourceFactory for Connections {
    type Resource = String;
    type Args = u32;
    type Error = Infallible;

    fn create(&self) -> Result<String, Infallible> {
        Ok(String::from("conn:default"))
    }

    fn create_with(&self, port: u32) -> Result<String, Infallible> {
        Ok(format!("conn:{port}"))
    }
}

fn main() {
    println!("=== loosepool - Basic Examples ===\n");

    // Example 1: RAII checkout guard
    checkout_guard();

    // Example 2: Manual acquire/release
    manual_acquire_release();

    // Example 3: Constructor arguments
    constructor_arguments();

    // Example 4: Statistics snapshot
    statistics();
}

fn checkout_guard() {
    println!("1. Checkout Guard:");
    let pool = LoosePool::new(Connections, PoolConfig::default());

    {
        let conn = pool.checkout().unwrap();
        println!("   Got resource: {}", *conn);
        // Resource automatically returned when dropped
    }

    println!("   Available after return: {}\n", pool.available());
}

fn manual_acquire_release() {
    println!("2. Manual Acquire/Release:");
    let pool = LoosePool::new(Connections, PoolConfig::default());

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();
    println!("   In use: {}", pool.in_use());

    pool.release(first);
    pool.release(second);
    println!("   Available: {}", pool.available());

    // LIFO: the most recently released resource comes back first
    let again = pool.acquire().unwrap();
    println!("   Reacquired: {}\n", again);
    pool.release(again);
}

fn constructor_arguments() {
    println!("3. Constructor Arguments:");
    let pool = LoosePool::new(Connections, PoolConfig::default());

    let conn = pool.checkout_with(5432).unwrap();
    println!("   Built with args: {}", *conn);
    drop(conn);

    // An idle hit ignores the arguments
    let conn = pool.checkout_with(9999).unwrap();
    println!("   Idle hit still is: {}\n", *conn);
}

fn statistics() {
    println!("4. Statistics:");
    let config = PoolConfig::new().with_initial_capacity(8).with_max_size(32);
    let pool = LoosePool::new(Connections, config);

    let first = pool.acquire().unwrap();
    let second = pool.acquire().unwrap();
    pool.release(first);

    let stats = pool.stats();
    println!("   size={} available={} in_use={}", stats.size, stats.available, stats.in_use);
    println!("   peak_in_use={} peak_idle={}", stats.peak_in_use, stats.peak_idle);
    println!("   full dump: {}", stats);

    pool.release(second);
}
