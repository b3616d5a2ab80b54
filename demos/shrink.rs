//! Eviction walk-through: watch a pool shrink after its idle timeout.
//!
//! Run with logging enabled to see the sweep fire:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example shrink
//! ```

use loosepool::{LoosePool, PoolConfig, ResourceFactory};
use std::convert::Infallible;
use std::thread;
use std::time::Duration;

struct Buffers;

impl ResourceFactory for Buffers {
    type Resource = Vec<u8>;
    type Args = ();
    type Error = Infallible;

    fn create(&self) -> Result<Vec<u8>, Infallible> {
        Ok(vec![0; 4096])
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== loosepool - Eviction Demo ===\n");

    let config = PoolConfig::new().with_idle_timeout(Duration::from_millis(200));
    let pool = LoosePool::new(Buffers, config);

    // Burst: check out five buffers, give them all back
    let buffers: Vec<_> = (0..5).map(|_| pool.acquire().unwrap()).collect();
    for buffer in buffers {
        pool.release(buffer);
    }
    println!("after burst:    {}", pool.stats());

    // Let the idle entries age past the timeout, then keep one buffer
    // circulating; the release sweeps the rest away
    thread::sleep(Duration::from_millis(300));
    let active = pool.acquire().unwrap();
    pool.release(active);
    println!("after sweep:    {}", pool.stats());

    // A quiet pool never shrinks on its own: eviction only runs inside
    // release, so without traffic the last idle buffer stays put
    thread::sleep(Duration::from_millis(300));
    println!("while inactive: {}", pool.stats());

    pool.destroy();
    println!("after destroy:  {}", pool.stats());
}
