//! # loosepool
//!
//! Concurrent, self-shrinking object pool for expensive-to-construct
//! resources. The pool grows on demand, never enforces an upper bound,
//! and lazily evicts resources that sat idle past a configured timeout.
//!
//! ## Features
//!
//! - Factory-driven construction, with and without constructor arguments
//! - LIFO reuse: the most recently released resource is handed out next
//! - Release-triggered eviction sweep on a fixed cadence, no background
//!   threads
//! - Automatic return of resources via RAII (Drop trait)
//! - Structured statistics snapshot with peak gauges and lifetime
//!   counters
//! - Factory calls always run outside the pool lock
//!
//! ## Quick Start
//!
//! ```rust
//! use loosepool::{LoosePool, PoolConfig, ResourceFactory};
//! use std::convert::Infallible;
//!
//! struct Greetings;
//!
//! impl ResourceFactory for Greetings {
//!     type Resource = String;
//!     type Args = ();
//!     type Error = Infallible;
//!
//!     fn create(&self) -> Result<String, Infallible> {
//!         Ok(String::from("hello"))
//!     }
//! }
//!
//! let pool = LoosePool::new(Greetings, PoolConfig::default());
//! {
//!     let greeting = pool.checkout().unwrap();
//!     println!("got: {}", *greeting);
//!     // returned to the pool when `greeting` goes out of scope
//! }
//! assert_eq!(pool.stats().available, 1);
//! ```

mod config;
mod errors;
mod factory;
mod pool;
mod stats;
mod store;
mod sweep;

pub use config::{DEFAULT_IDLE_TIMEOUT, DEFAULT_INITIAL_CAPACITY, PoolConfig};
pub use errors::{PoolError, PoolResult};
pub use factory::ResourceFactory;
pub use pool::{LoosePool, PooledResource, ResourcePool};
pub use stats::PoolStats;
