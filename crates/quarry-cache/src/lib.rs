//! # quarry-cache
//!
//! Caching primitives shared by the access and routing layers:
//!
//! - [`TtlCache`]: per-entry expiry with explicit invalidation, read-mostly
//! - [`BoundedCache`]: size-capped LRU map backed by `moka`
//! - [`Clock`]: time source, swappable for tests via [`ManualClock`]

mod bounded;
mod clock;
mod ttl;

pub use bounded::BoundedCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::{Ttl, TtlCache};
