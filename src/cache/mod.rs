//! Caching primitives shared by every data service.
//!
//! [`TimedCache`] holds values for a fixed TTL measured against an injected
//! [`Clock`]; [`SingleFlight`] collapses concurrent loads of a cold key into a
//! single upstream fetch.

mod clock;
mod single_flight;
mod timed;

#[cfg(test)]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use single_flight::SingleFlight;
pub use timed::TimedCache;
