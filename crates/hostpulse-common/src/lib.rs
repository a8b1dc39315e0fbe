//! Shared data model for the hostpulse agent.
//!
//! Holds the types that cross crate boundaries: the opaque [`types::MetricRecord`]
//! produced by collectors and consumed by the delivery engine, the host
//! [`types::Fingerprint`], the server-pushed [`types::ServerOverride`], and the
//! collection-interval bounds enforced at config load.

pub mod types;

/// Lower bound for the collection interval, in seconds.
pub const MIN_INTERVAL_SECS: u64 = 10;

/// Upper bound for the collection interval, in seconds.
pub const MAX_INTERVAL_SECS: u64 = 300;

/// Collection interval used when none is configured.
pub const DEFAULT_INTERVAL_SECS: u64 = 30;
