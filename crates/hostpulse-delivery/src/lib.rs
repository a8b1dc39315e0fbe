//! Delivery pipeline for the hostpulse agent.
//!
//! A collected batch is handed to the [`engine::DeliveryEngine`], which
//! tries the message-bus transport once (when configured) and falls back to
//! the HTTP ingest endpoint with up to three attempts, sleeping with a
//! doubling, capped backoff between attempts. The backoff counter is owned
//! by the engine and persists across cycles: it resets only on a successful
//! delivery, never at a cycle boundary.
//!
//! The crate also carries the thin control-plane client (registration and
//! server config pull) and the bulk log shipper.

pub mod api;
pub mod backoff;
pub mod engine;
pub mod error;
pub mod logs;
pub mod transport;


pub use engine::DeliveryEngine;
pub use error::{DeliveryError, Result};
pub use transport::{BusTransport, HttpTransport, MetricSink};
