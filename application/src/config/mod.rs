//! Application-level configuration.
//!
//! - [`DriverParams`] — round-sequence pacing, backend time budget and RNG seed

pub mod driver_params;

pub use driver_params::DriverParams;
