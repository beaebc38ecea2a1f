pub mod inflight;
pub mod logging;

pub use inflight::{InFlight, InFlightGuard};
