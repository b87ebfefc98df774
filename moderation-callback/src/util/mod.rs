//! Small shared utilities.

pub mod clock;
pub mod interval;

pub use clock::{Clock, ManualClock, SystemClock};
pub use interval::{format_interval, format_signed_interval};
