//! Crew-to-flight assignment validation: double-booking, rest buffers, hub
//! round trips, per-flight crew quotas and duty time.

pub mod airport;
pub mod assignment;
pub mod crew;
pub mod error;
pub mod flight;
pub mod rules;
pub mod store;
pub mod time;
pub mod validate;

pub use error::{Error, Result};
pub use rules::Rules;
pub use store::{SharedStore, Store};
pub use time::{DurationResult, compute_duration, parse_offset, zoned_duration};
pub use validate::{AssignmentSource, AssignmentValidator, Rejection, Verdict};
