//! Legality checks for proposed crew-to-flight assignments.

pub mod conflict;
pub mod duty;
pub mod rejection;
pub mod roster_limit;
pub mod sequence;
pub mod validator;


pub use conflict::{Conflict, ConflictKind};
pub use duty::{DutySummary, DutyWindow};
pub use rejection::Rejection;
pub use sequence::SequenceViolation;
pub use validator::{AssignmentValidator, Verdict};

use crate::assignment::{FlightAssignment, Leg};
use crate::crew::{CrewId, CrewMember, Role};
use crate::flight::{Flight, FlightId};
use chrono::NaiveDate;

/// Read-only view of stored crew, flights and assignments.
pub trait AssignmentSource {
    fn crew_member(&self, id: &CrewId) -> Option<&CrewMember>;

    fn flight(&self, id: &FlightId) -> Option<&Flight>;

    fn active_assignment(&self, crew: &CrewId, flight: &FlightId) -> Option<&FlightAssignment>;

    /// Active legs of `crew` whose departure date lies in `from..=to`, ordered
    /// by departure.
    fn crew_legs(&self, crew: &CrewId, from: NaiveDate, to: NaiveDate) -> Vec<Leg<'_>>;

    /// Roles of every crew member actively assigned to `flight`.
    fn flight_roles(&self, flight: &FlightId) -> Vec<Role>;
}
