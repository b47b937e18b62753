use crate::crew::CrewId;
use crate::flight::{Flight, FlightId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

pub type AssignmentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Removed,
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentStatus::Active => write!(f, "active"),
            AssignmentStatus::Removed => write!(f, "removed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct FlightAssignment {
    pub id: AssignmentId,
    #[tabled(rename = "crew")]
    pub crew_id: CrewId,
    #[tabled(rename = "flight")]
    pub flight_id: FlightId,
    pub status: AssignmentStatus,
    #[tabled(rename = "created")]
    pub created_at: NaiveDateTime,
}

impl FlightAssignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }
}

/// An assignment joined with the flight it points at.
#[derive(Debug, Clone, Copy)]
pub struct Leg<'a> {
    pub assignment: &'a FlightAssignment,
    pub flight: &'a Flight,
}
