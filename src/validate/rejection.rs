use crate::crew::{CrewId, Role};
use crate::flight::FlightId;
use crate::validate::conflict::Conflict;
use crate::validate::sequence::SequenceViolation;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a proposed assignment was turned down.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("Flight {flight_number} arrives at {arrival} which is not after its departure at {departure}")]
    InvalidSchedule {
        flight_number: Arc<str>,
        departure: NaiveDateTime,
        arrival: NaiveDateTime,
    },

    #[error("Crew member {0} not found")]
    CrewNotFound(CrewId),

    #[error("Flight {0} not found")]
    FlightNotFound(FlightId),

    #[error("Crew member is already assigned to flight {flight_number}")]
    DuplicateAssignment { flight_number: Arc<str> },

    #[error(transparent)]
    Sequence(#[from] SequenceViolation),

    #[error("Crew member already has {max} flights scheduled on {date}. Maximum allowed: {max} per day.")]
    DailyQuotaExceeded { date: NaiveDate, max: usize },

    #[error("Flight assignment conflicts detected: {}", join_conflicts(.conflicts))]
    TimeConflict { conflicts: Vec<Conflict> },

    #[error("Crew member {name} is currently on leave and cannot be assigned to flights")]
    CrewOnLeave { name: String },

    #[error("Flight {flight_number} already has {max} {role}s assigned")]
    RosterFull {
        flight_number: Arc<str>,
        role: Role,
        max: usize,
    },

    #[error("Duty time of {total} on {date} would exceed the {limit_hours}h limit")]
    DutyLimitExceeded {
        date: NaiveDate,
        total: String,
        limit_hours: u32,
    },
}

impl Rejection {
    pub fn category(&self) -> &'static str {
        match self {
            Rejection::InvalidSchedule { .. } => "invalid_schedule",
            Rejection::CrewNotFound(_) => "crew_not_found",
            Rejection::FlightNotFound(_) => "flight_not_found",
            Rejection::DuplicateAssignment { .. } => "duplicate_assignment",
            Rejection::Sequence(_) => "sequence_violation",
            Rejection::DailyQuotaExceeded { .. } => "daily_quota_exceeded",
            Rejection::TimeConflict { .. } => "time_conflict",
            Rejection::CrewOnLeave { .. } => "crew_unavailable",
            Rejection::RosterFull { .. } => "roster_quota_exceeded",
            Rejection::DutyLimitExceeded { .. } => "duty_limit_exceeded",
        }
    }

    /// HTTP-style status class for front ends: 400 for a malformed proposal,
    /// 404 for missing records, 409 for conflicts with stored state.
    pub fn status(&self) -> u16 {
        match self {
            Rejection::InvalidSchedule { .. } => 400,
            Rejection::CrewNotFound(_) | Rejection::FlightNotFound(_) => 404,
            _ => 409,
        }
    }

    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Rejection::TimeConflict { conflicts } => conflicts,
            _ => &[],
        }
    }
}
