use crate::assignment::{AssignmentId, Leg};
use crate::time::{Interval, is_overlapping};
use chrono::TimeDelta;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    DepartureTooCloseAfterArrival,
    ArrivalTooCloseBeforeDeparture,
    FlightsOverlap,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::DepartureTooCloseAfterArrival => "departure_too_close_after_arrival",
            ConflictKind::ArrivalTooCloseBeforeDeparture => "arrival_too_close_before_departure",
            ConflictKind::FlightsOverlap => "flights_overlap",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub assignment_id: AssignmentId,
    pub flight_number: Arc<str>,
    /// Gap to the existing flight, or the overlap length for `FlightsOverlap`.
    pub time_gap: TimeDelta,
    pub required_buffer: TimeDelta,
}

fn hours(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 / 3600.0
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: Gap of {:.1}h is less than required {:.1}h buffer with flight {}",
            self.kind,
            hours(self.time_gap),
            hours(self.required_buffer),
            self.flight_number
        )
    }
}

/// Classifies how `proposed` clashes with `existing`. The rules are tried in
/// order and the first match wins: too close after, too close before, then
/// overlap. The buffer only applies to the two non-overlapping cases.
pub fn classify(
    existing: &Interval,
    proposed: &Interval,
    buffer: TimeDelta,
) -> Option<(ConflictKind, TimeDelta)> {
    let (existing_dep, existing_arr) = *existing;
    let (new_dep, new_arr) = *proposed;

    if new_dep > existing_arr {
        let gap = new_dep - existing_arr;
        if gap < buffer {
            return Some((ConflictKind::DepartureTooCloseAfterArrival, gap));
        }
    }

    if new_arr < existing_dep {
        let gap = existing_dep - new_arr;
        if gap < buffer {
            return Some((ConflictKind::ArrivalTooCloseBeforeDeparture, gap));
        }
    }

    if is_overlapping(proposed, existing) {
        let overlap = new_arr.min(existing_arr) - new_dep.max(existing_dep);
        return Some((ConflictKind::FlightsOverlap, overlap));
    }

    None
}

pub fn detect_conflict(existing: &Leg<'_>, proposed: &Interval, buffer: TimeDelta) -> Option<Conflict> {
    classify(&existing.flight.interval(), proposed, buffer).map(|(kind, time_gap)| Conflict {
        kind,
        assignment_id: existing.assignment.id,
        flight_number: existing.flight.flight_number.clone(),
        time_gap,
        required_buffer: buffer,
    })
}
