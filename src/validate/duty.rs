use crate::flight::Flight;
use crate::rules::Rules;
use crate::time::format_duration;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::Serialize;
use std::sync::Arc;
use tabled::Tabled;

/// Span from reporting for the first flight to release after the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DutyWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DutyWindow {
    pub fn total(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whole hours on duty, rounded down.
    pub fn hours(&self) -> i64 {
        self.total().num_hours()
    }

    /// Compared in whole hours, so a window of 14h59m is still within a 14h
    /// limit.
    pub fn exceeds(&self, rules: &Rules) -> bool {
        self.hours() > i64::from(rules.duty_time_limit_hours)
    }
}

/// `flights` must be one day's flights ordered by departure. `None` when
/// there are no flights or the padded window leaves the calendar.
pub fn duty_window(rules: &Rules, flights: &[&Flight]) -> Option<DutyWindow> {
    let first = flights.first()?;
    let last = flights.last()?;
    Some(DutyWindow {
        start: first.departure_time.checked_sub_signed(rules.duty_report())?,
        end: last.arrival_time.checked_add_signed(rules.duty_release())?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DutyFlight {
    #[tabled(rename = "flight")]
    pub flight_number: Arc<str>,
    pub departure: String,
    pub arrival: String,
    pub route: String,
    pub duration: String,
}

impl From<&Flight> for DutyFlight {
    fn from(f: &Flight) -> Self {
        // stored text wins, even "0h 0m" on an implausible flight
        let duration = if f.duration_text.is_empty() {
            format_duration(f.arrival_time - f.departure_time)
        } else {
            f.duration_text.clone()
        };
        DutyFlight {
            flight_number: f.flight_number.clone(),
            departure: f.departure_time.format("%H:%M").to_string(),
            arrival: f.arrival_time.format("%H:%M").to_string(),
            route: f.route(),
            duration,
        }
    }
}

/// A crew member's day as shown to schedulers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DutySummary {
    pub date: NaiveDate,
    pub flights: Vec<DutyFlight>,
    pub total_flights: usize,
    pub duty_start: Option<String>,
    pub duty_end: Option<String>,
    pub total_duty_time: String,
    pub within_limits: bool,
}

pub fn summarize(rules: &Rules, date: NaiveDate, flights: &[&Flight]) -> DutySummary {
    let rows = flights.iter().map(|f| DutyFlight::from(*f)).collect::<Vec<_>>();
    match duty_window(rules, flights) {
        Some(window) => DutySummary {
            date,
            total_flights: rows.len(),
            flights: rows,
            duty_start: Some(window.start.format("%H:%M").to_string()),
            duty_end: Some(window.end.format("%H:%M").to_string()),
            total_duty_time: format_duration(window.total()),
            within_limits: !window.exceeds(rules),
        },
        None => DutySummary {
            date,
            flights: vec![],
            total_flights: 0,
            duty_start: None,
            duty_end: None,
            total_duty_time: "0h 0m".to_string(),
            within_limits: true,
        },
    }
}
