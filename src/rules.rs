use crate::airport::AirportId;
use crate::crew::Role;
use crate::error::Result;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Thresholds for assignment validation. Every field may be omitted from a
/// rules file; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Minimum gap between two flights of the same crew member.
    pub buffer_hours: u32,
    pub max_flights_per_day: usize,
    pub max_pilots_per_flight: usize,
    pub max_attendants_per_flight: usize,
    pub duty_time_limit_hours: u32,
    /// Durations above this are treated as bad input.
    pub max_flight_duration_hours: u32,
    pub crew_roles: Vec<String>,
    pub hub_airport: AirportId,
    /// Reject assignments that push the duty window over the limit instead of
    /// only reporting it.
    pub enforce_duty_limit: bool,
    pub duty_report_minutes: u32,
    pub duty_release_minutes: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Rules {
            buffer_hours: 3,
            max_flights_per_day: 2,
            max_pilots_per_flight: 2,
            max_attendants_per_flight: 4,
            duty_time_limit_hours: 14,
            max_flight_duration_hours: 20,
            crew_roles: vec!["pilot".to_string(), "flight attendant".to_string()],
            hub_airport: Arc::from("LTN"),
            enforce_duty_limit: false,
            duty_report_minutes: 60,
            duty_release_minutes: 30,
        }
    }
}

impl Rules {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&data)?)
    }

    pub fn buffer(&self) -> TimeDelta {
        TimeDelta::hours(self.buffer_hours.into())
    }

    pub fn max_flight_duration(&self) -> TimeDelta {
        TimeDelta::hours(self.max_flight_duration_hours.into())
    }

    pub fn duty_report(&self) -> TimeDelta {
        TimeDelta::minutes(self.duty_report_minutes.into())
    }

    pub fn duty_release(&self) -> TimeDelta {
        TimeDelta::minutes(self.duty_release_minutes.into())
    }

    pub fn is_recognized_role(&self, role: &Role) -> bool {
        self.crew_roles.iter().any(|r| Role::parse(r) == *role)
    }

    /// Cap for a role on a single flight; `None` for roles without a quota.
    pub fn roster_cap(&self, role: &Role) -> Option<usize> {
        match role {
            Role::Pilot => Some(self.max_pilots_per_flight),
            Role::FlightAttendant => Some(self.max_attendants_per_flight),
            Role::Other(_) => None,
        }
    }
}
