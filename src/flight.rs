use crate::airport::AirportId;
use crate::time::{DurationResult, Interval};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tabled::Tabled;

pub type FlightId = Arc<str>;

/// Direction of a flight relative to the hub airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Departure,
    Arrival,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Departure => write!(f, "departure"),
            Direction::Arrival => write!(f, "arrival"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Flight {
    pub id: FlightId,
    #[tabled(rename = "number")]
    pub flight_number: Arc<str>,
    #[tabled(rename = "origin")]
    pub origin_id: AirportId,
    #[tabled(rename = "destination")]
    pub destination_id: AirportId,
    pub direction: Direction,
    #[tabled(rename = "departure")]
    pub departure_time: NaiveDateTime,
    #[tabled(rename = "arrival")]
    pub arrival_time: NaiveDateTime,
    #[serde(default)]
    #[tabled(skip)]
    pub duration_minutes: i64,
    #[serde(default)]
    #[tabled(rename = "duration")]
    pub duration_text: String,
    #[serde(default)]
    #[tabled(rename = "valid")]
    pub duration_valid: bool,
}

impl Flight {
    pub fn interval(&self) -> Interval {
        (self.departure_time, self.arrival_time)
    }

    /// Calendar date of the local departure.
    pub fn date(&self) -> NaiveDate {
        self.departure_time.date()
    }

    pub fn has_valid_interval(&self) -> bool {
        self.arrival_time > self.departure_time
    }

    pub fn is_hub_departure(&self, hub: &str) -> bool {
        self.direction == Direction::Departure && *self.origin_id == *hub
    }

    pub fn is_hub_arrival(&self, hub: &str) -> bool {
        self.direction == Direction::Arrival && *self.destination_id == *hub
    }

    pub fn route(&self) -> String {
        format!("{} → {}", self.origin_id, self.destination_id)
    }

    pub fn set_duration(&mut self, result: DurationResult) {
        self.duration_minutes = result.minutes;
        self.duration_text = result.text;
        self.duration_valid = result.is_valid;
    }
}
