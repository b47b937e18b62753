use crate::airport::AirportId;
use crate::crew::CrewId;
use crate::flight::FlightId;
use std::sync::Arc;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures while loading or mutating stored state. Rule violations are
/// reported separately as [`crate::validate::Rejection`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid rules file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("flight {flight} references unknown airport {airport}")]
    UnknownAirport { flight: FlightId, airport: AirportId },

    #[error("duplicate {kind} {id}")]
    Duplicate { kind: &'static str, id: Arc<str> },

    #[error("assignment references unknown {kind} {id}")]
    UnknownReference { kind: &'static str, id: Arc<str> },

    #[error("crew member {crew} has no active assignment on flight {flight}")]
    NotAssigned { crew: CrewId, flight: FlightId },
}
