use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tabled::Tabled;

pub type CrewId = Arc<str>;

/// Crew role. Parsing is case-insensitive; roles outside the built-in set are
/// kept verbatim (lowercased) so callers can still group by them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Pilot,
    FlightAttendant,
    Other(Arc<str>),
}

impl Role {
    pub fn parse(s: &str) -> Role {
        match s.trim().to_lowercase().as_str() {
            "pilot" => Role::Pilot,
            "flight attendant" | "flight_attendant" => Role::FlightAttendant,
            other => Role::Other(Arc::from(other)),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Pilot => "pilot",
            Role::FlightAttendant => "flight attendant",
            Role::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::parse(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct CrewMember {
    pub id: CrewId,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub on_leave: bool,
}
