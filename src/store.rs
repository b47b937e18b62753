use crate::airport::{Airport, AirportId};
use crate::assignment::{AssignmentId, AssignmentStatus, FlightAssignment, Leg};
use crate::crew::{CrewId, CrewMember, Role};
use crate::error::{Error, Result};
use crate::flight::{Direction, Flight, FlightId};
use crate::rules::Rules;
use crate::time::compute_duration;
use crate::validate::duty::{DutySummary, summarize};
use crate::validate::{AssignmentSource, AssignmentValidator, Rejection, Verdict};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct ScenarioFlight {
    pub id: FlightId,
    pub flight_number: Arc<str>,
    pub origin_id: AirportId,
    pub destination_id: AirportId,
    pub direction: Direction,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioAssignment {
    pub crew_id: CrewId,
    pub flight_id: FlightId,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Records as they arrive from ingestion, before durations are derived.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub airports: Vec<Airport>,
    pub crew: Vec<CrewMember>,
    pub flights: Vec<ScenarioFlight>,
    #[serde(default)]
    pub assignments: Vec<ScenarioAssignment>,
}

/// In-memory crew, flight and assignment records.
pub struct Store {
    pub crew: HashMap<CrewId, CrewMember>,
    pub airports: HashMap<AirportId, Airport>,
    pub flights: Vec<Flight>,
    flights_index: HashMap<FlightId, usize>,
    pub assignments: Vec<FlightAssignment>,
    next_assignment_id: AssignmentId,
}

impl Store {
    pub fn new(
        crew: HashMap<CrewId, CrewMember>,
        airports: HashMap<AirportId, Airport>,
        mut flights: Vec<Flight>,
    ) -> Store {
        flights.sort_by_key(|f| f.departure_time);
        let flights_index = flights
            .iter()
            .enumerate()
            .map(|(i, v)| (v.id.clone(), i))
            .collect::<HashMap<FlightId, usize>>();
        Store {
            crew,
            airports,
            flights,
            flights_index,
            assignments: vec![],
            next_assignment_id: 1,
        }
    }

    pub fn load_from_file(path: &Path, rules: &Rules) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&data)?;
        Store::from_scenario(scenario, rules)
    }

    /// Builds a store from ingested records, deriving every flight's duration
    /// from its airports' UTC offsets. Existing assignments are taken as-is.
    pub fn from_scenario(scenario: Scenario, rules: &Rules) -> Result<Self> {
        let mut airports = HashMap::new();
        for airport in scenario.airports {
            if airports.contains_key(&airport.id) {
                return Err(Error::Duplicate { kind: "airport", id: airport.id });
            }
            airports.insert(airport.id.clone(), airport);
        }

        let mut crew = HashMap::new();
        for member in scenario.crew {
            if !rules.is_recognized_role(&member.role) {
                warn!(crew = %member.id, role = %member.role, "crew member has an unrecognized role");
            }
            if crew.contains_key(&member.id) {
                return Err(Error::Duplicate { kind: "crew member", id: member.id });
            }
            crew.insert(member.id.clone(), member);
        }

        let mut flights: Vec<Flight> = Vec::with_capacity(scenario.flights.len());
        for raw in scenario.flights {
            if flights.iter().any(|f| f.id == raw.id) {
                return Err(Error::Duplicate { kind: "flight", id: raw.id });
            }
            for airport in [&raw.origin_id, &raw.destination_id] {
                if !airports.contains_key(airport) {
                    return Err(Error::UnknownAirport { flight: raw.id.clone(), airport: airport.clone() });
                }
            }
            let mut flight = Flight {
                id: raw.id,
                flight_number: raw.flight_number,
                origin_id: raw.origin_id,
                destination_id: raw.destination_id,
                direction: raw.direction,
                departure_time: raw.departure_time,
                arrival_time: raw.arrival_time,
                duration_minutes: 0,
                duration_text: String::new(),
                duration_valid: false,
            };
            Self::derive_duration(&airports, &mut flight, rules);
            flights.push(flight);
        }

        let mut store = Store::new(crew, airports, flights);
        for raw in scenario.assignments {
            if !store.crew.contains_key(&raw.crew_id) {
                return Err(Error::UnknownReference { kind: "crew member", id: raw.crew_id });
            }
            if store.flight_by_id(&raw.flight_id).is_none() {
                return Err(Error::UnknownReference { kind: "flight", id: raw.flight_id });
            }
            if store.active_assignment(&raw.crew_id, &raw.flight_id).is_some() {
                return Err(Error::Duplicate {
                    kind: "assignment",
                    id: Arc::from(format!("{}/{}", raw.crew_id, raw.flight_id)),
                });
            }
            let created_at = raw.created_at.unwrap_or_else(|| Utc::now().naive_utc());
            store.insert_active(raw.crew_id, raw.flight_id, created_at);
        }
        Ok(store)
    }

    fn derive_duration(airports: &HashMap<AirportId, Airport>, flight: &mut Flight, rules: &Rules) {
        let origin = airports.get(&flight.origin_id).map(|a| a.utc_offset.as_str());
        let destination = airports.get(&flight.destination_id).map(|a| a.utc_offset.as_str());
        let result = compute_duration(
            flight.departure_time,
            flight.arrival_time,
            origin,
            destination,
            rules.max_flight_duration(),
        );
        if !result.is_valid {
            warn!(flight = %flight.flight_number, "implausible flight duration");
        }
        flight.set_duration(result);
    }

    /// Recomputes every stored duration, e.g. after airport offsets change.
    pub fn rederive_durations(&mut self, rules: &Rules) {
        for flight in self.flights.iter_mut() {
            Self::derive_duration(&self.airports, flight, rules);
        }
    }

    pub fn flight_by_id(&self, id: &FlightId) -> Option<&Flight> {
        self.flights_index.get(id).map(|i| &self.flights[*i])
    }

    /// Stores an active assignment without validating it.
    pub fn insert_active(&mut self, crew_id: CrewId, flight_id: FlightId, created_at: NaiveDateTime) -> AssignmentId {
        let id = self.next_assignment_id;
        self.next_assignment_id += 1;
        self.assignments.push(FlightAssignment {
            id,
            crew_id,
            flight_id,
            status: AssignmentStatus::Active,
            created_at,
        });
        id
    }

    /// Validates and, if accepted, stores the assignment. The exclusive borrow
    /// keeps the read and the write in one step.
    pub fn commit(
        &mut self,
        validator: &AssignmentValidator,
        crew_id: &CrewId,
        flight_id: &FlightId,
    ) -> std::result::Result<AssignmentId, Rejection> {
        if let Err(rejection) = validator.validate(&*self, crew_id, flight_id) {
            info!(crew = %crew_id, flight = %flight_id, category = rejection.category(), "assignment rejected");
            return Err(rejection);
        }
        let id = self.insert_active(crew_id.clone(), flight_id.clone(), Utc::now().naive_utc());
        info!(crew = %crew_id, flight = %flight_id, assignment = id, "assignment committed");
        Ok(id)
    }

    /// Flips the active assignment of `crew_id` on `flight_id` to removed.
    pub fn remove(&mut self, crew_id: &CrewId, flight_id: &FlightId) -> Result<AssignmentId> {
        let assignment = self
            .assignments
            .iter_mut()
            .find(|a| a.is_active() && a.crew_id == *crew_id && a.flight_id == *flight_id)
            .ok_or_else(|| Error::NotAssigned { crew: crew_id.clone(), flight: flight_id.clone() })?;
        assignment.status = AssignmentStatus::Removed;
        info!(crew = %crew_id, flight = %flight_id, assignment = assignment.id, "assignment removed");
        Ok(assignment.id)
    }

    pub fn duty_summary(&self, rules: &Rules, crew_id: &CrewId, date: NaiveDate) -> DutySummary {
        let flights = self
            .crew_legs(crew_id, date, date)
            .into_iter()
            .map(|leg| leg.flight)
            .collect::<Vec<&Flight>>();
        summarize(rules, date, &flights)
    }
}

impl AssignmentSource for Store {
    fn crew_member(&self, id: &CrewId) -> Option<&CrewMember> {
        self.crew.get(id)
    }

    fn flight(&self, id: &FlightId) -> Option<&Flight> {
        self.flight_by_id(id)
    }

    fn active_assignment(&self, crew: &CrewId, flight: &FlightId) -> Option<&FlightAssignment> {
        self.assignments
            .iter()
            .find(|a| a.is_active() && a.crew_id == *crew && a.flight_id == *flight)
    }

    fn crew_legs(&self, crew: &CrewId, from: NaiveDate, to: NaiveDate) -> Vec<Leg<'_>> {
        let mut legs = self
            .assignments
            .iter()
            .filter(|a| a.is_active() && a.crew_id == *crew)
            .filter_map(|a| self.flight_by_id(&a.flight_id).map(|f| Leg { assignment: a, flight: f }))
            .filter(|leg| (from..=to).contains(&leg.flight.date()))
            .collect::<Vec<_>>();
        legs.sort_by_key(|leg| leg.flight.departure_time);
        legs
    }

    fn flight_roles(&self, flight: &FlightId) -> Vec<Role> {
        self.assignments
            .iter()
            .filter(|a| a.is_active() && a.flight_id == *flight)
            .filter_map(|a| self.crew.get(&a.crew_id))
            .map(|c| c.role.clone())
            .collect()
    }
}

/// A store shared between threads. `commit` holds one lock across read,
/// validation and insert, so two proposals touching the same crew member or
/// flight can never both pass against the same snapshot.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
    validator: Arc<AssignmentValidator>,
}

impl SharedStore {
    pub fn new(store: Store, validator: AssignmentValidator) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
            validator: Arc::new(validator),
        }
    }

    pub fn rules(&self) -> &Rules {
        self.validator.rules()
    }

    /// Dry run: validates without storing anything.
    pub fn validate(&self, crew_id: &CrewId, flight_id: &FlightId) -> Verdict {
        let store = self.inner.lock();
        self.validator.validate(&*store, crew_id, flight_id)
    }

    pub fn commit(&self, crew_id: &CrewId, flight_id: &FlightId) -> std::result::Result<AssignmentId, Rejection> {
        let mut store = self.inner.lock();
        store.commit(&self.validator, crew_id, flight_id)
    }

    pub fn remove(&self, crew_id: &CrewId, flight_id: &FlightId) -> Result<AssignmentId> {
        self.inner.lock().remove(crew_id, flight_id)
    }

    pub fn read<R>(&self, f: impl FnOnce(&Store) -> R) -> R {
        f(&self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SCENARIO: &str = r#"{
        "airports": [
            {"id": "LTN", "utc_offset": "GMT+0"},
            {"id": "BCN", "utc_offset": "GMT+1"},
            {"id": "JFK", "utc_offset": "GMT-5"}
        ],
        "crew": [
            {"id": "C1", "name": "Ada", "role": "Pilot"},
            {"id": "C2", "name": "Grace", "role": "flight attendant", "on_leave": true}
        ],
        "flights": [
            {"id": "F1", "flight_number": "EZY123", "origin_id": "LTN", "destination_id": "BCN",
             "direction": "departure", "departure_time": "2024-01-15T10:00:00", "arrival_time": "2024-01-15T13:00:00"},
            {"id": "F2", "flight_number": "EZY124", "origin_id": "BCN", "destination_id": "LTN",
             "direction": "arrival", "departure_time": "2024-01-15T17:00:00", "arrival_time": "2024-01-15T18:00:00"},
            {"id": "F3", "flight_number": "BA178", "origin_id": "JFK", "destination_id": "LTN",
             "direction": "arrival", "departure_time": "2024-01-15T23:00:00", "arrival_time": "2024-01-16T11:00:00"},
            {"id": "F4", "flight_number": "EZY125", "origin_id": "LTN", "destination_id": "BCN",
             "direction": "departure", "departure_time": "2024-01-15T14:00:00", "arrival_time": "2024-01-15T17:00:00"}
        ],
        "assignments": [
            {"crew_id": "C1", "flight_id": "F1", "created_at": "2024-01-01T09:00:00"}
        ]
    }"#;

    fn id(s: &str) -> Arc<str> {
        Arc::from(s)
    }

    fn load() -> Store {
        let scenario: Scenario = serde_json::from_str(SCENARIO).unwrap();
        Store::from_scenario(scenario, &Rules::default()).unwrap()
    }

    #[test]
    fn test_scenario_derives_durations() {
        let store = load();

        let f1 = store.flight_by_id(&id("F1")).unwrap();
        assert_eq!(120, f1.duration_minutes);
        assert_eq!("2h 0m", f1.duration_text);
        assert!(f1.duration_valid);

        let f3 = store.flight_by_id(&id("F3")).unwrap();
        // 04:00 to 11:00 UTC
        assert_eq!(420, f3.duration_minutes);
        assert_eq!("7h 0m", f3.duration_text);
    }

    #[test]
    fn test_scenario_seeds_assignments() {
        let store = load();

        assert_eq!(1, store.assignments.len());
        assert!(store.active_assignment(&id("C1"), &id("F1")).is_some());
        assert_eq!(vec![Role::Pilot], store.flight_roles(&id("F1")));
    }

    #[test]
    fn test_scenario_rejects_unknown_airport() {
        let json = SCENARIO.replace(r#""destination_id": "BCN""#, r#""destination_id": "MAD""#);
        let scenario: Scenario = serde_json::from_str(&json).unwrap();

        let err = Store::from_scenario(scenario, &Rules::default()).err().unwrap();
        assert!(matches!(err, Error::UnknownAirport { .. }));
    }

    #[test]
    fn test_scenario_rejects_duplicate_assignment() {
        let json = SCENARIO.replace(
            r#"{"crew_id": "C1", "flight_id": "F1", "created_at": "2024-01-01T09:00:00"}"#,
            r#"{"crew_id": "C1", "flight_id": "F1"}, {"crew_id": "C1", "flight_id": "F1"}"#,
        );
        let scenario: Scenario = serde_json::from_str(&json).unwrap();

        let err = Store::from_scenario(scenario, &Rules::default()).err().unwrap();
        assert!(matches!(err, Error::Duplicate { kind: "assignment", .. }));
    }

    #[test]
    fn test_bundled_sample_data_loads() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let rules = Rules::load(&data.join("rules.toml")).unwrap();
        let store = Store::load_from_file(&data.join("default.json"), &rules).unwrap();

        assert!(rules.enforce_duty_limit);
        assert_eq!(id("LTN"), rules.hub_airport);
        assert_eq!(10, store.flights.len());
        assert_eq!(5, store.assignments.len());
        assert!(store.flights.iter().all(|f| f.duration_valid));
        assert_eq!(
            Some("10h 0m"),
            store.flight_by_id(&id("FL009")).map(|f| f.duration_text.as_str())
        );
    }

    #[test]
    fn test_commit_and_remove() {
        let mut store = load();
        let validator = AssignmentValidator::default();

        let rejected = store.commit(&validator, &id("C1"), &id("F1")).unwrap_err();
        assert_eq!("duplicate_assignment", rejected.category());

        let committed = store.commit(&validator, &id("C1"), &id("F2")).unwrap();
        assert!(store.active_assignment(&id("C1"), &id("F2")).is_some());

        assert_eq!(committed, store.remove(&id("C1"), &id("F2")).unwrap());
        assert!(store.active_assignment(&id("C1"), &id("F2")).is_none());
        assert!(matches!(
            store.remove(&id("C1"), &id("F2")),
            Err(Error::NotAssigned { .. })
        ));

        // a removed assignment no longer blocks a new one
        store.commit(&validator, &id("C1"), &id("F2")).unwrap();
    }

    #[test]
    fn test_commit_rejects_crew_on_leave() {
        let mut store = load();
        let rejected = store
            .commit(&AssignmentValidator::default(), &id("C2"), &id("F1"))
            .unwrap_err();

        assert_eq!("crew_unavailable", rejected.category());
        assert_eq!(409, rejected.status());
    }

    #[test]
    fn test_duty_summary() {
        let mut store = load();
        let rules = Rules::default();
        store.commit(&AssignmentValidator::new(rules.clone()), &id("C1"), &id("F2")).unwrap();

        let summary = store.duty_summary(&rules, &id("C1"), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        assert_eq!(2, summary.total_flights);
        assert_eq!(Some("09:00".to_string()), summary.duty_start);
        assert_eq!(Some("18:30".to_string()), summary.duty_end);
        assert_eq!("9h 30m", summary.total_duty_time);
        assert!(summary.within_limits);
        assert_eq!("LTN → BCN", summary.flights[0].route);
        assert_eq!("2h 0m", summary.flights[0].duration);
    }

    #[test]
    fn test_rederive_durations_after_offset_change() {
        let mut store = load();
        let rules = Rules::default();
        store.airports.get_mut(&id("BCN")).unwrap().utc_offset = "GMT+0".to_string();

        store.rederive_durations(&rules);

        assert_eq!(180, store.flight_by_id(&id("F1")).unwrap().duration_minutes);
    }

    #[test]
    fn test_concurrent_conflicting_commits_admit_one() {
        let mut store = load();
        store.remove(&id("C1"), &id("F1")).unwrap();
        let shared = SharedStore::new(store, AssignmentValidator::default());

        // F1 and F4 are both LTN departures on the same day
        let handles = ["F1", "F4"]
            .into_iter()
            .map(|flight| {
                let shared = shared.clone();
                thread::spawn(move || shared.commit(&id("C1"), &id(flight)))
            })
            .collect::<Vec<_>>();
        let results = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();

        assert_eq!(1, results.iter().filter(|r| r.is_ok()).count());
        assert_eq!(
            1,
            shared.read(|s| s.crew_legs(&id("C1"), NaiveDate::MIN, NaiveDate::MAX).len())
        );
    }

    #[test]
    fn test_shared_validate_is_a_dry_run() {
        let store = load();
        let shared = SharedStore::new(store, AssignmentValidator::default());

        assert!(shared.validate(&id("C1"), &id("F2")).is_ok());
        assert!(shared.validate(&id("C1"), &id("F2")).is_ok());
        assert!(shared.read(|s| s.active_assignment(&id("C1"), &id("F2")).is_none()));
    }
}
