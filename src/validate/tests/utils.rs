use crate::assignment::AssignmentId;
use crate::crew::{CrewId, CrewMember, Role};
use crate::flight::{Direction, Flight};
use crate::store::Store;
use crate::time::Interval;
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::Strategy;
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::collections::HashMap;
use std::sync::Arc;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

/// 2024-01-`day` at `hour`:00.
pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn add_crew(crew: &mut HashMap<CrewId, CrewMember>, crew_id: &str, role: &str, on_leave: bool) {
    crew.insert(
        id(crew_id),
        CrewMember {
            id: id(crew_id),
            name: format!("Crew {}", crew_id),
            role: Role::parse(role),
            on_leave,
        },
    );
}

pub fn add_flight(
    flights: &mut Vec<Flight>,
    flight_id: &str,
    direction: Direction,
    origin_id: &str,
    destination_id: &str,
    departure_time: NaiveDateTime,
    arrival_time: NaiveDateTime,
) {
    flights.push(Flight {
        id: id(flight_id),
        flight_number: id(flight_id),
        origin_id: id(origin_id),
        destination_id: id(destination_id),
        direction,
        departure_time,
        arrival_time,
        duration_minutes: 0,
        duration_text: String::new(),
        duration_valid: false,
    });
}

pub fn store(crew: HashMap<CrewId, CrewMember>, flights: Vec<Flight>) -> Store {
    Store::new(crew, HashMap::new(), flights)
}

pub fn assign(store: &mut Store, crew_id: &str, flight_id: &str) -> AssignmentId {
    store.insert_active(id(crew_id), id(flight_id), at(1, 0))
}

pub fn arb_interval() -> impl Strategy<Value = Interval> {
    (0..72u32, 1..14u32).prop_map(|(start, len)| {
        let dep = at(14, 0) + chrono::TimeDelta::hours(start.into());
        (dep, dep + chrono::TimeDelta::hours(len.into()))
    })
}

pub fn arb_airport() -> impl Strategy<Value = Arc<str>> {
    prop_oneof![Just(id("LTN")), Just(id("BCN")), Just(id("MAD"))]
}
