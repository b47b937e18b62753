use crate::airport::AirportId;
use crate::assignment::Leg;
use crate::flight::Flight;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Broken hub round-trip rule. Messages name the flights involved so the
/// crew scheduler can see which leg to move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceViolation {
    #[error(
        "Crew member already has a departure flight from {hub} on {date}: {existing} at {at}. Only one departure per day is allowed."
    )]
    SecondDeparture {
        hub: AirportId,
        date: NaiveDate,
        existing: Arc<str>,
        at: String,
    },

    #[error(
        "Crew member already has an arrival flight to {hub} on {date}: {existing} at {at}. Only one arrival per day is allowed."
    )]
    SecondArrival {
        hub: AirportId,
        date: NaiveDate,
        existing: Arc<str>,
        at: String,
    },

    #[error(
        "Arrival flight {flight} origin ({origin}) must match the destination of departure flight {outbound} ({outbound_destination}) on the same day. Crew must return from the same location they departed to."
    )]
    ReturnOriginMismatch {
        flight: Arc<str>,
        origin: AirportId,
        outbound: Arc<str>,
        outbound_destination: AirportId,
    },

    #[error(
        "Departure flight {flight} destination ({destination}) must match the origin of arrival flight {inbound} ({inbound_origin}) on the same day. Crew must depart to the same location they will return from."
    )]
    OutboundDestinationMismatch {
        flight: Arc<str>,
        destination: AirportId,
        inbound: Arc<str>,
        inbound_origin: AirportId,
    },

    #[error(
        "Departure flight {flight} at {departs} must be scheduled before arrival flight {inbound} at {inbound_departs} on the same day."
    )]
    OutboundNotBeforeReturn {
        flight: Arc<str>,
        departs: String,
        inbound: Arc<str>,
        inbound_departs: String,
    },

    #[error(
        "Arrival flight {flight} at {departs} must be scheduled after departure flight {outbound} lands at {outbound_lands} on the same day."
    )]
    ReturnBeforeOutboundLanded {
        flight: Arc<str>,
        departs: String,
        outbound: Arc<str>,
        outbound_lands: String,
    },
}

fn hhmm(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Same-day legs split by their role in a hub round trip.
#[derive(Debug, Default)]
pub struct HubLegs<'a> {
    pub departures: Vec<Leg<'a>>,
    pub arrivals: Vec<Leg<'a>>,
}

pub fn partition<'a>(legs: &[Leg<'a>], hub: &str) -> HubLegs<'a> {
    let mut out = HubLegs::default();
    for leg in legs {
        if leg.flight.is_hub_departure(hub) {
            debug!(flight = %leg.flight.flight_number, route = %leg.flight.route(), "existing hub departure");
            out.departures.push(*leg);
        } else if leg.flight.is_hub_arrival(hub) {
            debug!(flight = %leg.flight.flight_number, route = %leg.flight.route(), "existing hub arrival");
            out.arrivals.push(*leg);
        }
    }
    out
}

/// Checks the hub round-trip rules for `flight` against the crew member's
/// active legs departing on the same date. The first broken rule is returned.
pub fn check_sequence(hub: &AirportId, flight: &Flight, same_day: &[Leg<'_>]) -> Result<(), SequenceViolation> {
    let legs = partition(same_day, hub);
    let is_departure = flight.is_hub_departure(hub);
    let is_arrival = flight.is_hub_arrival(hub);
    let outbound = legs.departures.first().map(|leg| leg.flight);
    let inbound = legs.arrivals.first().map(|leg| leg.flight);

    debug!(is_departure, is_arrival, date = %flight.date(), "checking hub sequence");

    if let (true, Some(existing)) = (is_departure, outbound) {
        return Err(SequenceViolation::SecondDeparture {
            hub: hub.clone(),
            date: flight.date(),
            existing: existing.flight_number.clone(),
            at: hhmm(existing.departure_time),
        });
    }

    if let (true, Some(existing)) = (is_arrival, inbound) {
        return Err(SequenceViolation::SecondArrival {
            hub: hub.clone(),
            date: flight.date(),
            existing: existing.flight_number.clone(),
            at: hhmm(existing.arrival_time),
        });
    }

    if let (true, Some(outbound)) = (is_arrival, outbound) {
        if flight.origin_id != outbound.destination_id {
            return Err(SequenceViolation::ReturnOriginMismatch {
                flight: flight.flight_number.clone(),
                origin: flight.origin_id.clone(),
                outbound: outbound.flight_number.clone(),
                outbound_destination: outbound.destination_id.clone(),
            });
        }
    }

    if let (true, Some(inbound)) = (is_departure, inbound) {
        if flight.destination_id != inbound.origin_id {
            return Err(SequenceViolation::OutboundDestinationMismatch {
                flight: flight.flight_number.clone(),
                destination: flight.destination_id.clone(),
                inbound: inbound.flight_number.clone(),
                inbound_origin: inbound.origin_id.clone(),
            });
        }
        // departure vs departure, not departure vs the inbound landing
        if flight.departure_time >= inbound.departure_time {
            return Err(SequenceViolation::OutboundNotBeforeReturn {
                flight: flight.flight_number.clone(),
                departs: hhmm(flight.departure_time),
                inbound: inbound.flight_number.clone(),
                inbound_departs: hhmm(inbound.departure_time),
            });
        }
    }

    if let (true, Some(outbound)) = (is_arrival, outbound) {
        if flight.departure_time <= outbound.arrival_time {
            return Err(SequenceViolation::ReturnBeforeOutboundLanded {
                flight: flight.flight_number.clone(),
                departs: hhmm(flight.departure_time),
                outbound: outbound.flight_number.clone(),
                outbound_lands: hhmm(outbound.arrival_time),
            });
        }
    }

    Ok(())
}
