use crate::assignment::Leg;
use crate::crew::CrewId;
use crate::flight::{Flight, FlightId};
use crate::rules::Rules;
use crate::time::format_duration;
use crate::validate::conflict::{Conflict, detect_conflict};
use crate::validate::duty::duty_window;
use crate::validate::rejection::Rejection;
use crate::validate::roster_limit::check_roster_limit;
use crate::validate::sequence::check_sequence;
use crate::validate::AssignmentSource;
use chrono::Days;
use tracing::{debug, info, warn};

pub type Verdict = Result<(), Rejection>;

/// Decides whether a crew member may be put on a flight, given what is
/// already stored. Validation only reads from the [`AssignmentSource`]; the
/// caller is responsible for committing an accepted assignment without
/// letting another write to the same crew or flight slip in between.
#[derive(Debug, Clone, Default)]
pub struct AssignmentValidator {
    rules: Rules,
}

impl AssignmentValidator {
    pub fn new(rules: Rules) -> Self {
        AssignmentValidator { rules }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn validate(&self, source: &impl AssignmentSource, crew_id: &CrewId, flight_id: &FlightId) -> Verdict {
        let flight = source
            .flight(flight_id)
            .ok_or_else(|| Rejection::FlightNotFound(flight_id.clone()))?;
        self.validate_flight(source, crew_id, flight)
    }

    /// Runs every rule against `flight`, in order:
    /// duplicate, hub sequence, daily quota, time conflicts, leave, roster
    /// quota and, when enforced, the duty limit.
    pub fn validate_flight(&self, source: &impl AssignmentSource, crew_id: &CrewId, flight: &Flight) -> Verdict {
        info!(crew = %crew_id, flight = %flight.flight_number, direction = %flight.direction, "validating assignment");
        debug!(route = %flight.route(), departure = %flight.departure_time, arrival = %flight.arrival_time);

        if !flight.has_valid_interval() {
            return Err(Rejection::InvalidSchedule {
                flight_number: flight.flight_number.clone(),
                departure: flight.departure_time,
                arrival: flight.arrival_time,
            });
        }

        if source.active_assignment(crew_id, &flight.id).is_some() {
            return Err(Rejection::DuplicateAssignment {
                flight_number: flight.flight_number.clone(),
            });
        }

        let date = flight.date();
        let from = date.checked_sub_days(Days::new(1)).unwrap_or(date);
        let to = date.checked_add_days(Days::new(1)).unwrap_or(date);
        let window = source.crew_legs(crew_id, from, to);
        let same_day = window
            .iter()
            .filter(|leg| leg.flight.date() == date)
            .copied()
            .collect::<Vec<Leg>>();

        check_sequence(&self.rules.hub_airport, flight, &same_day)?;

        debug!(count = same_day.len(), %date, "flights on target date");
        if same_day.len() >= self.rules.max_flights_per_day {
            return Err(Rejection::DailyQuotaExceeded {
                date,
                max: self.rules.max_flights_per_day,
            });
        }

        let conflicts = self.find_conflicts(&window, flight);
        if !conflicts.is_empty() {
            return Err(Rejection::TimeConflict { conflicts });
        }

        let crew = source
            .crew_member(crew_id)
            .ok_or_else(|| Rejection::CrewNotFound(crew_id.clone()))?;
        if crew.on_leave {
            return Err(Rejection::CrewOnLeave {
                name: crew.name.clone(),
            });
        }

        check_roster_limit(&self.rules, flight, &source.flight_roles(&flight.id), &crew.role)?;

        if self.rules.enforce_duty_limit {
            self.check_duty_limit(flight, &same_day)?;
        }

        Ok(())
    }

    fn find_conflicts(&self, window: &[Leg<'_>], flight: &Flight) -> Vec<Conflict> {
        let proposed = flight.interval();
        window
            .iter()
            .filter(|leg| {
                let valid = leg.flight.has_valid_interval();
                if !valid {
                    warn!(flight = %leg.flight.flight_number, assignment = leg.assignment.id, "skipping existing flight with arrival not after departure");
                }
                valid
            })
            .filter_map(|leg| detect_conflict(leg, &proposed, self.rules.buffer()))
            .inspect(|conflict| warn!(%conflict, "time conflict detected"))
            .collect()
    }

    fn check_duty_limit(&self, flight: &Flight, same_day: &[Leg<'_>]) -> Verdict {
        let mut day = same_day.iter().map(|leg| leg.flight).collect::<Vec<&Flight>>();
        day.push(flight);
        day.sort_by_key(|f| f.departure_time);

        match duty_window(&self.rules, &day) {
            Some(window) if window.exceeds(&self.rules) => Err(Rejection::DutyLimitExceeded {
                date: flight.date(),
                total: format_duration(window.total()),
                limit_hours: self.rules.duty_time_limit_hours,
            }),
            _ => Ok(()),
        }
    }
}
