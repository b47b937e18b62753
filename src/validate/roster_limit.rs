use crate::crew::Role;
use crate::flight::Flight;
use crate::rules::Rules;
use crate::validate::rejection::Rejection;
use tracing::debug;

/// Rejects `role` joining `flight` when the crew already on it (`assigned`)
/// fills that role's quota. Roles without a quota always pass.
pub fn check_roster_limit(rules: &Rules, flight: &Flight, assigned: &[Role], role: &Role) -> Result<(), Rejection> {
    let Some(max) = rules.roster_cap(role) else {
        debug!(%role, "no roster quota for role");
        return Ok(());
    };

    let current = assigned.iter().filter(|r| *r == role).count();
    debug!(flight = %flight.flight_number, %role, current, max, "roster count");

    if current >= max {
        return Err(Rejection::RosterFull {
            flight_number: flight.flight_number.clone(),
            role: role.clone(),
            max,
        });
    }
    Ok(())
}
