//! Selection filter: which catalog entries a session may draw from.

use crate::catalog::Catalog;
use crate::error::{EmptyPoolCause, Error, Result};
use crate::models::{CertLevel, Maneuver, ManeuverId};

/// Whether `maneuver` belongs in a session for `level`.
///
/// `include_emergencies` is never consulted for [`CertLevel::EmergenciesOnly`].
pub fn is_eligible(maneuver: &Maneuver, level: CertLevel, include_emergencies: bool) -> bool {
    let emergency = maneuver.is_emergency();
    match level {
        CertLevel::EmergenciesOnly => emergency,
        CertLevel::Private => maneuver.has_kind("private") || (emergency && include_emergencies),
        CertLevel::Commercial => {
            maneuver.has_kind("commercial") || (emergency && include_emergencies)
        }
        CertLevel::All => !emergency || include_emergencies,
    }
}

/// Identifiers of every eligible maneuver, in catalog order.
///
/// Fails with [`Error::EmptyPool`] when nothing matches, so an impossible
/// session is rejected before the first turn.
pub fn filter(
    catalog: &Catalog,
    level: CertLevel,
    include_emergencies: bool,
) -> Result<Vec<ManeuverId>> {
    let pool: Vec<ManeuverId> = catalog
        .iter()
        .filter(|(_, maneuver)| is_eligible(maneuver, level, include_emergencies))
        .map(|(id, _)| id)
        .collect();

    if pool.is_empty() {
        return Err(Error::EmptyPool(EmptyPoolCause::InitialFilter));
    }

    tracing::debug!(
        "Filter {} (emergencies: {}) selected {} of {} maneuvers",
        level.as_str(),
        include_emergencies,
        pool.len(),
        catalog.len()
    );
    Ok(pool)
}
