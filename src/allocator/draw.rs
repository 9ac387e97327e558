use super::ledger::{dedup_interests, Ledger};
use super::types::{AllocError, Allocation};
use crate::catalog::ShiftCatalog;
use crate::model::{ReporterId, ShiftId, Signups};
use rand::seq::SliceRandom;
use rand::Rng;

pub(super) fn draw<R: Rng + ?Sized>(
    catalog: &ShiftCatalog,
    signups: &Signups,
    rng: &mut R,
) -> Result<Allocation, AllocError> {
    catalog
        .validate()
        .map_err(|e| AllocError::InvalidCatalog(e.to_string()))?;

    // sans aucune permanence connue, le reporter ne participe pas au tirage
    let mut candidates: Vec<(&ReporterId, &Vec<ShiftId>)> = signups
        .iter()
        .filter(|(reporter, wanted)| {
            let known = wanted.iter().any(|s| catalog.contains(s));
            if !known && !wanted.is_empty() {
                tracing::debug!(reporter = %reporter, "no known shift in interests, skipped");
            }
            known
        })
        .collect();
    candidates.shuffle(rng);

    let mut ledger = Ledger::from_catalog(catalog);
    let mut allocation = Allocation {
        rosters: catalog
            .shifts
            .iter()
            .map(|s| (s.id.clone(), Vec::new()))
            .collect(),
        ..Allocation::default()
    };

    for (reporter, wanted) in candidates {
        let wanted = dedup_interests(wanted);
        for unknown in wanted.iter().filter(|s| !ledger.is_known(s)) {
            tracing::debug!(reporter = %reporter, shift = %unknown, "ignoring unknown shift in interests");
        }

        match place(&mut ledger, &wanted, rng) {
            Some(shift) => {
                tracing::debug!(reporter = %reporter, shift = %shift, "assigned");
                if let Some(roster) = allocation.rosters.get_mut(&shift) {
                    roster.push(reporter.clone());
                }
                allocation.assignments.insert(reporter.clone(), shift);
            }
            None => {
                tracing::debug!(reporter = %reporter, "every wanted shift is full");
                allocation.unassigned.push(reporter.clone());
            }
        }
        allocation.order.push(reporter.clone());
    }

    Ok(allocation)
}

/// Choisit uniformément une permanence encore ouverte parmi `wanted`.
pub(super) fn place<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    wanted: &[ShiftId],
    rng: &mut R,
) -> Option<ShiftId> {
    let open = ledger.open_among(wanted);
    let chosen = (*open.choose(rng)?).clone();
    ledger.take(&chosen).then_some(chosen)
}
