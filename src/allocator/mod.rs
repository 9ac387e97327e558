//! Répartition aléatoire des permanences.
//!
//! Un seul passage glouton : l'ordre des reporters est mélangé, puis chacun
//! reçoit au hasard une permanence encore ouverte parmi ses choix. Ce n'est
//! pas un couplage maximal, un reporter peut rester sans permanence alors
//! qu'un réarrangement l'aurait placé.

mod checks;
mod draw;
mod ledger;
mod types;

pub use types::{AllocError, Allocation, Violation, ViolationKind};

use crate::catalog::ShiftCatalog;
use crate::model::{Assignments, Signups};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Allocator : porte le générateur aléatoire (fixable par graine pour les tests).
#[derive(Debug, Clone)]
pub struct Allocator {
    rng: StdRng,
}

impl Allocator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Tire une répartition ; ne modifie ni le catalogue ni les intérêts.
    pub fn allocate(
        &mut self,
        catalog: &ShiftCatalog,
        signups: &Signups,
    ) -> Result<Allocation, AllocError> {
        let allocation = draw::draw(catalog, signups, &mut self.rng)?;
        tracing::info!(
            candidates = allocation.order.len(),
            assigned = allocation.assignments.len(),
            unassigned = allocation.unassigned.len(),
            "allocation drawn"
        );
        Ok(allocation)
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Vérifie capacité et validité d'une répartition existante.
pub fn check_allocation(
    catalog: &ShiftCatalog,
    signups: &Signups,
    assignments: &Assignments,
) -> Vec<Violation> {
    checks::check_allocation(catalog, signups, assignments)
}
