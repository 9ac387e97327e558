use crate::catalog::ShiftCatalog;
use crate::model::ShiftId;
use std::collections::{HashMap, HashSet};

/// Places restantes par permanence pendant un tirage.
#[derive(Debug, Clone)]
pub(super) struct Ledger {
    remaining: HashMap<ShiftId, u32>,
}

impl Ledger {
    pub(super) fn from_catalog(catalog: &ShiftCatalog) -> Self {
        Self {
            remaining: catalog
                .shifts
                .iter()
                .map(|s| (s.id.clone(), s.slots))
                .collect(),
        }
    }

    pub(super) fn has_room(&self, shift: &ShiftId) -> bool {
        self.remaining.get(shift).is_some_and(|left| *left > 0)
    }

    pub(super) fn is_known(&self, shift: &ShiftId) -> bool {
        self.remaining.contains_key(shift)
    }

    /// Consomme une place ; `false` si la permanence est pleine ou inconnue.
    pub(super) fn take(&mut self, shift: &ShiftId) -> bool {
        match self.remaining.get_mut(shift) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    pub(super) fn open_among<'a>(&self, wanted: &'a [ShiftId]) -> Vec<&'a ShiftId> {
        wanted.iter().filter(|s| self.has_room(s)).collect()
    }
}

/// Supprime les doublons en gardant la première occurrence.
pub(super) fn dedup_interests(wanted: &[ShiftId]) -> Vec<ShiftId> {
    let mut seen = HashSet::new();
    wanted
        .iter()
        .filter(|s| seen.insert(*s))
        .cloned()
        .collect()
}
