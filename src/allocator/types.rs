use crate::model::{Assignments, ReporterId, ShiftId};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Résultat d'un tirage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub assignments: Assignments,
    /// Toutes les permanences du catalogue, même vides.
    pub rosters: BTreeMap<ShiftId, Vec<ReporterId>>,
    /// Reporters dont toutes les permanences connues étaient pleines.
    pub unassigned: Vec<ReporterId>,
    /// Ordre de passage tiré au sort (reporters ayant au moins une permanence connue).
    pub order: Vec<ReporterId>,
}

impl Allocation {
    pub fn filled(&self, shift: &ShiftId) -> usize {
        self.rosters.get(shift).map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    OverCapacity,
    NotInterested,
    UnknownShift,
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub reporter: Option<ReporterId>,
    pub shift: ShiftId,
    pub kind: ViolationKind,
}

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("invalid shift catalog: {0}")]
    InvalidCatalog(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
