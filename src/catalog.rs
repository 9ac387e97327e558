use crate::model::{Shift, ShiftId};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Catalogue des permanences des fêtes (`holidays.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCatalog {
    #[serde(default)]
    pub shifts: Vec<Shift>,
}

impl ShiftCatalog {
    pub fn new(shifts: Vec<Shift>) -> Self {
        Self { shifts }
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for shift in &self.shifts {
            if shift.id.as_str().trim().is_empty() {
                bail!("shift id cannot be empty");
            }
            if shift.holiday.trim().is_empty() {
                bail!("shift {} has an empty holiday name", shift.id);
            }
            if shift.slots == 0 {
                bail!("shift {} must have at least one slot", shift.id);
            }
            if !seen.insert(&shift.id) {
                bail!("duplicate shift id: {}", shift.id);
            }
        }
        Ok(())
    }

    pub fn find(&self, id: &ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &ShiftId) -> bool {
        self.find(id).is_some()
    }

    /// Capacité totale, toutes permanences confondues.
    pub fn total_slots(&self) -> u64 {
        self.shifts.iter().map(|s| u64::from(s.slots)).sum()
    }

    /// Ajoute une permanence ; refuse un id déjà présent.
    pub fn add(&mut self, shift: Shift) -> Result<()> {
        if self.contains(&shift.id) {
            bail!("duplicate shift id: {}", shift.id);
        }
        self.shifts.push(shift);
        self.shifts.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(())
    }
}

pub fn load_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<ShiftCatalog> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog: ShiftCatalog = serde_json::from_slice(&data)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    catalog.validate()?;
    Ok(catalog)
}

pub fn export_catalog_json<P: AsRef<Path>>(path: P, catalog: &ShiftCatalog) -> Result<()> {
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json)?;
    Ok(())
}
