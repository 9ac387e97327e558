use super::{Violation, ViolationKind};
use crate::catalog::ShiftCatalog;
use crate::model::{Assignments, Signups};
use std::collections::BTreeMap;

pub(super) fn check_allocation(
    catalog: &ShiftCatalog,
    signups: &Signups,
    assignments: &Assignments,
) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut filled = BTreeMap::new();

    for (reporter, shift) in assignments {
        if !catalog.contains(shift) {
            out.push(Violation {
                reporter: Some(reporter.clone()),
                shift: shift.clone(),
                kind: ViolationKind::UnknownShift,
            });
            continue;
        }

        let wanted = signups
            .get(reporter)
            .is_some_and(|wanted| wanted.contains(shift));
        if !wanted {
            out.push(Violation {
                reporter: Some(reporter.clone()),
                shift: shift.clone(),
                kind: ViolationKind::NotInterested,
            });
        }

        *filled.entry(shift).or_insert(0u32) += 1;
    }

    for shift in &catalog.shifts {
        let count = filled.get(&shift.id).copied().unwrap_or(0);
        if count > shift.slots {
            out.push(Violation {
                reporter: None,
                shift: shift.id.clone(),
                kind: ViolationKind::OverCapacity,
            });
        }
    }

    out
}
