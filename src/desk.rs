//! Guichet des permanences : cycle OUVERT → (répartition) → VERROUILLÉ → (reset) → OUVERT.
//!
//! Chaque opération relit l'état, calcule, puis l'écrit en une seule sauvegarde
//! atomique. Une lecture qui échoue interrompt l'opération avant toute écriture.

use crate::allocator::{AllocError, Allocation, Allocator};
use crate::model::{Board, Caller, ReporterId, Shift, ShiftId, Signups};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Jeton exigé pour réinitialiser la campagne.
pub const RESET_CONFIRMATION: &str = "RESET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    Allocated,
    DeadlinePassed,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockReason::Allocated => f.write_str("shifts allocated"),
            LockReason::DeadlinePassed => f.write_str("deadline passed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Locked(LockReason),
}

impl Phase {
    pub fn of(board: &Board, now: DateTime<Utc>) -> Self {
        if board.settings.is_locked {
            Phase::Locked(LockReason::Allocated)
        } else if now > board.settings.deadline {
            Phase::Locked(LockReason::DeadlinePassed)
        } else {
            Phase::Open
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Phase::Locked(_))
    }
}

/// Que faire si une répartition existe déjà.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocateMode {
    /// Refuse d'écraser une répartition existante.
    #[default]
    Fresh,
    /// Retire au sort à partir des mêmes intérêts, l'ancienne répartition est perdue.
    Reroll,
}

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("unauthorized: manager role required")]
    Unauthorized,
    #[error("signups are locked: {0}")]
    Locked(LockReason),
    #[error("invalid confirmation")]
    InvalidConfirmation,
    #[error("shifts already allocated: reset first or re-roll explicitly")]
    AlreadyAllocated,
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Ce qu'un reporter voit de la campagne.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterView {
    pub reporter: ReporterId,
    pub interests: Vec<ShiftId>,
    pub assignment: Option<Shift>,
    pub deadline: DateTime<Utc>,
    pub is_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftStatus {
    pub shift: Shift,
    pub interested: usize,
    pub filled: usize,
}

impl ShiftStatus {
    pub fn vacancies(&self) -> usize {
        (self.shift.slots as usize).saturating_sub(self.filled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSummary {
    pub phase: Phase,
    pub deadline: DateTime<Utc>,
    pub submitted_count: usize,
    pub total_reporters: usize,
    pub shifts: Vec<ShiftStatus>,
}

pub struct Desk<S: Storage> {
    storage: S,
}

impl<S: Storage> Desk<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn phase(&self, now: DateTime<Utc>) -> Result<Phase, DeskError> {
        let board = self.storage.load_board()?;
        Ok(Phase::of(&board, now))
    }

    /// Enregistre (ou remplace) les intérêts de l'appelant. Liste vide = retrait.
    pub fn submit_interest(
        &self,
        caller: &Caller,
        shifts: Vec<ShiftId>,
        now: DateTime<Utc>,
    ) -> Result<(), DeskError> {
        let catalog = self.storage.load_catalog()?;
        let mut board = self.storage.load_board()?;

        if let Phase::Locked(reason) = Phase::of(&board, now) {
            if !caller.is_manager() {
                tracing::warn!(reporter = %caller.id, %reason, "submission rejected");
                return Err(DeskError::Locked(reason));
            }
        }
        if let Some(unknown) = shifts.iter().find(|s| !catalog.contains(s)) {
            return Err(DeskError::UnknownShift(unknown.to_string()));
        }

        tracing::info!(reporter = %caller.id, count = shifts.len(), "interests submitted");
        board.signups.insert(caller.id.clone(), shifts);
        self.storage.save_board(&board)?;
        Ok(())
    }

    /// Tous les intérêts pour le manager, les siens pour un reporter.
    pub fn signups(&self, caller: &Caller) -> Result<Signups, DeskError> {
        let board = self.storage.load_board()?;
        if caller.is_manager() {
            return Ok(board.signups);
        }
        let own = board.signups.get(&caller.id).cloned().unwrap_or_default();
        Ok(Signups::from([(caller.id.clone(), own)]))
    }

    /// Répartit les permanences et verrouille les inscriptions.
    pub fn allocate(
        &self,
        caller: &Caller,
        mode: AllocateMode,
        allocator: &mut Allocator,
    ) -> Result<Allocation, DeskError> {
        require_manager(caller)?;
        let catalog = self.storage.load_catalog()?;
        let mut board = self.storage.load_board()?;

        if board.settings.is_locked && mode == AllocateMode::Fresh {
            return Err(DeskError::AlreadyAllocated);
        }
        if board.settings.is_locked {
            tracing::warn!(
                previous = board.assignments.len(),
                "re-rolling, previous allocation discarded"
            );
        }

        let allocation = allocator.allocate(&catalog, &board.signups)?;
        board.assignments = allocation.assignments.clone();
        board.settings.is_locked = true;
        self.storage.save_board(&board)?;
        Ok(allocation)
    }

    /// Vide intérêts et répartition, puis rouvre les inscriptions.
    pub fn reset(&self, caller: &Caller, confirmation: &str) -> Result<(), DeskError> {
        require_manager(caller)?;
        if confirmation != RESET_CONFIRMATION {
            return Err(DeskError::InvalidConfirmation);
        }
        let mut board = self.storage.load_board()?;
        board.signups.clear();
        board.assignments.clear();
        board.settings.is_locked = false;
        self.storage.save_board(&board)?;
        tracing::info!(manager = %caller.id, "campaign reset");
        Ok(())
    }

    pub fn set_deadline(&self, caller: &Caller, deadline: DateTime<Utc>) -> Result<(), DeskError> {
        require_manager(caller)?;
        let mut board = self.storage.load_board()?;
        board.settings.deadline = deadline;
        self.storage.save_board(&board)?;
        tracing::info!(%deadline, "deadline updated");
        Ok(())
    }

    pub fn reporter_view(&self, caller: &Caller, now: DateTime<Utc>) -> Result<ReporterView, DeskError> {
        let catalog = self.storage.load_catalog()?;
        let board = self.storage.load_board()?;
        let assignment = board
            .assignments
            .get(&caller.id)
            .and_then(|id| catalog.find(id))
            .cloned();
        Ok(ReporterView {
            reporter: caller.id.clone(),
            interests: board.signups.get(&caller.id).cloned().unwrap_or_default(),
            assignment,
            deadline: board.settings.deadline,
            is_locked: board.is_locked_at(now),
        })
    }

    pub fn manager_summary(&self, caller: &Caller, now: DateTime<Utc>) -> Result<ManagerSummary, DeskError> {
        require_manager(caller)?;
        let catalog = self.storage.load_catalog()?;
        let board = self.storage.load_board()?;
        let directory = self.storage.load_directory()?;

        let shifts = catalog
            .shifts
            .iter()
            .map(|shift| ShiftStatus {
                shift: shift.clone(),
                interested: board.interest_count(&shift.id),
                filled: board.assigned_to(&shift.id).count(),
            })
            .collect();

        Ok(ManagerSummary {
            phase: Phase::of(&board, now),
            deadline: board.settings.deadline,
            submitted_count: board.submitted_count(),
            total_reporters: directory.reporters().count(),
            shifts,
        })
    }
}

fn require_manager(caller: &Caller) -> Result<(), DeskError> {
    if caller.is_manager() {
        Ok(())
    } else {
        tracing::warn!(reporter = %caller.id, "manager-only operation rejected");
        Err(DeskError::Unauthorized)
    }
}
