#![forbid(unsafe_code)]
//! Permanence — répartition des permanences des fêtes entre reporters (sans BD).
//!
//! - Stockage fichiers (JSON/CSV), écritures atomiques.
//! - Tirage aléatoire équitable, une permanence par reporter au plus.
//! - Cycle ouvert/verrouillé piloté par le manager.

pub mod accounts;
pub mod allocator;
pub mod catalog;
pub mod desk;
pub mod io;
pub mod model;
pub mod notification;
pub mod storage;

pub use accounts::{authenticate, Directory};
pub use allocator::{check_allocation, AllocError, Allocation, Allocator, Violation, ViolationKind};
pub use catalog::{export_catalog_json, load_catalog_from_file, ShiftCatalog};
pub use desk::{AllocateMode, Desk, DeskError, LockReason, Phase, RESET_CONFIRMATION};
pub use model::{
    Assignments, Board, Caller, Reporter, ReporterId, Role, Settings, Shift, ShiftId, Signups,
};
pub use notification::{prepare_notice, Notice, NoticeRenderer, TextNotice};
pub use storage::{JsonStorage, Storage};
