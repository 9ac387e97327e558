use crate::accounts::Directory;
use crate::catalog::ShiftCatalog;
use crate::model::{Board, Reporter, ReporterId, Shift};
use anyhow::{Context, Result};

/// Avis d'affectation destiné à un reporter.
#[derive(Debug, Clone)]
pub struct Notice {
    pub reporter: ReporterId,
    pub email: String,
    pub shift_id: String,
    pub content: String,
}

/// Permet de customiser le rendu du message (texte, mail, etc.).
pub trait NoticeRenderer {
    fn render(&self, reporter: &Reporter, shift: &Shift) -> String;
}

/// Gabarit texte simple destiné à un futur mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNotice;

impl NoticeRenderer for TextNotice {
    fn render(&self, reporter: &Reporter, shift: &Shift) -> String {
        format!(
            "Hi {name},\n\nYou have been assigned the {holiday} shift on {date} ({time}).\n\nThanks for covering the holidays.\n",
            name = reporter.name,
            holiday = shift.holiday,
            date = shift.date.format("%B %d, %Y"),
            time = shift.time,
        )
    }
}

/// Prépare l'avis d'affectation d'un reporter.
pub fn prepare_notice(
    board: &Board,
    catalog: &ShiftCatalog,
    directory: &Directory,
    username: &str,
    renderer: &dyn NoticeRenderer,
) -> Result<Notice> {
    let id = ReporterId::new(username);
    let reporter = directory
        .get(&id)
        .with_context(|| format!("unknown reporter: {username}"))?;
    let shift_id = board
        .assignments
        .get(&id)
        .with_context(|| format!("no shift assigned to {username}"))?;
    let shift = catalog
        .find(shift_id)
        .with_context(|| format!("assigned shift {shift_id} missing from catalog"))?;

    Ok(Notice {
        reporter: id,
        email: reporter.email.clone(),
        shift_id: shift.id.as_str().to_string(),
        content: renderer.render(reporter, shift),
    })
}
