use crate::accounts::{hash_password, Directory};
use crate::catalog::ShiftCatalog;
use crate::model::{Board, Reporter, ReporterId};
use anyhow::{bail, Context};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Import des comptes depuis CSV: header `Username,Name,Password,Email`
/// (mots de passe en clair, hashés à l'import). Les fichiers non UTF-8 sont
/// lus en Latin-1.
pub fn import_reporters_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<(ReporterId, Reporter)>> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.byte_headers()?.clone();
    let username_col = column(&headers, "Username")?;
    let name_col = column(&headers, "Name")?;
    let password_col = column(&headers, "Password")?;
    let email_col = column(&headers, "Email").ok();

    let mut out = Vec::new();
    for rec in rdr.byte_records() {
        let rec = rec?;
        let username = field(&rec, username_col).context("missing Username")?;
        let name = field(&rec, name_col).context("missing Name")?;
        let password = field(&rec, password_col).context("missing Password")?;
        if username.is_empty() || name.is_empty() {
            bail!("invalid reporter row (empty)");
        }
        let email = email_col.and_then(|c| field(&rec, c)).unwrap_or_default();
        let reporter = Reporter {
            name,
            is_manager: false,
            password: hash_password(&password)
                .with_context(|| format!("hashing password for {username}"))?,
            email,
        };
        out.push((ReporterId::new(username), reporter));
    }
    tracing::info!(count = out.len(), path = %path.display(), "reporters imported");
    Ok(out)
}

/// Charge un `reporters.json` complet (hash déjà calculés), ex. pour remplacer
/// l'annuaire en bloc. Refuse un annuaire vide ou sans manager.
pub fn import_directory_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Directory> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let directory: Directory = serde_json::from_slice(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    if directory.is_empty() {
        bail!("no reporters data provided");
    }
    if !directory.iter().any(|(_, r)| r.is_manager) {
        bail!("directory must keep at least one manager account");
    }
    Ok(directory)
}

fn column(headers: &ByteRecord, name: &str) -> anyhow::Result<usize> {
    headers
        .iter()
        .position(|h| decode(h).trim().eq_ignore_ascii_case(name))
        .with_context(|| format!("missing column {name}"))
}

fn field(rec: &ByteRecord, idx: usize) -> Option<String> {
    rec.get(idx).map(|raw| decode(raw).trim().to_string())
}

fn decode(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
    }
}

/// Export CSV par permanence:
/// header `holiday,date,time,assigned,interest_count,status,capacity`
pub fn export_shift_report_csv<P: AsRef<Path>>(
    path: P,
    catalog: &ShiftCatalog,
    board: &Board,
    directory: &Directory,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "holiday",
        "date",
        "time",
        "assigned",
        "interest_count",
        "status",
        "capacity",
    ])?;
    for shift in &catalog.shifts {
        let names: Vec<String> = board
            .assigned_to(&shift.id)
            .map(|r| directory.display_name(r))
            .collect();
        let filled = names.len();
        let total = shift.slots as usize;
        let assigned = if names.is_empty() {
            "VACANT".to_string()
        } else {
            names.join(", ")
        };
        let status = if filled >= total {
            "FILLED".to_string()
        } else {
            format!("VACANT ({})", total - filled)
        };
        let date = shift.date.format("%Y-%m-%d").to_string();
        let mut interest = itoa::Buffer::new();
        let mut filled_buf = itoa::Buffer::new();
        let mut total_buf = itoa::Buffer::new();
        let capacity = format!("{}/{}", filled_buf.format(filled), total_buf.format(total));
        w.write_record([
            shift.holiday.as_str(),
            date.as_str(),
            shift.time.as_str(),
            assigned.as_str(),
            interest.format(board.interest_count(&shift.id)),
            status.as_str(),
            capacity.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV par reporter (managers exclus):
/// header `reporter,expressed_interest,assigned_shift,status`
pub fn export_reporter_summary_csv<P: AsRef<Path>>(
    path: P,
    catalog: &ShiftCatalog,
    board: &Board,
    directory: &Directory,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["reporter", "expressed_interest", "assigned_shift", "status"])?;
    for (id, reporter) in directory.reporters() {
        let wanted = board.signups.get(id).map_or(0, Vec::len);
        let interest = if wanted > 0 {
            format!("Yes ({wanted} shifts)")
        } else {
            "No".to_string()
        };
        let shift = board.assignments.get(id).and_then(|s| catalog.find(s));
        let (assigned, status) = match shift {
            Some(shift) => (shift.label(), "Assigned"),
            None if wanted > 0 => ("None".to_string(), "Interested but not assigned"),
            None => ("None".to_string(), "No interest"),
        };
        w.write_record([
            reporter.name.as_str(),
            interest.as_str(),
            assigned.as_str(),
            status,
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON brut (jolie mise en forme), ex. intérêts ou répartition.
pub fn export_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}
