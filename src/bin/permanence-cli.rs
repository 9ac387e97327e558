#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use permanence::{
    accounts::{self, Directory},
    catalog::load_catalog_from_file,
    desk::{AllocateMode, Desk, Phase},
    io,
    model::{Board, Caller, ReporterId, Settings, Shift, ShiftId},
    notification::{prepare_notice, TextNotice},
    storage::{JsonStorage, Storage},
    Allocator,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI des permanences des fêtes (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Répertoire des fichiers JSON
    #[arg(long, global = true, default_value = "data")]
    data_dir: String,

    /// Nom d'utilisateur
    #[arg(long, global = true)]
    user: Option<String>,

    /// Mot de passe
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialiser le répertoire de données avec un compte manager
    Init {
        #[arg(long, default_value = "admin")]
        admin_user: String,
        #[arg(long)]
        admin_password: String,
        /// RFC3339 UTC
        #[arg(long)]
        deadline: Option<String>,
    },

    /// Importer des reporters depuis un CSV
    ImportReporters {
        #[arg(long)]
        csv: String,
    },

    /// Importer un reporters.json complet (fusion, ou remplacement avec --replace)
    ImportDirectory {
        #[arg(long)]
        json: String,
        #[arg(long)]
        replace: bool,
    },

    /// Remplacer le catalogue par un fichier `holidays.json`
    ImportCatalog {
        #[arg(long)]
        json: String,
    },

    /// Ajouter une permanence au catalogue
    AddShift {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        holiday: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        time: String,
        #[arg(long, default_value_t = 1)]
        slots: u32,
    },

    /// Exprimer ses intérêts, liste "id1,id2,..." (vide = retrait)
    Submit {
        #[arg(long, default_value = "")]
        shifts: String,
    },

    /// Lister les intérêts
    Signups,

    /// Répartir les permanences et verrouiller
    Allocate {
        /// Graine fixe (tirage reproductible)
        #[arg(long)]
        seed: Option<u64>,
        /// Retirer au sort par-dessus une répartition existante
        #[arg(long)]
        reroll: bool,
    },

    /// Vider intérêts et répartition, rouvrir les inscriptions
    Reset {
        /// Doit valoir RESET
        #[arg(long)]
        confirm: String,
    },

    /// Modifier l'échéance
    SetDeadline {
        /// RFC3339 UTC
        #[arg(long)]
        at: String,
    },

    /// Tableau de bord
    Status,

    /// Exports CSV / JSON
    Export {
        #[arg(long)]
        shifts_csv: Option<String>,
        #[arg(long)]
        reporters_csv: Option<String>,
        #[arg(long)]
        signups_json: Option<String>,
        #[arg(long)]
        assignments_json: Option<String>,
    },

    /// Changer son mot de passe
    Passwd {
        #[arg(long)]
        new: String,
    },

    /// Générer un nouveau mot de passe pour un reporter
    ResetPassword {
        #[arg(long)]
        username: String,
    },

    /// Synchroniser les mots de passe depuis un autre reporters.json
    SyncPasswords {
        #[arg(long)]
        from: String,
    },

    /// Générer l'avis d'affectation d'un reporter
    Notify {
        #[arg(long)]
        username: String,
        /// Fichier de sortie (texte brut)
        #[arg(long)]
        out: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.data_dir)?;

    if let Commands::Init {
        admin_user,
        admin_password,
        deadline,
    } = &cli.cmd
    {
        let mut settings = Settings::default();
        if let Some(raw) = deadline {
            settings.deadline = parse_instant(raw)?;
        }
        let directory = Directory::with_manager(admin_user, admin_password)?;
        let board = Board {
            settings,
            ..Board::default()
        };
        storage.init(&directory, &board)?;
        println!("Initialized {}", storage.dir().display());
        std::process::exit(0);
    }

    let caller = login(&storage, cli.user.as_deref(), cli.password.as_deref())?;
    let desk = Desk::new(storage);
    let now = Utc::now();

    let code = match cli.cmd {
        Commands::Init { .. } => 0,
        Commands::ImportReporters { csv } => {
            require_manager(&caller)?;
            let incoming = io::import_reporters_csv(csv)?;
            let mut directory = desk.storage().load_directory()?;
            let added = directory.merge_new(incoming);
            desk.storage().save_directory(&directory)?;
            println!("Added {added} reporter(s)");
            0
        }
        Commands::ImportDirectory { json, replace } => {
            require_manager(&caller)?;
            let incoming = io::import_directory_json(json)?;
            if replace {
                desk.storage().save_directory(&incoming)?;
                println!("Directory replaced with {} account(s)", incoming.len());
            } else {
                let mut directory = desk.storage().load_directory()?;
                let added = directory.merge_new(
                    incoming
                        .iter()
                        .map(|(id, r)| (id.clone(), r.clone()))
                        .collect(),
                );
                desk.storage().save_directory(&directory)?;
                println!("Added {added} reporter(s)");
            }
            0
        }
        Commands::ImportCatalog { json } => {
            require_manager(&caller)?;
            let catalog = load_catalog_from_file(json)?;
            desk.storage().save_catalog(&catalog)?;
            println!("Catalog holds {} shift(s)", catalog.shifts.len());
            0
        }
        Commands::AddShift {
            id,
            holiday,
            date,
            time,
            slots,
        } => {
            require_manager(&caller)?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                .with_context(|| format!("invalid date: {date}"))?;
            let mut shift = Shift::new(holiday, date, time, slots).map_err(anyhow::Error::msg)?;
            if let Some(id) = id {
                shift = shift.with_id(ShiftId::new(id));
            }
            let mut catalog = desk.storage().load_catalog()?;
            let id = shift.id.clone();
            catalog.add(shift)?;
            desk.storage().save_catalog(&catalog)?;
            println!("{id}");
            0
        }
        Commands::Submit { shifts } => {
            let wanted: Vec<ShiftId> = shifts
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ShiftId::new)
                .collect();
            desk.submit_interest(&caller, wanted, now)?;
            println!("OK");
            0
        }
        Commands::Signups => {
            for (reporter, wanted) in desk.signups(&caller)? {
                let ids: Vec<&str> = wanted.iter().map(ShiftId::as_str).collect();
                println!("{} | {}", reporter, ids.join(","));
            }
            0
        }
        Commands::Allocate { seed, reroll } => {
            let mut allocator = seed.map_or_else(Allocator::from_entropy, Allocator::seeded);
            let mode = if reroll {
                AllocateMode::Reroll
            } else {
                AllocateMode::Fresh
            };
            let allocation = desk.allocate(&caller, mode, &mut allocator)?;
            for (shift, roster) in &allocation.rosters {
                let names: Vec<&str> = roster.iter().map(ReporterId::as_str).collect();
                println!("{} → {}", shift, if names.is_empty() { "-".to_string() } else { names.join(", ") });
            }
            if allocation.unassigned.is_empty() {
                0
            } else {
                eprintln!("{} reporter(s) left without a shift", allocation.unassigned.len());
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Reset { confirm } => {
            desk.reset(&caller, &confirm)?;
            println!("System reset successfully");
            0
        }
        Commands::SetDeadline { at } => {
            desk.set_deadline(&caller, parse_instant(&at)?)?;
            0
        }
        Commands::Status => {
            if caller.is_manager() {
                let summary = desk.manager_summary(&caller, now)?;
                println!(
                    "{} | deadline {} | {}/{} submitted",
                    phase_label(summary.phase),
                    summary.deadline.to_rfc3339(),
                    summary.submitted_count,
                    summary.total_reporters
                );
                for s in &summary.shifts {
                    println!(
                        "{} | {} {} {} | interest {} | {}/{}",
                        s.shift.id,
                        s.shift.holiday,
                        s.shift.date,
                        s.shift.time,
                        s.interested,
                        s.filled,
                        s.shift.slots
                    );
                }
            } else {
                let view = desk.reporter_view(&caller, now)?;
                let ids: Vec<&str> = view.interests.iter().map(ShiftId::as_str).collect();
                println!(
                    "{} | {} | deadline {}",
                    view.reporter,
                    if view.is_locked { "locked" } else { "open" },
                    view.deadline.to_rfc3339()
                );
                println!("interests: {}", ids.join(","));
                match view.assignment {
                    Some(shift) => println!("assigned: {} ({})", shift.label(), shift.date),
                    None => println!("assigned: -"),
                }
            }
            0
        }
        Commands::Export {
            shifts_csv,
            reporters_csv,
            signups_json,
            assignments_json,
        } => {
            require_manager(&caller)?;
            let catalog = desk.storage().load_catalog()?;
            let board = desk.storage().load_board()?;
            let directory = desk.storage().load_directory()?;
            if let Some(path) = shifts_csv {
                io::export_shift_report_csv(path, &catalog, &board, &directory)?;
            }
            if let Some(path) = reporters_csv {
                io::export_reporter_summary_csv(path, &catalog, &board, &directory)?;
            }
            if let Some(path) = signups_json {
                io::export_json(path, &board.signups)?;
            }
            if let Some(path) = assignments_json {
                io::export_json(path, &board.assignments)?;
            }
            0
        }
        Commands::Passwd { new } => {
            let current = cli.password.unwrap_or_default();
            let mut directory = desk.storage().load_directory()?;
            accounts::change_password(&mut directory, &caller.id, &current, &new)?;
            desk.storage().save_directory(&directory)?;
            println!("Password changed successfully");
            0
        }
        Commands::ResetPassword { username } => {
            require_manager(&caller)?;
            let mut directory = desk.storage().load_directory()?;
            let id = ReporterId::new(&username);
            let plain = accounts::reset_password(&mut directory, &id, &mut rand::thread_rng())?;
            desk.storage().save_directory(&directory)?;
            println!("Username: {username}");
            println!("NEW PASSWORD: {plain}");
            0
        }
        Commands::SyncPasswords { from } => {
            require_manager(&caller)?;
            let source = JsonStorage::open(&from)?.load_directory()?;
            let mut directory = desk.storage().load_directory()?;
            let report = accounts::sync_directory(&mut directory, &source);
            desk.storage().save_directory(&directory)?;
            println!(
                "Synced {} passwords, added {} new reporters",
                report.synced, report.added
            );
            0
        }
        Commands::Notify { username, out } => {
            if !caller.is_manager() && caller.id.as_str() != username {
                bail!("unauthorized");
            }
            let notice = prepare_notice(
                &desk.storage().load_board()?,
                &desk.storage().load_catalog()?,
                &desk.storage().load_directory()?,
                &username,
                &TextNotice,
            )?;
            std::fs::write(&out, notice.content)?;
            println!("Notice generated for {} (shift {})", notice.reporter, notice.shift_id);
            0
        }
    };

    std::process::exit(code);
}

fn login(storage: &JsonStorage, user: Option<&str>, password: Option<&str>) -> Result<Caller> {
    let (Some(user), Some(password)) = (user, password) else {
        bail!("--user and --password are required");
    };
    let directory = storage.load_directory()?;
    Ok(accounts::authenticate(&directory, user, password)?)
}

fn require_manager(caller: &Caller) -> Result<()> {
    if !caller.is_manager() {
        bail!("unauthorized: manager role required");
    }
    Ok(())
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    raw.parse::<DateTime<Utc>>()
        .with_context(|| format!("invalid RFC3339 instant: {raw}"))
}

fn phase_label(phase: Phase) -> String {
    match phase {
        Phase::Open => "open".to_string(),
        Phase::Locked(reason) => format!("locked ({reason})"),
    }
}
