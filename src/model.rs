use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour un reporter (son nom d'utilisateur).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReporterId(String);

impl ReporterId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifiant fort pour Shift
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rôle d'un appelant : seul le manager peut répartir ou réinitialiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Manager,
    Reporter,
}

/// Appelant authentifié d'une opération.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: ReporterId,
    pub role: Role,
}

impl Caller {
    pub fn manager<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: ReporterId::new(id),
            role: Role::Manager,
        }
    }
    pub fn reporter<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: ReporterId::new(id),
            role: Role::Reporter,
        }
    }
    pub fn is_manager(&self) -> bool {
        self.role == Role::Manager
    }
}

/// Compte d'un reporter (ou du manager) tel que stocké dans `reporters.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporter {
    pub name: String,
    #[serde(default)]
    pub is_manager: bool,
    /// Hash bcrypt, jamais le mot de passe en clair.
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl Reporter {
    pub fn role(&self) -> Role {
        if self.is_manager {
            Role::Manager
        } else {
            Role::Reporter
        }
    }
}

/// Permanence des fêtes, avec sa capacité en reporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub holiday: String,
    pub date: NaiveDate,
    pub time: String,
    pub slots: u32,
}

impl Shift {
    /// Crée une permanence en validant que `slots > 0`.
    pub fn new<H: Into<String>, T: Into<String>>(
        holiday: H,
        date: NaiveDate,
        time: T,
        slots: u32,
    ) -> Result<Self, String> {
        if slots == 0 {
            return Err("slots must be a positive number".to_string());
        }
        Ok(Self {
            id: ShiftId::random(),
            holiday: holiday.into(),
            date,
            time: time.into(),
            slots,
        })
    }

    pub fn with_id(mut self, id: ShiftId) -> Self {
        self.id = id;
        self
    }

    /// Libellé court, ex. `Christmas - 7am-3pm`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.holiday, self.time)
    }
}

/// Intérêts exprimés : reporter → permanences souhaitées, dans l'ordre saisi.
pub type Signups = BTreeMap<ReporterId, Vec<ShiftId>>;

/// Résultat persisté de la répartition : au plus une permanence par reporter.
pub type Assignments = BTreeMap<ReporterId, ShiftId>;

pub fn default_deadline() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 8, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub is_locked: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deadline: default_deadline(),
            is_locked: false,
        }
    }
}

/// État complet de la campagne, écrit d'un seul bloc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub signups: Signups,
    #[serde(default)]
    pub assignments: Assignments,
}

impl Board {
    /// Verrouillé explicitement, ou échéance dépassée.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.settings.is_locked || now > self.settings.deadline
    }

    /// Reporters ayant au moins un intérêt.
    pub fn submitted_count(&self) -> usize {
        self.signups.values().filter(|s| !s.is_empty()).count()
    }

    /// Nombre de reporters intéressés par `shift`.
    pub fn interest_count(&self, shift: &ShiftId) -> usize {
        self.signups
            .values()
            .filter(|wanted| wanted.contains(shift))
            .count()
    }

    /// Reporters assignés à `shift`, par ordre d'identifiant.
    pub fn assigned_to<'a>(&'a self, shift: &'a ShiftId) -> impl Iterator<Item = &'a ReporterId> {
        self.assignments
            .iter()
            .filter(move |(_, s)| *s == shift)
            .map(|(r, _)| r)
    }
}
