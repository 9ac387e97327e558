//! Comptes reporters : annuaire, hash bcrypt, connexion et mots de passe.

use crate::model::{Caller, Reporter, ReporterId};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Compte jamais touché par la synchronisation.
pub const ADMIN_USERNAME: &str = "admin";

/// Longueur des mots de passe générés à la réinitialisation.
pub const GENERATED_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unknown reporter: {0}")]
    UnknownReporter(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Annuaire `reporters.json` : nom d'utilisateur → compte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
    accounts: BTreeMap<ReporterId, Reporter>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Annuaire initial contenant uniquement un compte manager.
    pub fn with_manager(username: &str, password: &str) -> Result<Self, AuthError> {
        let mut dir = Self::new();
        dir.insert(
            ReporterId::new(username),
            Reporter {
                name: "Admin".to_string(),
                is_manager: true,
                password: hash_password(password)?,
                email: String::new(),
            },
        );
        Ok(dir)
    }

    pub fn insert(&mut self, id: ReporterId, reporter: Reporter) -> Option<Reporter> {
        self.accounts.insert(id, reporter)
    }

    pub fn get(&self, id: &ReporterId) -> Option<&Reporter> {
        self.accounts.get(id)
    }

    pub fn get_mut(&mut self, id: &ReporterId) -> Option<&mut Reporter> {
        self.accounts.get_mut(id)
    }

    pub fn contains(&self, id: &ReporterId) -> bool {
        self.accounts.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ReporterId, &Reporter)> {
        self.accounts.iter()
    }

    /// Comptes non-managers, par ordre d'identifiant.
    pub fn reporters(&self) -> impl Iterator<Item = (&ReporterId, &Reporter)> {
        self.accounts.iter().filter(|(_, r)| !r.is_manager)
    }

    /// Nom affiché, ou l'identifiant si le compte est inconnu.
    pub fn display_name(&self, id: &ReporterId) -> String {
        self.get(id)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| id.as_str().to_string())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Fusionne des comptes importés ; un compte existant est conservé.
    pub fn merge_new(&mut self, incoming: Vec<(ReporterId, Reporter)>) -> usize {
        let mut added = 0;
        for (id, reporter) in incoming {
            if !self.accounts.contains_key(&id) {
                self.accounts.insert(id, reporter);
                added += 1;
            }
        }
        added
    }
}

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(plain, hash)?)
}

/// Connexion : utilisateur inconnu et mauvais mot de passe sont indiscernables.
pub fn authenticate(dir: &Directory, username: &str, password: &str) -> Result<Caller, AuthError> {
    let id = ReporterId::new(username);
    let reporter = dir.get(&id).ok_or(AuthError::InvalidCredentials)?;
    // un hash illisible vaut un mauvais mot de passe
    if !verify_password(password, &reporter.password).unwrap_or(false) {
        tracing::warn!(reporter = %id, "failed login");
        return Err(AuthError::InvalidCredentials);
    }
    Ok(Caller {
        id,
        role: reporter.role(),
    })
}

pub fn change_password(
    dir: &mut Directory,
    username: &ReporterId,
    current: &str,
    new: &str,
) -> Result<(), AuthError> {
    if current.is_empty() {
        return Err(AuthError::MissingField("current_password"));
    }
    if new.is_empty() {
        return Err(AuthError::MissingField("new_password"));
    }
    let reporter = dir
        .get_mut(username)
        .ok_or_else(|| AuthError::UnknownReporter(username.to_string()))?;
    if !verify_password(current, &reporter.password)? {
        return Err(AuthError::InvalidCredentials);
    }
    reporter.password = hash_password(new)?;
    tracing::info!(reporter = %username, "password changed");
    Ok(())
}

pub fn generate_password<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// Remplace le mot de passe par un mot de passe aléatoire, renvoyé en clair.
pub fn reset_password<R: Rng>(
    dir: &mut Directory,
    username: &ReporterId,
    rng: &mut R,
) -> Result<String, AuthError> {
    let reporter = dir
        .get_mut(username)
        .ok_or_else(|| AuthError::UnknownReporter(username.to_string()))?;
    let plain = generate_password(rng, GENERATED_PASSWORD_LEN);
    reporter.password = hash_password(&plain)?;
    tracing::info!(reporter = %username, "password reset");
    Ok(plain)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    pub added: usize,
}

/// Recopie les hash de `source` dans `target` et ajoute les reporters absents.
pub fn sync_directory(target: &mut Directory, source: &Directory) -> SyncReport {
    let mut report = SyncReport::default();
    for (id, incoming) in source.iter() {
        if id.as_str() == ADMIN_USERNAME {
            continue;
        }
        match target.get_mut(id) {
            Some(existing) => {
                existing.password = incoming.password.clone();
                report.synced += 1;
            }
            None => {
                target.insert(
                    id.clone(),
                    Reporter {
                        name: incoming.name.clone(),
                        is_manager: false,
                        password: incoming.password.clone(),
                        email: incoming.email.clone(),
                    },
                );
                report.added += 1;
            }
        }
    }
    report
}
