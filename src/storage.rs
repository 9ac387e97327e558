use crate::accounts::Directory;
use crate::catalog::ShiftCatalog;
use crate::model::Board;
use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const CATALOG_FILE: &str = "holidays.json";
pub const BOARD_FILE: &str = "board.json";
pub const DIRECTORY_FILE: &str = "reporters.json";

pub trait Storage {
    /// Charge le catalogue des permanences.
    fn load_catalog(&self) -> anyhow::Result<ShiftCatalog>;
    fn save_catalog(&self, catalog: &ShiftCatalog) -> anyhow::Result<()>;
    /// Charge réglages, intérêts et répartition.
    fn load_board(&self) -> anyhow::Result<Board>;
    /// Sauvegarde de manière atomique.
    fn save_board(&self, board: &Board) -> anyhow::Result<()>;
    fn load_directory(&self) -> anyhow::Result<Directory>;
    fn save_directory(&self, directory: &Directory) -> anyhow::Result<()>;
}

/// Répertoire de données contenant un fichier JSON par collection.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(dir: P) -> anyhow::Result<Self> {
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Crée le répertoire et les fichiers manquants, sans écraser l'existant.
    pub fn init(&self, directory: &Directory, board: &Board) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating data directory {}", self.dir.display()))?;
        if !self.path(DIRECTORY_FILE).exists() {
            self.save_directory(directory)?;
        }
        if !self.path(BOARD_FILE).exists() {
            self.save_board(board)?;
        }
        if !self.path(CATALOG_FILE).exists() {
            self.save_catalog(&ShiftCatalog::default())?;
        }
        Ok(())
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> anyhow::Result<T> {
        let path = self.path(file);
        let data = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let value = serde_json::from_slice(&data)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(value)
    }

    fn write<T: Serialize>(&self, file: &str, value: &T) -> anyhow::Result<()> {
        let path = self.path(file);
        let json = serde_json::to_vec_pretty(value)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .with_context(|| format!("atomic rename to {}", path.display()))?;
        Ok(())
    }
}

impl Storage for JsonStorage {
    fn load_catalog(&self) -> anyhow::Result<ShiftCatalog> {
        let catalog: ShiftCatalog = self.read(CATALOG_FILE)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn save_catalog(&self, catalog: &ShiftCatalog) -> anyhow::Result<()> {
        catalog.validate()?;
        self.write(CATALOG_FILE, catalog)
    }

    fn load_board(&self) -> anyhow::Result<Board> {
        self.read(BOARD_FILE)
    }

    fn save_board(&self, board: &Board) -> anyhow::Result<()> {
        self.write(BOARD_FILE, board)
    }

    fn load_directory(&self) -> anyhow::Result<Directory> {
        self.read(DIRECTORY_FILE)
    }

    fn save_directory(&self, directory: &Directory) -> anyhow::Result<()> {
        self.write(DIRECTORY_FILE, directory)
    }
}
