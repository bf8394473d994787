//! # CSV Connection
//!
//! Shared handle on the data directory used by the CSV repositories.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── accounts.csv
//! └── {account_id}/
//!     ├── config.yaml
//!     ├── quotes.csv
//!     ├── jobs.csv
//!     ├── invoices.csv
//!     ├── clients.csv
//!     └── inventory.csv
//! ```

use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

/// Cheap-to-clone handle shared by all repositories.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Open (creating if needed) the base data directory.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        if !base_directory.exists() {
            std::fs::create_dir_all(&base_directory)?;
            debug!("Created data directory: {:?}", base_directory);
        }
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of an account's data directory. Not created here.
    pub fn account_directory(&self, account_id: &str) -> PathBuf {
        self.base_directory.join(account_id)
    }

    /// Ensure an account's data directory exists and return its path.
    pub fn ensure_account_directory(&self, account_id: &str) -> Result<PathBuf> {
        let dir = self.account_directory(account_id);
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            debug!("Created account directory: {:?}", dir);
        }
        Ok(dir)
    }
}
