//! INI file snapshot of engine configuration and progress.
//!
//! The file holds the same sections as the engine configuration file, plus
//! `[last_evaluated]` mapping each symbol to its newest evaluated candle.

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::build_engine_config;
use crate::domain::error::ConfluenceError;
use crate::domain::snapshot::EngineSnapshot;
use crate::ports::snapshot_port::SnapshotPort;
use chrono::NaiveDateTime;
use configparser::ini::Ini;
use std::collections::BTreeMap;
use std::path::PathBuf;

const PROGRESS_SECTION: &str = "last_evaluated";
// `%.f` writes nothing for whole seconds and is optional when parsing.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub struct IniSnapshotAdapter {
    path: PathBuf,
}

impl IniSnapshotAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn corrupt(&self, reason: impl std::fmt::Display) -> ConfluenceError {
        ConfluenceError::Snapshot {
            reason: format!("{}: {}", self.path.display(), reason),
        }
    }
}

impl SnapshotPort for IniSnapshotAdapter {
    fn save(&self, snapshot: &EngineSnapshot) -> Result<(), ConfluenceError> {
        let mut ini = Ini::new_cs();
        for (section, key, value) in snapshot.config.to_entries() {
            ini.set(section, key, Some(value));
        }
        for (symbol, timestamp) in &snapshot.last_evaluated {
            ini.set(
                PROGRESS_SECTION,
                symbol,
                Some(timestamp.format(TIMESTAMP_FORMAT).to_string()),
            );
        }
        ini.write(&self.path)?;
        tracing::info!(
            path = %self.path.display(),
            symbols = snapshot.last_evaluated.len(),
            "snapshot saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<EngineSnapshot>, ConfluenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;

        let config_view = FileConfigAdapter::from_string(&content).map_err(|e| self.corrupt(e))?;
        let config = build_engine_config(&config_view).map_err(|e| self.corrupt(e))?;

        // Symbols are case-sensitive, unlike configuration keys.
        let mut progress = Ini::new_cs();
        progress.read(content).map_err(|e| self.corrupt(e))?;
        let mut last_evaluated = BTreeMap::new();
        if let Some(entries) = progress.get_map_ref().get(PROGRESS_SECTION) {
            for (symbol, value) in entries {
                let raw = value.as_deref().unwrap_or_default();
                let timestamp = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
                    .map_err(|e| self.corrupt(format!("bad timestamp for {symbol}: {e}")))?;
                last_evaluated.insert(symbol.clone(), timestamp);
            }
        }

        Ok(Some(EngineSnapshot {
            config,
            last_evaluated,
        }))
    }
}
