// src/store/persist.rs

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    common::error::AppError,
    models::{
        client::Client,
        finance::{Commission, RecurringService, Transaction},
        marketing::{Campaign, Content, Lead, Package},
        project::Project,
        prospect::Prospect,
        quote::Quote,
        support::Ticket,
    },
};

/// Versão do formato do snapshot.
pub const SNAPSHOT_VERSION: u32 = 0;

/// Tudo o que sobrevive entre sessões. Usuários ficam de fora (vêm do seed).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub clients: Vec<Client>,
    pub prospects: Vec<Prospect>,
    pub projects: Vec<Project>,
    pub tickets: Vec<Ticket>,
    pub campaigns: Vec<Campaign>,
    pub transactions: Vec<Transaction>,
    pub packages: Vec<Package>,
    pub recurring_services: Vec<RecurringService>,
    pub contents: Vec<Content>,
    pub quotes: Vec<Quote>,
    pub leads: Vec<Lead>,
    pub commissions: Vec<Commission>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedState,
    version: u32,
}

/// Snapshot local em `<dir>/<namespace>.json`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{namespace}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` quando ainda não existe snapshot.
    pub fn load(&self) -> Result<Option<PersistedState>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        let envelope: Envelope = serde_json::from_str(&raw)?;
        if envelope.version != SNAPSHOT_VERSION {
            tracing::warn!(
                "Snapshot {} com versão {} (esperada {}), carregando mesmo assim",
                self.path.display(),
                envelope.version,
                SNAPSHOT_VERSION
            );
        }
        Ok(Some(envelope.state))
    }

    /// Escreve num arquivo temporário ao lado e renomeia: nunca deixa JSON pela metade.
    pub fn save(&self, state: &PersistedState) -> Result<(), AppError> {
        let envelope = Envelope {
            state: state.clone(),
            version: SNAPSHOT_VERSION,
        };
        let data = serde_json::to_vec_pretty(&envelope)?;

        let dir = self.path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&data)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::marketing::{ContentState, Platform};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn missing_snapshot_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "console");
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("nested"), "console");

        let mut state = PersistedState::default();
        state.contents.push(Content {
            id: Uuid::new_v4(),
            title: "Post de lanzamiento".into(),
            platform: Platform::Instagram,
            client_id: None,
            state: ContentState::Programado,
            scheduled_for: Utc.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap(),
        });
        storage.save(&state).unwrap();

        assert_eq!(storage.load().unwrap(), Some(state));
        assert!(storage.path().ends_with("nested/console.json"));
    }

    #[test]
    fn older_snapshots_without_commissions_still_load() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "console");
        std::fs::write(
            storage.path(),
            r#"{"state":{"clients":[],"prospects":[],"leads":[]},"version":0}"#,
        )
        .unwrap();

        let state = storage.load().unwrap().unwrap();
        assert!(state.commissions.is_empty());
        assert!(state.quotes.is_empty());
    }

    #[test]
    fn envelope_shape_on_disk() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "console");
        storage.save(&PersistedState::default()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], 0);
        assert!(raw["state"]["recurringServices"].is_array());
        assert!(raw["state"].get("users").is_none());
    }
}
