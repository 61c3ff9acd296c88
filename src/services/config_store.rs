// Configuration Storage Service
// Audit settings on disk, with timestamped backups on every overwrite

use crate::error::{AuditError, AuditResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BACKUPS_KEPT: usize = 10;
const DEFAULT_MAX_TOKENS: usize = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub version: String,
    /// Marker database JSON; the builtin lexicon is used when unset.
    #[serde(default)]
    pub lexicon_path: Option<String>,
    #[serde(default)]
    pub audit: AuditConfig,
}

/// What to do with a document longer than `max_tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OversizePolicy {
    #[default]
    Reject,
    Truncate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub case_sensitive: bool,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default)]
    pub oversize_policy: OversizePolicy,
    /// Decision bits of the banded alignment table.
    #[serde(default = "default_max_alignment_cells")]
    pub max_alignment_cells: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            max_tokens: default_max_tokens(),
            oversize_policy: OversizePolicy::Reject,
            max_alignment_cells: default_max_alignment_cells(),
        }
    }
}

fn default_true() -> bool { true }
fn default_max_tokens() -> usize { DEFAULT_MAX_TOKENS }
fn default_max_alignment_cells() -> u64 { full_band_cells(DEFAULT_MAX_TOKENS) }

/// Widest band two `tokens`-long documents can need: every unit rewritten.
pub fn full_band_cells(tokens: usize) -> u64 {
    let t = tokens as u64;
    t.saturating_mul(2 * t + 1)
}

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Store rooted at an explicit file, e.g. `--config ./audit.json`.
    pub fn from_file(config_file: PathBuf) -> Self {
        let config_dir = config_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { config_dir, config_file }
    }

    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("voiceAudit"))
    }

    pub fn ensure_dir(&self) -> AuditResult<()> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| AuditError::Config(format!("Failed to create config dir: {}", e)))
    }

    /// Missing file means defaults.
    pub fn load(&self) -> AuditResult<AppConfig> {
        if !self.config_file.exists() {
            debug!(path = %self.config_file.display(), "config.defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| AuditError::Config(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| AuditError::Config(format!("Failed to parse config: {}", e)))?;
        validate(&config.audit)?;
        Ok(config)
    }

    pub fn save(&self, config: &AppConfig) -> AuditResult<()> {
        validate(&config.audit)?;
        self.ensure_dir()?;

        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| AuditError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_file, content)
            .map_err(|e| AuditError::Config(format!("Failed to write config: {}", e)))
    }

    fn create_backup(&self) -> AuditResult<()> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| AuditError::Config(format!("Failed to create backup dir: {}", e)))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| AuditError::Config(format!("Failed to create backup: {}", e)))?;

        self.cleanup_old_backups(&backup_dir, BACKUPS_KEPT)
    }

    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> AuditResult<()> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| AuditError::Config(format!("Failed to read backup dir: {}", e)))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Names embed the timestamp, so lexical order is age order.
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!(path = %entry.path().display(), error = %e, "config.backup_cleanup_failed");
            }
        }

        Ok(())
    }
}

fn validate(audit: &AuditConfig) -> AuditResult<()> {
    if audit.max_tokens == 0 {
        return Err(AuditError::Config("audit.maxTokens must be positive".to_string()));
    }
    if audit.max_alignment_cells == 0 {
        return Err(AuditError::Config(
            "audit.maxAlignmentCells must be positive".to_string(),
        ));
    }
    if audit.max_alignment_cells < full_band_cells(audit.max_tokens) {
        warn!(
            max_tokens = audit.max_tokens,
            max_alignment_cells = audit.max_alignment_cells,
            "config.alignment_budget_below_token_cap"
        );
    }
    Ok(())
}
