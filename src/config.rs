use crate::error::{PuantajError, Result};
use puantaj_common::{DetectionOptions, TemplateCatalog, TierLabels};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_RULES_FILE: &str = "shift_rules.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// テンプレートカタログJSON（未設定なら組み込みカタログ）
    pub catalog_path: Option<PathBuf>,
    /// シフトグループのルールブックJSON
    pub rules_path: Option<PathBuf>,
    pub detection: DetectionOptions,
    pub tier_labels: TierLabels,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.detection.validate()?;
            tracing::debug!(path = %config_path.display(), "config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PuantajError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("puantaj").join("config.json"))
    }

    /// 引数指定 → 設定ファイル → 組み込みの順でカタログを決める
    pub fn resolve_catalog(&self, explicit: Option<&Path>) -> Result<TemplateCatalog> {
        match explicit.or(self.catalog_path.as_deref()) {
            Some(path) => load_catalog(path),
            None => Ok(TemplateCatalog::builtin()),
        }
    }

    /// 引数指定 → 設定ファイル → カレントの `shift_rules.json`
    pub fn resolve_rules_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .or(self.rules_path.as_deref())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_FILE))
    }
}

/// テンプレートカタログJSONを読み込み
pub fn load_catalog(path: &Path) -> Result<TemplateCatalog> {
    if !path.exists() {
        return Err(PuantajError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let catalog = TemplateCatalog::from_json(&content)?;
    tracing::debug!(path = %path.display(), templates = catalog.len(), "catalog loaded");
    Ok(catalog)
}
