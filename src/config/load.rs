use crate::config::types::{Config, ConvertSettings, UserSettings};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    pub fn new() -> Result<Self> {
        let settings = Self::load_settings().unwrap_or_default();
        Ok(Self { settings })
    }

    fn load_settings() -> Result<UserSettings> {
        let path = Path::new("settings.json");
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }
}

/// 預設集的存放位置（使用者設定目錄下的 presets 子目錄）
pub fn preset_directory() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "apngc").context("無法取得使用者設定目錄")?;
    Ok(dirs.config_dir().join("presets"))
}

/// 列出所有可用的預設集名稱（依字母排序）
pub fn discover_presets() -> Result<Vec<String>> {
    let dir = preset_directory()?;
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = fs::read_dir(&dir)
        .with_context(|| format!("無法讀取預設集目錄: {}", dir.display()))?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                path.file_stem().map(|s| s.to_string_lossy().to_string())
            } else {
                None
            }
        })
        .collect();

    names.sort();
    Ok(names)
}

/// 讀取指定名稱的預設集
pub fn load_preset(name: &str) -> Result<ConvertSettings> {
    let path = preset_directory()?.join(format!("{name}.json"));
    let content = fs::read_to_string(&path)
        .with_context(|| format!("無法讀取預設集: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("無法解析預設集: {}", path.display()))
}
