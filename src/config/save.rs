use crate::config::load::preset_directory;
use crate::config::types::{ConvertSettings, MAX_RECENT_PATHS, UserSettings};
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    // Save to settings.json in the current working directory
    let path = Path::new("settings.json");
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// 更新最近使用的路徑
/// 將新路徑加入最前面，去重並限制數量
pub fn add_recent_path(settings: &mut UserSettings, path: &str) {
    // 移除已存在的相同路徑
    settings.recent_paths.retain(|p| p != path);

    // 加入到最前面
    settings.recent_paths.insert(0, path.to_string());

    // 限制數量
    settings.recent_paths.truncate(MAX_RECENT_PATHS);
}

/// 預設集名稱限制為 1 到 50 個英數字元
#[must_use]
pub fn is_valid_preset_name(name: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9]{1,50}$").is_ok_and(|re| re.is_match(name))
}

/// 將轉換設定存成具名預設集
pub fn save_preset(name: &str, settings: &ConvertSettings) -> Result<()> {
    let dir = preset_directory()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("無法建立預設集目錄: {}", dir.display()))?;

    let path = dir.join(format!("{name}.json"));
    let content = serde_json::to_string_pretty(settings).context("無法序列化預設集")?;
    fs::write(&path, content).with_context(|| format!("無法寫入預設集: {}", path.display()))?;

    Ok(())
}

/// 刪除具名預設集；預設集不存在時不視為錯誤
pub fn remove_preset(name: &str) -> Result<()> {
    let path = preset_directory()?.join(format!("{name}.json"));
    if path.is_file() {
        fs::remove_file(&path)
            .with_context(|| format!("無法刪除預設集: {}", path.display()))?;
    }
    Ok(())
}
