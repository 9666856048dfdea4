use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const MAX_RECENT_PATHS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnUs => "English",
            Self::ZhTw => "繁體中文",
        };
        write!(f, "{name}")
    }
}

/// 單次轉換批次共用的設定（批次執行期間不可變）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertSettings {
    /// 目標寬度（像素）
    pub width: u32,
    /// 目標高度（像素）
    pub height: u32,
    /// 幀率（幀／秒）
    pub framerate: u32,
    /// 循環次數，0 表示無限循環
    pub loops: u32,
    /// 最後一幀額外停留時間（毫秒），0 表示不停留
    pub hold: u64,
    /// 組裝後是否以壓縮服務最佳化
    pub optimize: bool,
    pub tinify_key: String,
    pub output_path: String,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            framerate: 24,
            loops: 0,
            hold: 0,
            optimize: false,
            tinify_key: String::new(),
            output_path: String::new(),
        }
    }
}

impl ConvertSettings {
    /// 驗證組裝所需的欄位，回傳所有缺漏的項目
    ///
    /// 在任何流程開始前檢查一次，缺漏一次回報，不在流程中途才發現
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.width == 0 {
            errors.push("必須指定寬度".to_string());
        }
        if self.height == 0 {
            errors.push("必須指定高度".to_string());
        }
        if self.framerate == 0 {
            errors.push("必須指定幀率".to_string());
        }
        if self.output_path.trim().is_empty() {
            errors.push("必須指定輸出資料夾".to_string());
        } else if !Path::new(&self.output_path).is_dir() {
            errors.push(format!("輸出資料夾不存在: {}", self.output_path));
        }
        if self.optimize && self.tinify_key.trim().is_empty() {
            errors.push("啟用最佳化時必須指定 Tinify API 金鑰".to_string());
        }

        errors
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub recent_paths: Vec<String>,
    /// 上次選用的預設集名稱
    pub last_preset: Option<String>,
    pub convert: ConvertSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::EnUs,
            recent_paths: Vec::new(),
            last_preset: None,
            convert: ConvertSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
}
