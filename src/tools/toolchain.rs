use std::env;
use std::path::PathBuf;

/// 外部工具的執行檔位置
///
/// 程式啟動時解析一次，之後以參數注入各個階段，
/// 不從散落各處的全域狀態讀取
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub apngasm: PathBuf,
}

impl ToolPaths {
    /// 從環境變數解析工具路徑，未設定時使用 PATH 上的預設名稱
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            ffmpeg: Self::resolve("APNGC_FFMPEG", "ffmpeg"),
            ffprobe: Self::resolve("APNGC_FFPROBE", "ffprobe"),
            apngasm: Self::resolve("APNGC_APNGASM", "apngasm"),
        }
    }

    fn resolve(env_key: &str, default: &str) -> PathBuf {
        env::var_os(env_key).map_or_else(|| PathBuf::from(default), PathBuf::from)
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::from_env()
    }
}
