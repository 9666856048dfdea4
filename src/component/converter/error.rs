use std::path::PathBuf;
use thiserror::Error;

/// 單一資料夾轉換流程的錯誤分類
///
/// 任何一種錯誤都只使該資料夾的流程失敗，不影響其他資料夾
#[derive(Debug, Error)]
pub enum ConvertError {
    /// 影格少於 2 個，無法組成動畫
    #[error("資料夾內少於 2 個影格: {0}")]
    EmptySequence(PathBuf),

    #[error("序列樣板無效: {0}")]
    InvalidPattern(String),

    #[error("縮放失敗: {0}")]
    ResizeFailed(String),

    #[error("組裝失敗: {0}")]
    AssemblyFailed(String),

    #[error("最佳化失敗: {0}")]
    OptimizationFailed(String),

    #[error("IO 錯誤: {0}")]
    Io(#[from] std::io::Error),
}
