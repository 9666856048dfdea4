//! APNG 序列轉換元件
//!
//! 多階段流程：
//! A. 探索影格序列並推斷檔名樣板
//! B. 比對尺寸，必要時縮放到暫存工作目錄（ffmpeg）
//! C. 寫入最後一幀的停留描述檔
//! D. 組裝成單一 APNG（apngasm）
//! E. 以壓縮服務最佳化（Tinify）
//! F. 清理暫存資源
//!
//! 多個來源資料夾並行執行，個別失敗互不影響

mod assemble;
mod error;
mod hold;
mod main;
mod optimize;
mod pipeline;
mod probe;
mod resize;
mod scheduler;
mod sequence;

pub use assemble::assemble_apng;
pub use error::ConvertError;
pub use hold::write_hold_file;
pub use main::ApngConverter;
pub use optimize::{SHRINK_ENDPOINT, optimize_apng};
pub use pipeline::{PipelineRun, Stage};
pub use probe::probe_image_size;
pub use resize::{NormalizedSequence, normalize_sequence};
pub use scheduler::{DirectoryScheduler, ProgressEvent, RunOutcome};
pub use sequence::{
    FrameSequence, expand_sequence, resolve_sequence, sequence_stem,
};
