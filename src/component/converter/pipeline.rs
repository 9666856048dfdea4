use super::assemble::assemble_apng;
use super::error::ConvertError;
use super::hold::write_hold_file;
use super::optimize::{SHRINK_ENDPOINT, optimize_apng};
use super::resize::normalize_sequence;
use super::sequence::{expand_sequence, resolve_sequence, sequence_stem};
use crate::config::ConvertSettings;
use crate::tools::ToolPaths;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

/// 每個階段完成時回報的固定進度增量
///
/// 省略的選用階段（停留、最佳化）仍計入其增量
const STAGE_DELTA: u8 = 20;

/// 流程階段，依列舉順序執行，單次執行內不重排、不並行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Discover,
    Hold,
    Assemble,
    Optimize,
    Cleanup,
    Done,
    Failed,
}

/// 單一資料夾的完整轉換流程
///
/// 依序執行：探索序列（含縮放決策）、最後一幀停留、組裝、
/// 最佳化、清理。無論成功或失敗，進度增量總和必為 100，
/// 且清理一定會執行；`Done` 與 `Failed` 是唯二的終止狀態，
/// 失敗的執行只回報一次，不自動重試
pub struct PipelineRun<'a> {
    seq_dir: PathBuf,
    settings: &'a ConvertSettings,
    tools: &'a ToolPaths,
    stage: Stage,
    progress: u8,
    /// 本次執行建立的暫存縮放工作目錄（只屬於這次執行）
    temp_workspace: Option<PathBuf>,
    /// 本次執行建立的停留描述檔（只屬於這次執行）
    temp_hold_file: Option<PathBuf>,
}

impl<'a> PipelineRun<'a> {
    #[must_use]
    pub fn new(seq_dir: &Path, settings: &'a ConvertSettings, tools: &'a ToolPaths) -> Self {
        Self {
            seq_dir: seq_dir.to_path_buf(),
            settings,
            tools,
            stage: Stage::Init,
            progress: 0,
            temp_workspace: None,
            temp_hold_file: None,
        }
    }

    /// 目前所在的階段；結束後停在 `Done` 或 `Failed`
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// 執行完整流程；各階段完成時經由 `emit` 回報進度增量
    ///
    /// 成功時回傳輸出檔路徑
    pub fn run(&mut self, emit: &mut dyn FnMut(u8)) -> Result<PathBuf, ConvertError> {
        let result = self.run_stages(emit);
        self.cleanup();

        match result {
            Ok(out_path) => {
                self.stage = Stage::Cleanup;
                self.advance(emit);
                self.stage = Stage::Done;
                info!("完成處理 {}", self.seq_dir.display());
                Ok(out_path)
            }
            Err(e) => {
                // 失敗時一次補足剩餘增量，讓增量總和維持 100
                let remaining = 100 - self.progress;
                if remaining > 0 {
                    self.progress = 100;
                    emit(remaining);
                }
                error!(
                    "處理 {} 於 {:?} 階段失敗: {e}",
                    self.seq_dir.display(),
                    self.stage
                );
                self.stage = Stage::Failed;
                Err(e)
            }
        }
    }

    fn run_stages(&mut self, emit: &mut dyn FnMut(u8)) -> Result<PathBuf, ConvertError> {
        // 探索序列，並在此階段內決定是否縮放
        self.stage = Stage::Discover;
        let seq = resolve_sequence(&self.seq_dir)?;
        debug!(
            "序列 {}: {} 個影格，樣板 {}，起始影格 {}",
            self.seq_dir.display(),
            seq.frames.len(),
            seq.pattern.display(),
            seq.start_frame
        );
        let normalized =
            normalize_sequence(self.tools, &seq, self.settings.width, self.settings.height)?;
        self.temp_workspace = normalized.temp_workspace;
        let pattern = normalized.pattern;
        self.advance(emit);

        // 最後一幀停留
        self.stage = Stage::Hold;
        if self.settings.hold > 0 {
            debug!("套用 {} 毫秒的停留", self.settings.hold);
            self.temp_hold_file = write_hold_file(&pattern, self.settings.hold)?;
        }
        self.advance(emit);

        // 組裝
        self.stage = Stage::Assemble;
        let out_path = self.output_path(&pattern);
        let frames = expand_sequence(&pattern)?;
        let first_frame = frames.first().ok_or_else(|| {
            ConvertError::InvalidPattern(format!(
                "樣板展開後沒有任何影格: {}",
                pattern.display()
            ))
        })?;
        assemble_apng(
            self.tools,
            &out_path,
            first_frame,
            self.settings.framerate,
            self.settings.loops,
        )?;
        self.advance(emit);

        // 最佳化
        self.stage = Stage::Optimize;
        if self.settings.optimize {
            optimize_apng(SHRINK_ENDPOINT, &out_path, &self.settings.tinify_key, true)?;
        }
        self.advance(emit);

        Ok(out_path)
    }

    /// 輸出檔路徑：序列名稱加上 .png，置於設定的輸出資料夾
    fn output_path(&self, pattern: &Path) -> PathBuf {
        Path::new(&self.settings.output_path).join(format!("{}.png", sequence_stem(pattern)))
    }

    fn advance(&mut self, emit: &mut dyn FnMut(u8)) {
        self.progress = self.progress.saturating_add(STAGE_DELTA).min(100);
        emit(STAGE_DELTA);
    }

    /// 清理本次執行建立的暫存資源
    ///
    /// 成功與失敗路徑都會執行；清理失敗只記錄，
    /// 不覆蓋已確定的執行結果
    fn cleanup(&mut self) {
        if let Some(hold_file) = self.temp_hold_file.take() {
            if hold_file.exists() {
                if let Err(e) = std::fs::remove_file(&hold_file) {
                    warn!("無法刪除停留描述檔 {}: {e}", hold_file.display());
                }
            }
        }
        if let Some(workspace) = self.temp_workspace.take() {
            if workspace.exists() {
                if let Err(e) = std::fs::remove_dir_all(&workspace) {
                    warn!("無法清理暫存工作目錄 {}: {e}", workspace.display());
                }
            }
        }
    }
}
