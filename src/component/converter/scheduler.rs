use super::error::ConvertError;
use super::pipeline::PipelineRun;
use crate::config::ConvertSettings;
use crate::tools::ToolPaths;
use log::{error, info};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Sender;

/// 排程器對外發布的進度事件
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// 單一資料夾回報了一個進度增量
    Progress {
        dir: PathBuf,
        /// 本次增量
        delta: u8,
        /// 該資料夾自身的進度（0-100）
        absolute: u8,
        /// 所有資料夾的加權總進度（0-100）
        aggregate: f64,
    },
    /// 單一資料夾處理完成
    Finished { dir: PathBuf, output: PathBuf },
    /// 單一資料夾處理失敗；其他資料夾不受影響
    Failed { dir: PathBuf, error: String },
}

/// 單一資料夾的最終結果
#[derive(Debug)]
pub struct RunOutcome {
    pub dir: PathBuf,
    pub result: Result<PathBuf, ConvertError>,
}

/// 多資料夾並行排程器
///
/// 每個來源資料夾各自執行一次完整流程；彼此擁有獨立的暫存資源
/// 與輸出路徑，唯一共享的狀態是加權進度的原子計數器。
/// 單一資料夾失敗不取消、不重試其他資料夾；完成順序不保證。
/// 所有資料夾結束後，加權總進度必為 100（失敗的資料夾
/// 同樣貢獻其完整的加權份額）
pub struct DirectoryScheduler<'a> {
    settings: &'a ConvertSettings,
    tools: &'a ToolPaths,
}

impl<'a> DirectoryScheduler<'a> {
    #[must_use]
    pub const fn new(settings: &'a ConvertSettings, tools: &'a ToolPaths) -> Self {
        Self { settings, tools }
    }

    /// 並行處理所有資料夾，進度事件經由 `events` 發布
    ///
    /// 回傳值依輸入順序排列
    pub fn run(&self, dirs: &[PathBuf], events: &Sender<ProgressEvent>) -> Vec<RunOutcome> {
        if dirs.is_empty() {
            return Vec::new();
        }

        info!("開始處理 {} 個資料夾", dirs.len());
        let total = AtomicU32::new(0);
        let count = u32::try_from(dirs.len()).unwrap_or(u32::MAX);

        dirs.par_iter()
            .map_with(events.clone(), |tx, dir| RunOutcome {
                dir: dir.clone(),
                result: self.run_single(dir, count, &total, tx),
            })
            .collect()
    }

    fn run_single(
        &self,
        dir: &Path,
        count: u32,
        total: &AtomicU32,
        events: &Sender<ProgressEvent>,
    ) -> Result<PathBuf, ConvertError> {
        let mut absolute: u8 = 0;
        let mut run = PipelineRun::new(dir, self.settings, self.tools);

        let result = run.run(&mut |delta| {
            absolute = absolute.saturating_add(delta);
            let raw = total.fetch_add(u32::from(delta), Ordering::SeqCst) + u32::from(delta);
            let aggregate = f64::from(raw) / f64::from(count);

            // 接收端先行離開時忽略傳送失敗
            let _ = events.send(ProgressEvent::Progress {
                dir: dir.to_path_buf(),
                delta,
                absolute,
                aggregate,
            });
        });

        match &result {
            Ok(output) => {
                let _ = events.send(ProgressEvent::Finished {
                    dir: dir.to_path_buf(),
                    output: output.clone(),
                });
            }
            Err(e) => {
                error!("資料夾 {} 處理失敗: {e}", dir.display());
                let _ = events.send(ProgressEvent::Failed {
                    dir: dir.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }

        result
    }
}
