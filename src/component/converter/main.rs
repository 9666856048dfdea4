use super::scheduler::{DirectoryScheduler, ProgressEvent, RunOutcome};
use crate::config::{Config, add_recent_path, save_settings};
use crate::tools::{ToolPaths, find_sequence_directories, validate_directory_exists};
use anyhow::{Result, anyhow};
use console::style;
use dialoguer::Input;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

/// APNG 序列轉換元件
///
/// 輸入一個根目錄，找出其下所有影格序列資料夾並行轉換；
/// 主執行緒負責渲染每個資料夾的進度列與加權總進度列
pub struct ApngConverter {
    config: Config,
    tools: ToolPaths,
    shutdown_signal: Arc<AtomicBool>,
}

impl ApngConverter {
    #[must_use]
    pub const fn new(config: Config, tools: ToolPaths, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            tools,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style("=== APNG 序列轉換 ===").cyan().bold());

        // 批次開始前驗證設定，缺漏一次回報，不進入任何流程
        let errors = self.config.settings.convert.validate();
        if !errors.is_empty() {
            println!("{}", style("設定不完整，請先修正以下問題：").red().bold());
            for error in &errors {
                println!("  - {error}");
            }
            return Ok(());
        }

        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!("已收到中斷信號，不開始新的批次");
            return Ok(());
        }

        let input_path = self.prompt_input_path()?;
        let root = PathBuf::from(&input_path);
        validate_directory_exists(&root)?;

        add_recent_path(&mut self.config.settings, &input_path);
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("無法儲存最近使用的路徑: {e}");
        }

        println!("{}", style("掃描影格序列資料夾中...").dim());
        let dirs = find_sequence_directories(&root);

        if dirs.is_empty() {
            println!("{}", style("找不到含有影格序列的資料夾").yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(format!("找到 {} 個序列資料夾：", dirs.len())).green()
        );
        for (index, dir) in dirs.iter().enumerate() {
            println!("  {}. {}", index + 1, dir.display());
        }

        println!();
        println!("{}", style("開始轉換...").cyan());

        let outcomes = self.process_directories(&dirs)?;
        self.print_summary(&outcomes);

        Ok(())
    }

    fn prompt_input_path(&self) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt("請輸入來源資料夾路徑");
        // 有最近使用的路徑時作為預設值
        if let Some(recent) = self.config.settings.recent_paths.first() {
            input = input.default(recent.clone());
        }
        let path = input.interact_text()?;
        Ok(path.trim().to_string())
    }

    /// 在背景執行排程器，主執行緒消費進度事件並渲染進度列
    fn process_directories(&self, dirs: &[PathBuf]) -> Result<Vec<RunOutcome>> {
        let (tx, rx) = mpsc::channel();
        let multi = MultiProgress::new();

        let bar_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}/100 {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-");
        let total_style = ProgressStyle::default_bar()
            .template("  [{bar:40.green/blue}] {pos:>3}/100 {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-");

        let mut bars: HashMap<PathBuf, ProgressBar> = HashMap::new();
        for dir in dirs {
            let bar = multi.add(ProgressBar::new(100));
            bar.set_style(bar_style.clone());
            bar.set_message(
                dir.file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string(),
            );
            bars.insert(dir.clone(), bar);
        }
        let total_bar = multi.add(ProgressBar::new(100));
        total_bar.set_style(total_style);
        total_bar.set_message("總進度");

        let settings = &self.config.settings.convert;
        let tools = &self.tools;

        let outcomes = thread::scope(|scope| {
            let worker = scope.spawn(move || {
                let scheduler = DirectoryScheduler::new(settings, tools);
                scheduler.run(dirs, &tx)
            });

            // 所有執行結束、發送端回收後，通道關閉、迴圈結束
            for event in rx {
                match event {
                    ProgressEvent::Progress {
                        dir,
                        absolute,
                        aggregate,
                        ..
                    } => {
                        if let Some(bar) = bars.get(&dir) {
                            bar.set_position(u64::from(absolute));
                        }
                        total_bar.set_position(aggregate.round() as u64);
                    }
                    ProgressEvent::Finished { dir, output } => {
                        if let Some(bar) = bars.get(&dir) {
                            bar.finish_with_message(format!("完成 -> {}", output.display()));
                        }
                    }
                    ProgressEvent::Failed { dir, error } => {
                        // 失敗的資料夾顯示為 100% 並標記錯誤，
                        // 讓總進度得以走完
                        if let Some(bar) = bars.get(&dir) {
                            bar.set_position(100);
                            bar.abandon_with_message(format!(
                                "{} {error}",
                                style("失敗:").red().bold()
                            ));
                        }
                    }
                }
            }

            join_scheduler(worker)
        })?;

        total_bar.finish();
        Ok(outcomes)
    }

    fn print_summary(&self, outcomes: &[RunOutcome]) {
        let successful = outcomes.iter().filter(|o| o.result.is_ok()).count();
        let failed = outcomes.len() - successful;

        println!();
        println!("{}", style("=== 轉換摘要 ===").cyan().bold());
        println!("  總計: {} 個資料夾", outcomes.len());
        println!("  成功: {} 個", style(successful).green());
        if failed > 0 {
            println!("  失敗: {} 個", style(failed).red());
            for outcome in outcomes {
                if let Err(e) = &outcome.result {
                    println!("    {} {}: {e}", style("✗").red(), outcome.dir.display());
                }
            }
        }

        info!("轉換批次完成 - 成功: {successful}, 失敗: {failed}");
    }
}

/// 等待排程執行緒結束
///
/// 執行緒 panic 時回報錯誤，不得退化成空的結果列表
fn join_scheduler<T>(worker: thread::ScopedJoinHandle<'_, T>) -> Result<T> {
    worker.join().map_err(|_| anyhow!("排程執行緒異常終止"))
}
