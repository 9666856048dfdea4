use crate::component::ApngConverter;
use crate::config::Config;
use crate::pause;
use crate::tools::ToolPaths;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_converter(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    tools: &ToolPaths,
    config: &mut Config,
) -> Result<()> {
    let mut converter = ApngConverter::new(
        config.clone(),
        tools.clone(),
        Arc::clone(shutdown_signal),
    );

    if let Err(e) = converter.run() {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
    }

    // 元件可能更新了最近使用的路徑，重新載入設定
    *config = Config::new()?;

    pause(term)?;
    Ok(())
}
