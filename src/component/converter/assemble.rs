use super::error::ConvertError;
use crate::tools::ToolPaths;
use log::{debug, info};
use std::path::Path;
use std::process::Command;

/// 以 apngasm 將影格序列組裝成單一 APNG
///
/// 只指定第一個影格，其餘影格由工具依檔名樣式推斷；
/// `1 {framerate}` 為每幀的顯示時間分數（1/幀率 秒）。
/// 工具回報成功但未產生輸出檔時同樣視為失敗
pub fn assemble_apng(
    tools: &ToolPaths,
    out_path: &Path,
    first_frame: &Path,
    framerate: u32,
    loops: u32,
) -> Result<(), ConvertError> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!(
        "組裝 {} -> {}",
        first_frame.display(),
        out_path.display()
    );

    let output = Command::new(&tools.apngasm)
        .arg(out_path)
        .arg(first_frame)
        .args(["1", &framerate.to_string(), &format!("-l{loops}")])
        .output()
        .map_err(|e| ConvertError::AssemblyFailed(format!("無法執行 apngasm: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::AssemblyFailed(stderr.trim().to_string()));
    }

    // 僅靠結束碼不足以確認成功，輸出檔必須實際存在
    if !out_path.exists() {
        return Err(ConvertError::AssemblyFailed(format!(
            "輸出檔案未建立: {}",
            out_path.display()
        )));
    }

    debug!("組裝完成: {}", out_path.display());
    Ok(())
}
