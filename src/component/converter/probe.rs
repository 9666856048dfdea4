use crate::tools::ToolPaths;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct StreamInfo {
    width: Option<u32>,
    height: Option<u32>,
}

/// 使用 ffprobe 取得圖片的像素尺寸
///
/// 失敗時由呼叫端視為「尺寸未知」，一律觸發縮放；
/// 探測失敗本身不會使流程失敗
pub fn probe_image_size(tools: &ToolPaths, image_path: &Path) -> Result<(u32, u32)> {
    let output = Command::new(&tools.ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "json",
        ])
        .arg(image_path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", image_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    let probe: FfprobeOutput =
        serde_json::from_slice(&output.stdout).context("無法解析 ffprobe 輸出")?;

    let stream = probe
        .streams
        .as_ref()
        .and_then(|streams| streams.first())
        .ok_or_else(|| anyhow::anyhow!("ffprobe 輸出中找不到串流資訊: {}", image_path.display()))?;

    let width = stream
        .width
        .ok_or_else(|| anyhow::anyhow!("無法取得圖片寬度"))?;
    let height = stream
        .height
        .ok_or_else(|| anyhow::anyhow!("無法取得圖片高度"))?;

    Ok((width, height))
}
