use super::error::ConvertError;
use super::probe::probe_image_size;
use super::sequence::{FrameSequence, sequence_stem};
use crate::tools::ToolPaths;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

/// 尺寸正規化的結果
#[derive(Debug)]
pub struct NormalizedSequence {
    /// 送交後續階段的序列樣板
    pub pattern: PathBuf,
    /// 本次建立的暫存工作目錄；未縮放時為 None
    pub temp_workspace: Option<PathBuf>,
}

/// 比對序列尺寸與目標尺寸，不符時縮放到暫存工作目錄
///
/// 尺寸已相符時不執行任何縮放，直接回傳原始樣板；
/// 探測失敗視為尺寸未知，一律縮放。原始影格不會被修改
pub fn normalize_sequence(
    tools: &ToolPaths,
    seq: &FrameSequence,
    width: u32,
    height: u32,
) -> Result<NormalizedSequence, ConvertError> {
    let first_frame = seq
        .frames
        .first()
        .ok_or_else(|| ConvertError::EmptySequence(seq.dir.clone()))?;

    match probe_image_size(tools, first_frame) {
        Ok((w, h)) if w == width && h == height => {
            debug!(
                "序列尺寸已符合 {width}x{height}，略過縮放: {}",
                seq.dir.display()
            );
            return Ok(NormalizedSequence {
                pattern: seq.pattern.clone(),
                temp_workspace: None,
            });
        }
        Ok((w, h)) => {
            debug!("序列尺寸 {w}x{h} 與目標 {width}x{height} 不符，進行縮放");
        }
        Err(e) => {
            warn!("尺寸探測失敗，視為需要縮放: {e}");
        }
    }

    let pattern = resize_sequence(tools, seq, width, height)?;
    Ok(NormalizedSequence {
        temp_workspace: pattern.parent().map(Path::to_path_buf),
        pattern,
    })
}

/// 以 ffmpeg 將整個序列縮放至目標尺寸
///
/// 輸出到由序列名稱推導的暫存工作目錄；
/// 殘留的舊工作目錄會先移除，確保目錄是乾淨的
fn resize_sequence(
    tools: &ToolPaths,
    seq: &FrameSequence,
    width: u32,
    height: u32,
) -> Result<PathBuf, ConvertError> {
    let workspace = derive_workspace(&seq.pattern);
    if workspace.exists() {
        std::fs::remove_dir_all(&workspace)?;
    }
    std::fs::create_dir_all(&workspace)?;

    let pattern_name = seq
        .pattern
        .file_name()
        .ok_or_else(|| ConvertError::InvalidPattern("序列樣板缺少檔名".to_string()))?;
    let out_pattern = workspace.join(pattern_name);

    info!("縮放 {} 至 {width}x{height}", seq.pattern.display());

    let output = Command::new(&tools.ffmpeg)
        .arg("-y")
        .args(["-start_number", &seq.start_frame.to_string()])
        .arg("-i")
        .arg(&seq.pattern)
        .args(["-vf", &format!("scale={width}:{height}:flags=lanczos")])
        .arg(&out_pattern)
        .output()
        .map_err(|e| ConvertError::ResizeFailed(format!("無法執行 ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ConvertError::ResizeFailed(stderr.trim().to_string()));
    }

    Ok(out_pattern)
}

/// 自序列名稱推導專屬的暫存工作目錄
///
/// 目錄名稱對同一序列是固定的，工作目錄只屬於建立它的那次執行
fn derive_workspace(pattern: &Path) -> PathBuf {
    std::env::temp_dir()
        .join("apngc")
        .join(sequence_stem(pattern))
}
