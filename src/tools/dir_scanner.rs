use anyhow::{Result, bail};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("路徑不存在: {}", path.display());
    }
    if !path.is_dir() {
        bail!("路徑不是資料夾: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// 遞迴尋找含有兩個以上檔案的資料夾，視為候選的影格序列資料夾
///
/// 單一檔案無法組成動畫，含 0 或 1 個檔案的資料夾直接略過
#[must_use]
pub fn find_sequence_directories(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| {
            let file_count = std::fs::read_dir(entry.path())
                .ok()?
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_ok_and(|t| t.is_file()))
                .count();
            (file_count > 1).then(|| entry.into_path())
        })
        .collect()
}
