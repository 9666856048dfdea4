use super::error::ConvertError;
use regex::Regex;
use std::path::{Path, PathBuf};

/// 影格檔案使用的副檔名
const FRAME_EXTENSION: &str = "png";

/// 一個影格序列
///
/// 每次執行時建立一次，之後唯讀。影格依編號遞增排序；
/// 排序採字典序，僅在零填補位數一致時等同數字序，
/// 不支援位數不一致的序列
#[derive(Debug, Clone)]
pub struct FrameSequence {
    /// 來源資料夾
    pub dir: PathBuf,
    /// 依影格編號遞增排序的影格檔案
    pub frames: Vec<PathBuf>,
    /// 影格編號的零填補位數
    pub padding: usize,
    /// 影格編號以 %0Nd 佔位符取代後的序列樣板（含路徑）
    pub pattern: PathBuf,
    /// 起始影格編號
    pub start_frame: u32,
}

/// 解析資料夾內的影格序列
///
/// 影格少於 2 個時回傳 `EmptySequence`
pub fn resolve_sequence(dir: &Path) -> Result<FrameSequence, ConvertError> {
    let mut names: Vec<String> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_frame = Path::new(&name)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.to_lowercase() == FRAME_EXTENSION);
            is_frame.then_some(name)
        })
        .collect();
    names.sort();

    if names.len() < 2 {
        return Err(ConvertError::EmptySequence(dir.to_path_buf()));
    }

    let first = &names[0];
    let token = start_frame_token(first);
    let padding = token.len();
    let start_frame = token.parse().unwrap_or(1);
    let pattern_name = replace_last_occurrence(first, &token, &format!("%0{padding}d"));

    Ok(FrameSequence {
        dir: dir.to_path_buf(),
        frames: names.iter().map(|name| dir.join(name)).collect(),
        padding,
        pattern: dir.join(pattern_name),
        start_frame,
    })
}

/// 將 %0Nd 樣板展開回實際存在的影格檔案列表
///
/// 只接受檔名中間段為固定位數純數字的檔案，結果依字典序排序
pub fn expand_sequence(pattern: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let name = pattern
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let re = Regex::new(r"%0(\d+)d")
        .map_err(|e| ConvertError::InvalidPattern(e.to_string()))?;
    let placeholder = re.find(&name).ok_or_else(|| {
        ConvertError::InvalidPattern(format!("樣板中找不到影格編號佔位符: {name}"))
    })?;

    let width: usize = name[placeholder.start() + 2..placeholder.end() - 1]
        .parse()
        .map_err(|e| ConvertError::InvalidPattern(format!("無法解析佔位符位數: {e}")))?;
    let prefix = &name[..placeholder.start()];
    let suffix = &name[placeholder.end()..];

    let dir = pattern.parent().unwrap_or_else(|| Path::new("."));
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().to_string();
            let middle = file_name
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))?;
            let matches = middle.len() == width && middle.chars().all(|c| c.is_ascii_digit());
            matches.then(|| dir.join(file_name))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// 序列樣板去除佔位符後的名稱（佔位符之前的檔名，去掉尾端分隔字元）
#[must_use]
pub fn sequence_stem(pattern: &Path) -> String {
    let name = pattern
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let prefix = name.split('%').next().unwrap_or_default();
    let trimmed = prefix.trim_end_matches(['_', '.', '-']);

    if trimmed.is_empty() {
        "sequence".to_string()
    } else {
        trimmed.to_string()
    }
}

/// 取出檔名中代表起始影格編號的字串
///
/// 檔名含兩個以上的點時取倒數第二段，
/// 否則取主檔名最後一個底線之後的字串
fn start_frame_token(filename: &str) -> String {
    if filename.matches('.').count() >= 2 {
        let segments: Vec<&str> = filename.split('.').collect();
        segments[segments.len() - 2].to_string()
    } else {
        let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
        stem.rsplit('_').next().unwrap_or(stem).to_string()
    }
}

/// 只取代最後一次出現的子字串
///
/// 避免破壞檔名中較早出現的數字片段
fn replace_last_occurrence(input: &str, old: &str, new: &str) -> String {
    match input.rfind(old) {
        Some(pos) => format!("{}{}{}", &input[..pos], new, &input[pos + old.len()..]),
        None => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_frames(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"png").unwrap();
        }
    }

    #[test]
    fn test_resolve_underscore_sequence() {
        let dir = tempfile::tempdir().unwrap();
        make_frames(dir.path(), &["shot_0001.png", "shot_0002.png", "shot_0003.png"]);

        let seq = resolve_sequence(dir.path()).unwrap();
        assert_eq!(seq.frames.len(), 3);
        assert_eq!(seq.padding, 4);
        assert_eq!(seq.start_frame, 1);
        assert_eq!(
            seq.pattern.file_name().unwrap().to_string_lossy(),
            "shot_%04d.png"
        );
    }

    #[test]
    fn test_resolve_dotted_sequence() {
        let dir = tempfile::tempdir().unwrap();
        make_frames(dir.path(), &["render.0010.png", "render.0011.png"]);

        let seq = resolve_sequence(dir.path()).unwrap();
        assert_eq!(seq.padding, 4);
        assert_eq!(seq.start_frame, 10);
        assert_eq!(
            seq.pattern.file_name().unwrap().to_string_lossy(),
            "render.%04d.png"
        );
    }

    #[test]
    fn test_resolve_replaces_only_last_occurrence() {
        // 檔名前段的 01 不能被佔位符取代
        let dir = tempfile::tempdir().unwrap();
        make_frames(dir.path(), &["shot01_01.png", "shot01_02.png"]);

        let seq = resolve_sequence(dir.path()).unwrap();
        assert_eq!(seq.padding, 2);
        assert_eq!(
            seq.pattern.file_name().unwrap().to_string_lossy(),
            "shot01_%02d.png"
        );
    }

    #[test]
    fn test_resolve_rejects_single_frame() {
        let dir = tempfile::tempdir().unwrap();
        make_frames(dir.path(), &["frame_01.png"]);

        let result = resolve_sequence(dir.path());
        assert!(matches!(result, Err(ConvertError::EmptySequence(_))));
    }

    #[test]
    fn test_resolve_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        make_frames(dir.path(), &["a_01.png", "a_02.png"]);
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let seq = resolve_sequence(dir.path()).unwrap();
        assert_eq!(seq.frames.len(), 2);
    }

    #[test]
    fn test_expand_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let names = ["clip_0007.png", "clip_0008.png", "clip_0009.png", "clip_0010.png"];
        make_frames(dir.path(), &names);

        let seq = resolve_sequence(dir.path()).unwrap();
        let expanded = expand_sequence(&seq.pattern).unwrap();

        // 樣板展開後必須與原始檔案列表完全一致
        assert_eq!(expanded, seq.frames);
    }

    #[test]
    fn test_expand_skips_wrong_width() {
        let dir = tempfile::tempdir().unwrap();
        make_frames(dir.path(), &["a_001.png", "a_002.png", "a_0003.png"]);

        let expanded = expand_sequence(&dir.path().join("a_%03d.png")).unwrap();
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_expand_without_placeholder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = expand_sequence(&dir.path().join("plain.png"));
        assert!(matches!(result, Err(ConvertError::InvalidPattern(_))));
    }

    #[test]
    fn test_sequence_stem() {
        assert_eq!(sequence_stem(Path::new("/a/shot_%04d.png")), "shot");
        assert_eq!(sequence_stem(Path::new("/a/render.%04d.png")), "render");
        assert_eq!(sequence_stem(Path::new("/a/shot01_%02d.png")), "shot01");
    }

    #[test]
    fn test_start_frame_token() {
        assert_eq!(start_frame_token("shot_0001.png"), "0001");
        assert_eq!(start_frame_token("render.0010.png"), "0010");
        assert_eq!(start_frame_token("a_b_12.png"), "12");
    }
}
