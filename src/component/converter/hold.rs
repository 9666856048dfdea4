use super::error::ConvertError;
use super::sequence::expand_sequence;
use log::debug;
use std::path::{Path, PathBuf};

/// 在序列最後一幀旁寫入停留時間描述檔
///
/// 組裝工具會讀取與影格同名的 txt 檔，以其中的 delay 指令
/// 覆寫該影格的顯示時間（毫秒數除以 1000 毫秒的時基）。
/// 停留為 0 時不做任何事
pub fn write_hold_file(pattern: &Path, hold_ms: u64) -> Result<Option<PathBuf>, ConvertError> {
    if hold_ms == 0 {
        return Ok(None);
    }

    let frames = expand_sequence(pattern)?;
    let last = frames.last().ok_or_else(|| {
        ConvertError::InvalidPattern(format!("樣板展開後沒有任何影格: {}", pattern.display()))
    })?;

    let delay_file = last.with_extension("txt");
    let directive = format!("delay={hold_ms}/1000");
    debug!("寫入停留描述檔 {}: {directive}", delay_file.display());
    std::fs::write(&delay_file, &directive)?;

    Ok(Some(delay_file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_hold_file_written_next_to_last_frame() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_01.png"), b"x").unwrap();
        fs::write(dir.path().join("a_02.png"), b"x").unwrap();

        let pattern = dir.path().join("a_%02d.png");
        let delay_file = write_hold_file(&pattern, 500).unwrap().unwrap();

        assert_eq!(delay_file, dir.path().join("a_02.txt"));
        assert_eq!(fs::read_to_string(&delay_file).unwrap(), "delay=500/1000");
    }

    #[test]
    fn test_zero_hold_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = dir.path().join("a_%02d.png");

        assert!(write_hold_file(&pattern, 0).unwrap().is_none());
        // 不應該建立任何檔案
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
