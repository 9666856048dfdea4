//! 整合測試 - 以替身腳本取代外部工具，驗證完整轉換流程
//!
//! 每個測試使用不同的序列名稱，避免共用暫存工作目錄互相干擾

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use apngc::component::converter::{
    ConvertError, DirectoryScheduler, PipelineRun, ProgressEvent, Stage,
};
use apngc::config::ConvertSettings;
use apngc::tools::ToolPaths;

/// 寫入一個可執行的 shell 腳本作為外部工具替身
fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// 回報固定尺寸的 ffprobe 替身
fn stub_ffprobe(dir: &Path, width: u32, height: u32) -> PathBuf {
    write_stub(
        dir,
        "ffprobe",
        &format!(r#"printf '{{"streams":[{{"width":{width},"height":{height}}}]}}'"#),
    )
}

/// 將輸入樣板目錄的影格複製到輸出樣板目錄的 ffmpeg 替身
///
/// 每次呼叫都會在 `log` 追加一行參數記錄
fn stub_ffmpeg(dir: &Path, log: &Path) -> PathBuf {
    write_stub(
        dir,
        "ffmpeg",
        &format!(
            r#"echo "$@" >> {log}
src=$(dirname "$5")
for last in "$@"; do :; done
dst=$(dirname "$last")
cp "$src"/*.png "$dst"/"#,
            log = log.display()
        ),
    )
}

/// 產生輸出檔的 apngasm 替身；同時將影格目錄中的停留描述檔記錄到 `log`
fn stub_apngasm(dir: &Path, log: &Path) -> PathBuf {
    write_stub(
        dir,
        "apngasm",
        &format!(
            r#"d=$(dirname "$2")
cat "$d"/*.txt > {log} 2>/dev/null
printf 'apng' > "$1""#,
            log = log.display()
        ),
    )
}

fn make_frames(dir: &Path, stem: &str, count: u32) {
    for i in 1..=count {
        fs::write(dir.join(format!("{stem}_{i:02}.png")), b"png").unwrap();
    }
}

fn test_settings(output_dir: &Path) -> ConvertSettings {
    ConvertSettings {
        width: 320,
        height: 240,
        framerate: 24,
        loops: 0,
        hold: 0,
        optimize: false,
        tinify_key: String::new(),
        output_path: output_dir.to_string_lossy().into_owned(),
    }
}

/// 測試 1: 尺寸相符時不縮放，五個階段各回報 20
#[test]
fn test_pipeline_success_without_resize() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("seq");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&seq_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    make_frames(&seq_dir, "alpha", 4);

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let apngasm_log = root.path().join("apngasm.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        ffprobe: stub_ffprobe(root.path(), 320, 240),
        apngasm: stub_apngasm(root.path(), &apngasm_log),
    };
    let settings = test_settings(&out_dir);

    let mut deltas = Vec::new();
    let mut run = PipelineRun::new(&seq_dir, &settings, &tools);
    let result = run.run(&mut |d| deltas.push(d));

    let out_path = result.unwrap();
    assert_eq!(out_path, out_dir.join("alpha.png"));
    assert!(out_path.exists());
    assert_eq!(deltas, vec![20, 20, 20, 20, 20]);
    assert_eq!(run.stage(), Stage::Done);
    // 尺寸相符，不應呼叫 ffmpeg
    assert!(!ffmpeg_log.exists());
}

/// 測試 2: 尺寸不符時縮放一次，工作目錄在結束後清除
#[test]
fn test_pipeline_resizes_on_size_mismatch() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("seq");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&seq_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    make_frames(&seq_dir, "beta", 3);

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let apngasm_log = root.path().join("apngasm.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        ffprobe: stub_ffprobe(root.path(), 999, 999),
        apngasm: stub_apngasm(root.path(), &apngasm_log),
    };
    let settings = test_settings(&out_dir);

    let mut total = 0u32;
    let result = PipelineRun::new(&seq_dir, &settings, &tools).run(&mut |d| total += u32::from(d));

    assert!(result.unwrap().exists());
    assert_eq!(total, 100);

    // ffmpeg 恰好被呼叫一次
    let log = fs::read_to_string(&ffmpeg_log).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains("scale=320:240"));

    // 縮放工作目錄必須已清除
    let workspace = std::env::temp_dir().join("apngc").join("beta");
    assert!(!workspace.exists());
}

/// 測試 2b: 尺寸探測失敗視為尺寸未知，一律縮放且流程照常成功
#[test]
fn test_probe_failure_forces_resize() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("seq");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&seq_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    make_frames(&seq_dir, "iota", 3);

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let apngasm_log = root.path().join("apngasm.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        // 探測一律失敗
        ffprobe: write_stub(root.path(), "ffprobe", "echo 'probe error' >&2\nexit 1"),
        apngasm: stub_apngasm(root.path(), &apngasm_log),
    };
    let settings = test_settings(&out_dir);

    let mut total = 0u32;
    let result = PipelineRun::new(&seq_dir, &settings, &tools).run(&mut |d| total += u32::from(d));

    // 探測失敗不使流程失敗，只觸發縮放
    assert!(result.unwrap().exists());
    assert_eq!(total, 100);

    let log = fs::read_to_string(&ffmpeg_log).unwrap();
    assert_eq!(log.lines().count(), 1);

    let workspace = std::env::temp_dir().join("apngc").join("iota");
    assert!(!workspace.exists());
}

/// 測試 3: 停留描述檔在組裝時存在，結束後清除
#[test]
fn test_hold_file_visible_to_assembler_then_cleaned() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("seq");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&seq_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    make_frames(&seq_dir, "gamma", 2);

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let apngasm_log = root.path().join("apngasm.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        ffprobe: stub_ffprobe(root.path(), 320, 240),
        apngasm: stub_apngasm(root.path(), &apngasm_log),
    };
    let mut settings = test_settings(&out_dir);
    settings.hold = 500;

    let mut deltas = Vec::new();
    let result = PipelineRun::new(&seq_dir, &settings, &tools).run(&mut |d| deltas.push(d));

    assert!(result.is_ok());
    assert_eq!(deltas.iter().map(|&d| u32::from(d)).sum::<u32>(), 100);

    // 組裝替身在執行當下讀到了停留描述檔
    assert_eq!(
        fs::read_to_string(&apngasm_log).unwrap(),
        "delay=500/1000"
    );
    // 結束後描述檔已清除
    assert!(!seq_dir.join("gamma_02.txt").exists());
}

/// 測試 4: 單一影格不構成序列，失敗時增量仍補足到 100
#[test]
fn test_single_frame_fails_with_full_progress() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("seq");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&seq_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    make_frames(&seq_dir, "delta", 1);

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let apngasm_log = root.path().join("apngasm.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        ffprobe: stub_ffprobe(root.path(), 320, 240),
        apngasm: stub_apngasm(root.path(), &apngasm_log),
    };
    let settings = test_settings(&out_dir);

    let mut deltas = Vec::new();
    let mut run = PipelineRun::new(&seq_dir, &settings, &tools);
    let result = run.run(&mut |d| deltas.push(d));

    assert!(matches!(result, Err(ConvertError::EmptySequence(_))));
    assert_eq!(deltas.iter().map(|&d| u32::from(d)).sum::<u32>(), 100);
    assert_eq!(run.stage(), Stage::Failed);
}

/// 測試 5: 工具回報成功但未產生輸出檔，視為組裝失敗並照常清理
#[test]
fn test_silent_assembler_failure_is_detected() {
    let root = tempfile::tempdir().unwrap();
    let seq_dir = root.path().join("seq");
    let out_dir = root.path().join("out");
    fs::create_dir_all(&seq_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();
    make_frames(&seq_dir, "epsilon", 3);

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        ffprobe: stub_ffprobe(root.path(), 320, 240),
        // 結束碼為 0 但不寫任何輸出
        apngasm: write_stub(root.path(), "apngasm", "exit 0"),
    };
    let mut settings = test_settings(&out_dir);
    settings.hold = 250;

    let mut total = 0u32;
    let result = PipelineRun::new(&seq_dir, &settings, &tools).run(&mut |d| total += u32::from(d));

    assert!(matches!(result, Err(ConvertError::AssemblyFailed(_))));
    assert_eq!(total, 100);
    assert!(!out_dir.join("epsilon.png").exists());
    // 停留描述檔在失敗路徑上同樣被清除
    assert!(!seq_dir.join("epsilon_03.txt").exists());
}

/// 測試 6: 多資料夾並行處理，失敗不影響其他資料夾，總進度收斂到 100
#[test]
fn test_scheduler_aggregate_with_mixed_outcomes() {
    let root = tempfile::tempdir().unwrap();
    let out_dir = root.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();

    let mut dirs = Vec::new();
    for (stem, frames) in [("zeta", 3), ("eta", 4), ("theta", 1)] {
        let dir = root.path().join(stem);
        fs::create_dir_all(&dir).unwrap();
        make_frames(&dir, stem, frames);
        dirs.push(dir);
    }

    let ffmpeg_log = root.path().join("ffmpeg.log");
    let apngasm_log = root.path().join("apngasm.log");
    let tools = ToolPaths {
        ffmpeg: stub_ffmpeg(root.path(), &ffmpeg_log),
        ffprobe: stub_ffprobe(root.path(), 320, 240),
        apngasm: stub_apngasm(root.path(), &apngasm_log),
    };
    let settings = test_settings(&out_dir);

    let (tx, rx) = mpsc::channel();
    let scheduler = DirectoryScheduler::new(&settings, &tools);
    let outcomes = scheduler.run(&dirs, &tx);
    drop(tx);

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes.iter().filter(|o| o.result.is_ok()).count(), 2);
    // 回傳順序與輸入順序一致
    assert!(outcomes[2].result.is_err());

    let events: Vec<ProgressEvent> = rx.iter().collect();
    let mut delta_sum = 0u32;
    let mut max_aggregate = 0.0f64;
    let mut finished = 0;
    let mut failed = 0;
    for event in &events {
        match event {
            ProgressEvent::Progress { delta, aggregate, .. } => {
                delta_sum += u32::from(*delta);
                max_aggregate = max_aggregate.max(*aggregate);
            }
            ProgressEvent::Finished { .. } => finished += 1,
            ProgressEvent::Failed { .. } => failed += 1,
        }
    }

    // 每個資料夾各貢獻 100，加權總進度恰好收斂到 100
    assert_eq!(delta_sum, 300);
    assert!((max_aggregate - 100.0).abs() < f64::EPSILON);
    assert_eq!(finished, 2);
    assert_eq!(failed, 1);

    assert!(out_dir.join("zeta.png").exists());
    assert!(out_dir.join("eta.png").exists());
    assert!(!out_dir.join("theta.png").exists());
}
