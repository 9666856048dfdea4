use super::error::ConvertError;
use log::info;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 壓縮服務的正式端點；呼叫端以參數注入，測試時可替換
pub const SHRINK_ENDPOINT: &str = "https://api.tinify.com/shrink";

#[derive(Deserialize)]
struct ServiceError {
    error: Option<String>,
    message: Option<String>,
}

/// 透過 Tinify 壓縮服務最佳化 APNG
///
/// 預設覆寫原檔；`overwrite` 為 false 時輸出到同目錄加 `_opt` 字尾的檔案。
/// 驗證、額度或連線錯誤都回報 `OptimizationFailed`，
/// 已組裝完成的檔案保持原樣，不會被刪除
pub fn optimize_apng(
    endpoint: &str,
    src: &Path,
    key: &str,
    overwrite: bool,
) -> Result<PathBuf, ConvertError> {
    info!("以 Tinify 最佳化 {}", src.display());

    let client = Client::builder()
        .build()
        .map_err(|e| ConvertError::OptimizationFailed(format!("無法建立 HTTP 用戶端: {e}")))?;

    let body = std::fs::read(src)?;
    let response = client
        .post(endpoint)
        .basic_auth("api", Some(key))
        .body(body)
        .send()
        .map_err(|e| ConvertError::OptimizationFailed(format!("無法連線至壓縮服務: {e}")))?;

    match response.status() {
        StatusCode::CREATED => {}
        StatusCode::UNAUTHORIZED => {
            return Err(ConvertError::OptimizationFailed(
                "API 金鑰驗證失敗".to_string(),
            ));
        }
        StatusCode::TOO_MANY_REQUESTS => {
            return Err(ConvertError::OptimizationFailed(
                "已達壓縮服務的每月額度上限".to_string(),
            ));
        }
        status => {
            let detail = service_error_message(response);
            return Err(ConvertError::OptimizationFailed(format!(
                "壓縮服務回應 {status}: {detail}"
            )));
        }
    }

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            ConvertError::OptimizationFailed("壓縮服務未回傳下載位置".to_string())
        })?;

    let compressed = client
        .get(&location)
        .basic_auth("api", Some(key))
        .send()
        .and_then(reqwest::blocking::Response::bytes)
        .map_err(|e| ConvertError::OptimizationFailed(format!("無法下載壓縮結果: {e}")))?;

    let dst = if overwrite {
        src.to_path_buf()
    } else {
        optimized_sibling(src)
    };
    std::fs::write(&dst, &compressed)?;

    Ok(dst)
}

/// 不覆寫時的輸出路徑：同目錄、檔名加上 _opt 字尾
fn optimized_sibling(src: &Path) -> PathBuf {
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = src
        .extension()
        .map_or_else(|| "png".to_string(), |e| e.to_string_lossy().to_string());
    src.with_file_name(format!("{stem}_opt.{ext}"))
}

fn service_error_message(response: reqwest::blocking::Response) -> String {
    response
        .json::<ServiceError>()
        .ok()
        .and_then(|e| e.message.or(e.error))
        .unwrap_or_default()
}
