//! # 업로드 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST /api/upload` → 파일 접수만 (201, `{ documentId, fileName, filePath }`)
//! - `POST /api/scan`   → 접수 + 서버 측 추출 + 저장 (201, `{ document, state }`)
//!
//! 두 엔드포인트 모두 multipart 본문의 `file` 필드를 읽습니다.

use crate::{
    error::AppError,
    models::UploadReceipt,
    routes::documents::AppState,
    services::{self, IncomingFile},
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `POST /upload` — 파일을 검증하고 스테이징한 뒤 문서 레코드를 만듭니다.
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadReceipt>), AppError> {
    let file = read_file_field(multipart).await?;
    let staged =
        services::accept_upload(state.store.as_ref(), &state.uploads_path, &file).await?;
    Ok((StatusCode::CREATED, Json(staged.receipt)))
}

/// `POST /scan` — 업로드부터 추출 결과 저장까지 한 번에 처리합니다.
pub async fn scan_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let file = read_file_field(multipart).await?;
    let outcome = services::scan_upload(&state, file).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "document": outcome.document,
            "state": outcome.state,
        })),
    ))
}

/// multipart 본문에서 `file` 필드 하나를 꺼냅니다. 다른 필드는 무시합니다.
async fn read_file_field(mut multipart: Multipart) -> Result<IncomingFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(IncomingFile {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

/// 본문 크기 제한 초과는 사용자가 고칠 수 있는 검증 에러, 나머지는 전송 에러
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation("File is too large. The maximum size is 10 MB.".to_string())
    } else {
        AppError::Transport(e.body_text())
    }
}
