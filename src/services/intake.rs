//! # 업로드 접수(Upload Intake)
//!
//! 들어온 파일을 검증하고, 원본 바이트를 업로드 디렉토리에 스테이징한 뒤,
//! 문서 레코드를 하나 만듭니다.
//!
//! ## 처리 순서
//! ```text
//! 1. 형식 검사 (png / jpeg / pdf)      ── 실패 → Validation (아무것도 만들지 않음)
//! 2. 크기 검사 (10 MiB 이하)            ── 실패 → Validation (아무것도 만들지 않음)
//! 3. 원본을 <uploads>/<uuid>.<ext>로 저장
//! 4. 문서 레코드 생성 (두 텍스트 필드는 NULL) ── 실패 시 3의 파일을 지웁니다.
//! ```

use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{Document, MediaKind, UploadReceipt};
use axum::body::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 업로드 크기 상한 (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 전송 계층(multipart)에서 꺼낸 파일 하나
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    /// 클라이언트가 선언한 Content-Type
    pub content_type: String,
    pub bytes: Bytes,
}

/// 접수 결과. `receipt`는 그대로 클라이언트에 응답합니다.
#[derive(Debug, Clone)]
pub struct StagedUpload {
    pub receipt: UploadReceipt,
    pub kind: MediaKind,
    pub path: PathBuf,
}

/// 형식과 크기를 검사합니다. 상태를 바꾸기 전에 호출해야 합니다.
pub fn validate_upload(content_type: &str, size: usize) -> Result<MediaKind, AppError> {
    let kind = MediaKind::from_mime(content_type).ok_or_else(|| {
        AppError::Validation(
            "Invalid file type. Only PNG, JPEG, and PDF files are allowed.".to_string(),
        )
    })?;

    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File is too large. The maximum size is 10 MB.".to_string(),
        ));
    }

    Ok(kind)
}

/// 파일을 접수하고 문서 레코드를 만듭니다.
///
/// 성공 시 레코드가 정확히 하나 생기고, 거부되면 하나도 생기지 않습니다.
pub async fn accept_upload(
    store: &dyn DocumentStore,
    uploads_path: &Path,
    file: &IncomingFile,
) -> Result<StagedUpload, AppError> {
    let kind = validate_upload(&file.content_type, file.bytes.len())?;

    let file_name = display_name(&file.file_name, kind);
    let staged_name = format!("{}.{}", uuid::Uuid::now_v7(), kind.extension());
    let staged_path = uploads_path.join(&staged_name);

    fs::create_dir_all(uploads_path).await?;
    fs::write(&staged_path, &file.bytes).await?;

    let document = match store.create(&file_name, &staged_name).await {
        Ok(doc) => doc,
        Err(e) => {
            // 레코드가 없으면 스테이징 파일도 남기지 않습니다.
            if let Err(cleanup) = fs::remove_file(&staged_path).await {
                tracing::warn!(
                    path = %staged_path.display(),
                    error = %cleanup,
                    "failed to remove staged upload"
                );
            }
            return Err(e);
        }
    };

    tracing::info!(
        document_id = document.id,
        file_name = %document.file_name,
        bytes = file.bytes.len(),
        "upload accepted"
    );

    Ok(StagedUpload {
        receipt: UploadReceipt {
            document_id: document.id,
            file_name: document.file_name,
            file_path: staged_path.to_string_lossy().into_owned(),
        },
        kind,
        path: staged_path,
    })
}

/// 업로드 응답의 `filePath`를 업로드 디렉토리 안의 실제 경로로 되돌립니다.
///
/// 마지막 경로 구성요소(파일 이름)만 사용하므로 `../` 같은 경로로 디렉토리를 벗어날 수 없습니다.
/// 그 이름이 문서에 기록된 스테이징 파일과 다르면 거부합니다.
pub fn resolve_staged_path(
    uploads_path: &Path,
    document: &Document,
    file_path: &str,
) -> Result<(PathBuf, MediaKind), AppError> {
    let invalid = || AppError::BadRequest("Invalid file path".to_string());

    let name = Path::new(file_path).file_name().ok_or_else(invalid)?;
    if document.staged_name.as_deref().map(std::ffi::OsStr::new) != Some(name) {
        return Err(AppError::BadRequest(
            "File path does not belong to this document".to_string(),
        ));
    }
    let kind = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(MediaKind::from_extension)
        .ok_or_else(invalid)?;

    Ok((uploads_path.join(name), kind))
}

/// 스테이징된 원본을 읽습니다. 파일이 없으면 NotFound
pub async fn read_staged(path: &Path) -> Result<Bytes, AppError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Bytes::from(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound),
        Err(e) => Err(e.into()),
    }
}

/// 원본 파일 이름에서 디렉토리 부분을 떼어냅니다. 비어 있으면 `upload.<ext>`
fn display_name(raw: &str, kind: MediaKind) -> String {
    // 브라우저에 따라 "C:\\fakepath\\scan.png" 같은 경로가 올 수 있습니다.
    let base = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() {
        format!("upload.{}", kind.extension())
    } else {
        base.to_string()
    }
}
