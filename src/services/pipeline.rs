//! # 추출 파이프라인
//!
//! 업로드 접수 → OCR 추출 → 원문 저장까지의 흐름을 묶습니다.
//!
//! 엔진에 이미 보낸 추출은 중간에 취소하지 않습니다. 추출은 별도 태스크에서
//! 실행되므로 클라이언트가 연결을 끊어도 끝까지 진행되어 결과가 저장됩니다.

use crate::error::AppError;
use crate::models::{Document, MediaKind, ProcessingState, ProcessingTracker};
use crate::routes::documents::AppState;
use crate::services::intake::{accept_upload, IncomingFile};
use axum::body::Bytes;

/// `POST /api/scan` 한 사이클의 결과
#[derive(Debug)]
pub struct ScanOutcome {
    pub document: Document,
    pub state: ProcessingState,
}

/// 이미 등록된 문서에 대해 추출 시도 한 번을 실행하고 결과를 `original_text`에 저장합니다.
///
/// - 문서가 없으면 NotFound, 이미 원문이 있거나 추출이 진행 중이면 Conflict
/// - 모든 엔진이 실패하면 Extraction 에러이며 문서는 바뀌지 않습니다.
pub async fn extract_and_persist(
    state: &AppState,
    document_id: i64,
    payload: Bytes,
    kind: MediaKind,
) -> Result<Document, AppError> {
    let document = state
        .store
        .get(document_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if document.original_text.is_some() {
        return Err(AppError::Conflict(
            "Text has already been extracted for this document".to_string(),
        ));
    }

    let guard = state.board.begin_extraction(document_id)?;
    let store = state.store.clone();
    let ocr = state.ocr.clone();

    let task = tokio::spawn(async move {
        let result = async {
            let text = ocr.extract(&payload, kind).await?;
            store
                .attach_original_text(document_id, &text)
                .await?
                .ok_or(AppError::NotFound)
        }
        .await;

        match &result {
            Ok(_) => guard.complete(),
            Err(_) => guard.fail(),
        }
        result
    });

    task.await
        .map_err(|e| AppError::Internal(format!("extraction task failed: {e}")))?
}

/// 업로드 한 건을 접수부터 준비 완료까지 한 번에 처리합니다.
pub async fn scan_upload(state: &AppState, file: IncomingFile) -> Result<ScanOutcome, AppError> {
    let mut tracker = ProcessingTracker::new();
    tracker.begin_upload()?;

    let staged = match accept_upload(state.store.as_ref(), &state.uploads_path, &file).await {
        Ok(staged) => staged,
        Err(e) => {
            tracker.fail()?;
            return Err(e);
        }
    };

    tracker.start_extraction(staged.receipt.document_id)?;

    match extract_and_persist(state, staged.receipt.document_id, file.bytes, staged.kind).await {
        Ok(document) => {
            tracker.complete()?;
            Ok(ScanOutcome {
                document,
                state: tracker.state(),
            })
        }
        Err(e) => {
            tracker.fail()?;
            Err(e)
        }
    }
}
