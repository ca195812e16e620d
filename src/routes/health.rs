//! # 헬스체크(Health Check) 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/health` → `{ "status": "ok", "engines": ["cloud-vision", "tesseract"] }`
//!
//! 엔진을 실제로 호출하지 않으므로 tesseract 워커 초기화를 일으키지 않습니다.

use crate::routes::documents::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// `GET /health` — 서버 상태와 구성된 OCR 엔진 순서를 반환합니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "engines": state.ocr.engine_names(),
    }))
}
