//! # 문서(Document) 모델
//!
//! 업로드된 파일 하나에 대응하는 레코드입니다.
//! OCR로 추출한 원문(`original_text`)과 사용자가 편집한 텍스트(`edited_text`)를
//! 따로 보관합니다.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 문서 엔티티 — DB의 `documents` 테이블 한 행에 대응합니다.
///
/// JSON으로는 camelCase(`fileName`, `originalText` ...)로 직렬화됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// 저장소가 생성 시 단조 증가로 부여하는 식별자. 재사용되지 않습니다.
    pub id: i64,
    /// 업로드된 원본 파일 이름 (생성 후 불변)
    pub file_name: String,
    /// 업로드 디렉토리 안에 스테이징된 원본 파일 이름. 응답에는 노출하지 않습니다.
    #[serde(skip)]
    pub staged_name: Option<String>,
    /// OCR 결과. 추출 성공 시 딱 한 번 기록되고 이후 덮어쓰지 않습니다.
    pub original_text: Option<String>,
    /// 사용자가 편집한 텍스트. 여러 번 덮어쓸 수 있습니다.
    pub edited_text: Option<String>,
    /// 다중 사용자 지원용 자리. 인증이 없으므로 현재는 항상 None
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// 화면에 보여줄 내용: 편집본 → 원문 → 빈 문자열 순서로 선택합니다.
    pub fn displayed_content(&self) -> &str {
        self.edited_text
            .as_deref()
            .or(self.original_text.as_deref())
            .unwrap_or("")
    }
}

/// `updated_at`의 다음 값을 계산합니다.
///
/// 같은 밀리초 안에 두 번 수정되어도 값이 엄격하게 증가하도록,
/// 현재 시각이 이전 값보다 크지 않으면 이전 값에 1ms를 더합니다.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// `list` 조회 범위
///
/// 인증이 없으므로 라우트는 항상 `All`을 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
    /// 모든 문서 (소유자 구분 없음)
    All,
    /// 특정 소유자의 문서만
    Owner(i64),
}

/// `POST /api/upload` 응답 — 업로드 접수 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub document_id: i64,
    pub file_name: String,
    /// 원본 바이트가 스테이징된 경로. 추출 요청 시 그대로 돌려보냅니다.
    pub file_path: String,
}

/// `POST /api/documents/:id/ocr` 요청 본문
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOcrTextRequest {
    pub extracted_text: Option<String>,
}

/// `PUT /api/documents/:id` 요청 본문
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub edited_text: Option<String>,
}

/// `POST /api/documents/:id/extract` 요청 본문
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub file_path: Option<String>,
}

/// `GET /api/documents/:id/content` 응답
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    pub content: String,
    pub word_count: usize,
    pub char_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(original: Option<&str>, edited: Option<&str>) -> Document {
        let now = Utc::now();
        Document {
            id: 1,
            file_name: "scan.png".to_string(),
            staged_name: Some("0190.png".to_string()),
            original_text: original.map(str::to_string),
            edited_text: edited.map(str::to_string),
            owner_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn displayed_content_prefers_edited_text() {
        assert_eq!(doc(Some("ocr"), Some("edited")).displayed_content(), "edited");
        assert_eq!(doc(Some("ocr"), None).displayed_content(), "ocr");
        assert_eq!(doc(None, None).displayed_content(), "");
    }

    #[test]
    fn next_timestamp_is_strictly_greater() {
        let future = Utc::now() + Duration::seconds(60);
        let next = next_timestamp(future);
        assert!(next > future);
        assert_eq!(next - future, Duration::milliseconds(1));
    }

    #[test]
    fn document_serializes_camel_case() {
        let value = serde_json::to_value(doc(Some("a"), None)).unwrap();
        assert_eq!(value["fileName"], "scan.png");
        assert_eq!(value["originalText"], "a");
        assert!(value["editedText"].is_null());
        assert!(value["ownerId"].is_null());
    }
}
