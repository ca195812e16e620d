//! # 문서 저장소 (Document Store)
//!
//! 문서 레코드를 보관하는 계층입니다. 라우트 핸들러와 서비스는
//! `DocumentStore` 트레이트만 보고 동작하므로 저장 방식과 무관합니다.
//!
//! 구현체:
//! - `sqlite`: sqlx + SQLite (영구 저장)
//! - `memory`: 프로세스 메모리 (DATABASE_URL이 없을 때, 그리고 테스트용)
//!
//! 모든 연산은 전부 반영되거나 전혀 반영되지 않습니다(부분 쓰기 없음).
//! 수정은 버전 검사 없는 last-write-wins이므로, 같은 문서에 대한 동시 쓰기는
//! 상위 계층(`services::board`)에서 직렬화합니다.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

use crate::error::AppError;
use crate::models::{Document, OwnerScope};
use async_trait::async_trait;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 두 텍스트 필드가 비어 있는 새 문서를 만듭니다.
    ///
    /// `staged_name`은 업로드 디렉토리 안의 원본 파일 이름입니다.
    async fn create(&self, file_name: &str, staged_name: &str) -> Result<Document, AppError>;

    /// `Ok(None)`: 해당 id의 문서가 없음
    async fn get(&self, id: i64) -> Result<Option<Document>, AppError>;

    /// OCR 결과를 `original_text`에 기록합니다 (한 번만 가능).
    ///
    /// - `Ok(None)`: 문서 없음
    /// - `Err(AppError::Conflict)`: 이미 원문이 기록되어 있음
    async fn attach_original_text(&self, id: i64, text: &str) -> Result<Option<Document>, AppError>;

    /// `edited_text`를 덮어쓰고 `updated_at`을 갱신합니다.
    /// 없는 id면 새로 만들지 않고 `Ok(None)`을 반환합니다.
    async fn update_text(&self, id: i64, edited_text: &str) -> Result<Option<Document>, AppError>;

    /// 생성 순서(id 오름차순)로 문서 목록을 반환합니다.
    async fn list(&self, scope: OwnerScope) -> Result<Vec<Document>, AppError>;
}

/// 두 구현체가 같은 계약을 지키는지 확인하는 공용 테스트
#[cfg(test)]
pub(crate) mod contract {
    use super::*;

    pub async fn create_assigns_increasing_ids(store: &dyn DocumentStore) {
        let first = store.create("a.png", "a.png").await.unwrap();
        let second = store.create("b.jpg", "b.jpg").await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.file_name, "a.png");
        assert_eq!(first.staged_name.as_deref(), Some("a.png"));
        assert!(first.original_text.is_none());
        assert!(first.edited_text.is_none());
        assert!(first.owner_id.is_none());
        assert!(first.created_at <= first.updated_at);
    }

    pub async fn get_missing_is_none(store: &dyn DocumentStore) {
        assert!(store.get(999).await.unwrap().is_none());
    }

    pub async fn original_text_is_write_once(store: &dyn DocumentStore) {
        let doc = store.create("receipt.png", "receipt.png").await.unwrap();
        let updated = store
            .attach_original_text(doc.id, "Hello World")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.original_text.as_deref(), Some("Hello World"));
        assert!(updated.edited_text.is_none());
        assert!(updated.updated_at > doc.updated_at);

        let err = store.attach_original_text(doc.id, "stale").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.original_text.as_deref(), Some("Hello World"));

        assert!(store.attach_original_text(999, "x").await.unwrap().is_none());
    }

    pub async fn update_text_is_last_write_wins(store: &dyn DocumentStore) {
        let doc = store.create("memo.png", "memo.png").await.unwrap();
        let first = store.update_text(doc.id, "first").await.unwrap().unwrap();
        let second = store.update_text(doc.id, "second").await.unwrap().unwrap();

        assert!(first.updated_at > doc.updated_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.created_at, doc.created_at);

        let stored = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(stored.edited_text.as_deref(), Some("second"));
        assert_eq!(stored.updated_at, second.updated_at);
        assert_eq!(stored.file_name, "memo.png");
    }

    pub async fn update_missing_creates_nothing(store: &dyn DocumentStore) {
        let before = store.list(OwnerScope::All).await.unwrap().len();
        assert!(store.update_text(999, "x").await.unwrap().is_none());
        assert_eq!(store.list(OwnerScope::All).await.unwrap().len(), before);
    }

    pub async fn list_is_creation_ordered(store: &dyn DocumentStore) {
        let a = store.create("1.png", "1.png").await.unwrap();
        let b = store.create("2.png", "2.png").await.unwrap();
        let c = store.create("3.pdf", "3.pdf").await.unwrap();
        store.update_text(a.id, "touch").await.unwrap();

        let ids: Vec<i64> = store
            .list(OwnerScope::All)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);

        // 소유자가 있는 문서는 아직 없습니다.
        assert!(store.list(OwnerScope::Owner(1)).await.unwrap().is_empty());
    }
}
