//! # SQLite 문서 저장소
//!
//! `documents` 테이블에 대한 쿼리 함수들입니다.
//! 모든 함수는 `async`이며 `SqlitePool`을 통해 데이터베이스와 상호작용합니다.
//!
//! 수정 연산은 "읽고 → 확인하고 → 쓰기"를 하나의 트랜잭션으로 묶어,
//! 레코드가 완전히 반영되거나 전혀 바뀌지 않도록 합니다.

use super::DocumentStore;
use crate::error::AppError;
use crate::models::{next_timestamp, Document, OwnerScope};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};

/// 모든 SELECT에서 같은 컬럼 순서를 쓰기 위한 상수
const DOCUMENT_COLUMNS: &str =
    "id, file_name, staged_name, original_text, edited_text, owner_id, created_at, updated_at";

/// SQLite 기반 `DocumentStore`
///
/// SqlitePool은 내부적으로 Arc를 사용하므로 clone해도 같은 풀을 가리킵니다.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// ./migrations 폴더의 SQL을 컴파일 타임에 포함시켜, 아직 실행되지 않은 것만 실행합니다.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// 트랜잭션 안에서 문서 한 건을 읽습니다.
    async fn fetch_in(
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
    ) -> Result<Option<Document>, AppError> {
        let doc = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"
        ))
        .bind(id)
        // &mut **tx: 트랜잭션을 실행기(Executor)로 빌려줍니다.
        .fetch_optional(&mut **tx)
        .await?;

        Ok(doc)
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn create(&self, file_name: &str, staged_name: &str) -> Result<Document, AppError> {
        let now = Utc::now();

        // 나머지 컬럼(original_text, edited_text, owner_id)은 NULL로 남습니다.
        let result = sqlx::query(
            r#"
            INSERT INTO documents (file_name, staged_name, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(file_name)
        .bind(staged_name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        // AUTOINCREMENT가 부여한 id
        let id = result.last_insert_rowid();

        self.get(id)
            .await?
            .ok_or(AppError::Internal("Failed to retrieve created document".to_string()))
    }

    async fn get(&self, id: i64) -> Result<Option<Document>, AppError> {
        let doc = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?"
        ))
        .bind(id)
        // 결과가 0행이면 None, 1행이면 Some(Document)
        .fetch_optional(&self.pool)
        .await?;

        Ok(doc)
    }

    async fn attach_original_text(
        &self,
        id: i64,
        text: &str,
    ) -> Result<Option<Document>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(mut doc) = Self::fetch_in(&mut tx, id).await? else {
            // 트랜잭션은 drop 시 자동으로 롤백됩니다.
            return Ok(None);
        };
        if doc.original_text.is_some() {
            return Err(AppError::Conflict(
                "Text has already been extracted for this document".to_string(),
            ));
        }

        let updated_at = next_timestamp(doc.updated_at);
        sqlx::query("UPDATE documents SET original_text = ?, updated_at = ? WHERE id = ?")
            .bind(text)
            .bind(updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        doc.original_text = Some(text.to_string());
        doc.updated_at = updated_at;
        Ok(Some(doc))
    }

    async fn update_text(&self, id: i64, edited_text: &str) -> Result<Option<Document>, AppError> {
        let mut tx = self.pool.begin().await?;

        let Some(mut doc) = Self::fetch_in(&mut tx, id).await? else {
            return Ok(None); // 라우트 핸들러에서 404로 변환
        };

        let updated_at = next_timestamp(doc.updated_at);
        sqlx::query("UPDATE documents SET edited_text = ?, updated_at = ? WHERE id = ?")
            .bind(edited_text)
            .bind(updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        doc.edited_text = Some(edited_text.to_string());
        doc.updated_at = updated_at;
        Ok(Some(doc))
    }

    async fn list(&self, scope: OwnerScope) -> Result<Vec<Document>, AppError> {
        let docs = match scope {
            OwnerScope::All => {
                sqlx::query_as::<_, Document>(&format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            OwnerScope::Owner(owner_id) => {
                sqlx::query_as::<_, Document>(&format!(
                    "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE owner_id = ? ORDER BY id"
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(docs)
    }
}
