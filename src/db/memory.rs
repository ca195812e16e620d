//! # 메모리 문서 저장소
//!
//! `DATABASE_URL`이 없을 때 쓰는 `DocumentStore` 구현입니다.
//! 프로세스가 종료되면 내용이 사라집니다.

use super::DocumentStore;
use crate::error::AppError;
use crate::models::{next_timestamp, Document, OwnerScope};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Inner {
    /// 다음에 부여할 id. 감소하지 않으므로 id는 재사용되지 않습니다.
    next_id: i64,
    /// BTreeMap: id 오름차순 = 생성 순서
    documents: BTreeMap<i64, Document>,
}

#[derive(Debug)]
pub struct MemoryDocumentStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_id: 1,
                documents: BTreeMap::new(),
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn create(&self, file_name: &str, staged_name: &str) -> Result<Document, AppError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = Utc::now();
        let doc = Document {
            id,
            file_name: file_name.to_string(),
            staged_name: Some(staged_name.to_string()),
            original_text: None,
            edited_text: None,
            owner_id: None,
            created_at: now,
            updated_at: now,
        };
        inner.documents.insert(id, doc.clone());
        Ok(doc)
    }

    async fn get(&self, id: i64) -> Result<Option<Document>, AppError> {
        Ok(self.inner.read().await.documents.get(&id).cloned())
    }

    async fn attach_original_text(
        &self,
        id: i64,
        text: &str,
    ) -> Result<Option<Document>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(doc) = inner.documents.get_mut(&id) else {
            return Ok(None);
        };
        if doc.original_text.is_some() {
            return Err(AppError::Conflict(
                "Text has already been extracted for this document".to_string(),
            ));
        }

        doc.original_text = Some(text.to_string());
        doc.updated_at = next_timestamp(doc.updated_at);
        Ok(Some(doc.clone()))
    }

    async fn update_text(&self, id: i64, edited_text: &str) -> Result<Option<Document>, AppError> {
        let mut inner = self.inner.write().await;
        let Some(doc) = inner.documents.get_mut(&id) else {
            return Ok(None);
        };

        doc.edited_text = Some(edited_text.to_string());
        doc.updated_at = next_timestamp(doc.updated_at);
        Ok(Some(doc.clone()))
    }

    async fn list(&self, scope: OwnerScope) -> Result<Vec<Document>, AppError> {
        let inner = self.inner.read().await;
        let docs = inner
            .documents
            .values()
            .filter(|doc| match scope {
                OwnerScope::All => true,
                OwnerScope::Owner(owner_id) => doc.owner_id == Some(owner_id),
            })
            .cloned()
            .collect();
        Ok(docs)
    }
}
