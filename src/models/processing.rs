//! # 처리 상태(Processing State) 모델
//!
//! 업로드 한 건이 "준비 완료"가 되기까지의 상태 기계입니다.
//!
//! ```text
//! Idle → Uploading → Extracting → Ready
//!            │            │
//!            └────────────┴──→ Failed
//! ```
//!
//! `Failed`나 `Ready`에서 새 업로드를 시작하면 이전 사이클은 버리고
//! 다시 `Uploading`부터 시작합니다. 상태는 프로세스 메모리에만 존재합니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Idle,
    Uploading,
    Extracting,
    Ready,
    Failed,
}

impl ProcessingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingState::Idle => "idle",
            ProcessingState::Uploading => "uploading",
            ProcessingState::Extracting => "extracting",
            ProcessingState::Ready => "ready",
            ProcessingState::Failed => "failed",
        }
    }

    /// `self → next` 전이가 허용되는지 확인합니다.
    pub fn can_transition_to(&self, next: ProcessingState) -> bool {
        use ProcessingState::*;
        matches!(
            (self, next),
            (Idle | Failed | Ready, Uploading)
                | (Uploading, Extracting)
                | (Extracting, Ready)
                | (Uploading | Extracting, Failed)
        )
    }
}

impl std::fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid processing transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: ProcessingState,
    pub to: ProcessingState,
}

/// 업로드 → 준비 완료 사이클 하나를 추적합니다.
///
/// 문서 id는 업로드가 접수된 뒤에야 생기므로 `Option`입니다.
#[derive(Debug, Clone)]
pub struct ProcessingTracker {
    state: ProcessingState,
    document_id: Option<i64>,
}

impl Default for ProcessingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingTracker {
    pub fn new() -> Self {
        Self {
            state: ProcessingState::Idle,
            document_id: None,
        }
    }

    pub fn state(&self) -> ProcessingState {
        self.state
    }

    pub fn document_id(&self) -> Option<i64> {
        self.document_id
    }

    fn transition(&mut self, next: ProcessingState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!(
            document_id = ?self.document_id,
            "processing {} -> {}",
            self.state,
            next
        );
        self.state = next;
        Ok(())
    }

    /// 파일 선택/드롭 시점. 이전 사이클의 문서 id는 버립니다.
    pub fn begin_upload(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ProcessingState::Uploading)?;
        self.document_id = None;
        Ok(())
    }

    /// 업로드가 접수되어 문서 id를 받은 시점
    pub fn start_extraction(&mut self, document_id: i64) -> Result<(), InvalidTransition> {
        self.transition(ProcessingState::Extracting)?;
        self.document_id = Some(document_id);
        Ok(())
    }

    /// 추출 결과가 저장된 시점
    pub fn complete(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ProcessingState::Ready)
    }

    pub fn fail(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ProcessingState::Failed)
    }
}
