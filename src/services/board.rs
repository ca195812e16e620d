//! # 처리 상태 게시판
//!
//! 문서 id별 최신 처리 상태를 프로세스 메모리에 보관합니다.
//! 문서 저장소의 수정은 버전 검사 없는 last-write-wins이므로,
//! 같은 문서에 대해 추출이 진행 중일 때는 두 번째 추출이나 편집을 받지 않습니다.

use crate::error::AppError;
use crate::models::ProcessingState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct ProcessingBoard {
    // 잠금 구간에 await가 없으므로 std Mutex로 충분합니다.
    states: Arc<Mutex<HashMap<i64, ProcessingState>>>,
}

impl ProcessingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 게시판에 없는 문서는 `Idle`
    pub fn state(&self, document_id: i64) -> ProcessingState {
        self.lock()
            .get(&document_id)
            .copied()
            .unwrap_or(ProcessingState::Idle)
    }

    /// 추출이 진행 중이면 Conflict
    pub fn ensure_not_extracting(&self, document_id: i64) -> Result<(), AppError> {
        if self.state(document_id) == ProcessingState::Extracting {
            return Err(in_flight());
        }
        Ok(())
    }

    /// 문서를 `Extracting`으로 표시하고 가드를 반환합니다.
    ///
    /// 확인과 표시를 한 번의 잠금 안에서 하므로 동시에 두 추출이 시작될 수 없습니다.
    pub fn begin_extraction(&self, document_id: i64) -> Result<ExtractionGuard, AppError> {
        let mut states = self.lock();
        if states.get(&document_id) == Some(&ProcessingState::Extracting) {
            return Err(in_flight());
        }
        states.insert(document_id, ProcessingState::Extracting);
        tracing::debug!(document_id, "extraction started");

        Ok(ExtractionGuard {
            board: self.clone(),
            document_id,
            finished: false,
        })
    }

    fn set(&self, document_id: i64, state: ProcessingState) {
        self.lock().insert(document_id, state);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<i64, ProcessingState>> {
        // 다른 스레드가 잠금 중 패닉해도 맵 자체는 일관된 상태입니다.
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn in_flight() -> AppError {
    AppError::Conflict("Text extraction is already in progress for this document".to_string())
}

/// 진행 중인 추출 하나. 끝내지 않고 drop되면 `Failed`로 기록합니다.
pub struct ExtractionGuard {
    board: ProcessingBoard,
    document_id: i64,
    finished: bool,
}

impl ExtractionGuard {
    pub fn document_id(&self) -> i64 {
        self.document_id
    }

    pub fn complete(mut self) {
        self.finish(ProcessingState::Ready);
    }

    pub fn fail(mut self) {
        self.finish(ProcessingState::Failed);
    }

    fn finish(&mut self, state: ProcessingState) {
        self.finished = true;
        self.board.set(self.document_id, state);
        tracing::debug!(document_id = self.document_id, "extraction {}", state);
    }
}

impl Drop for ExtractionGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.finish(ProcessingState::Failed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_document_is_idle() {
        assert_eq!(ProcessingBoard::new().state(3), ProcessingState::Idle);
    }

    #[test]
    fn second_extraction_is_rejected_while_first_runs() {
        let board = ProcessingBoard::new();
        let guard = board.begin_extraction(7).unwrap();
        assert_eq!(board.state(7), ProcessingState::Extracting);

        assert!(matches!(board.begin_extraction(7), Err(AppError::Conflict(_))));
        assert!(board.ensure_not_extracting(7).is_err());
        // 다른 문서는 독립적으로 진행됩니다.
        assert!(board.ensure_not_extracting(8).is_ok());

        guard.complete();
        assert_eq!(board.state(7), ProcessingState::Ready);
        assert!(board.ensure_not_extracting(7).is_ok());
    }

    #[test]
    fn failed_extraction_can_be_retried() {
        let board = ProcessingBoard::new();
        board.begin_extraction(1).unwrap().fail();
        assert_eq!(board.state(1), ProcessingState::Failed);

        let retry = board.begin_extraction(1).unwrap();
        assert_eq!(retry.document_id(), 1);
    }

    #[test]
    fn dropped_guard_records_failure() {
        let board = ProcessingBoard::new();
        drop(board.begin_extraction(5).unwrap());
        assert_eq!(board.state(5), ProcessingState::Failed);
    }
}
