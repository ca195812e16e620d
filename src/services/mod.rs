//! # 서비스 계층
//!
//! 라우트 핸들러와 저장소/OCR 사이의 처리 흐름을 담당합니다.
//!
//! - `intake`: 업로드 검증과 원본 스테이징, 문서 레코드 생성
//! - `board`: 문서별 처리 상태 게시판 (같은 문서의 동시 작업 차단)
//! - `pipeline`: 추출 → 저장 사이클 실행
//! - `text`: 편집기 통계(단어 수, 문자 수)

pub mod board;
pub mod intake;
pub mod pipeline;
pub mod text;

pub use board::*;
pub use intake::*;
pub use pipeline::*;
pub use text::*;
