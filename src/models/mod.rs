//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `document`: 문서(Document) 레코드와 요청/응답 구조체
//! - `media`: 업로드 허용 형식
//! - `processing`: 업로드 → 추출 → 완료 처리 상태
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Document`처럼 짧게 접근합니다.

pub mod document;
pub mod media;
pub mod processing;

pub use document::*;
pub use media::*;
pub use processing::*;
