//! # 텍스트 통계
//!
//! 편집기 하단에 표시하는 단어 수/문자 수를 계산합니다.

/// 텍스트의 단어 수를 계산합니다.
///
/// 공백(스페이스, 탭, 줄바꿈)으로 분리하여 셉니다. 빈 문자열이면 0
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// 텍스트의 문자 수를 계산합니다.
///
/// 유니코드 문자 단위로 셉니다 (데바나가리 결합 문자도 각각 1자).
/// `.len()`은 바이트 수이므로 쓰지 않습니다.
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}
