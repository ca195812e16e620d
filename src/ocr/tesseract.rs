//! 로컬 tesseract 엔진 (2차 엔진)
//!
//! 첫 사용 시 워커를 한 번 만들어(`LazyWorker`) 이후 호출에서 재사용합니다.
//! 워커 생성은 실행 파일이 동작하는지, 설정된 언어(`eng+nep` 등)가 모두 설치되어
//! 있는지 확인하는 단계입니다. 인식은 `tesseract stdin stdout -l <langs>`로
//! 원본 바이트를 표준 입력으로 넘깁니다.

use super::lazy::LazyWorker;
use super::{EngineError, OcrEngine};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// 초기화가 끝난 tesseract 워커
#[derive(Debug)]
pub struct TesseractWorker {
    command: String,
    languages: String,
}

impl TesseractWorker {
    /// 실행 파일과 언어 데이터를 확인하고 워커를 만듭니다.
    pub async fn spawn(command: &str, languages: &str) -> Result<Self, EngineError> {
        tracing::info!(command, languages, "initializing tesseract worker");

        let output = Command::new(command)
            .arg("--list-langs")
            .stdin(Stdio::null())
            .output()
            .await?;
        if !output.status.success() {
            return Err(EngineError::Recognizer(format!(
                "`{command} --list-langs` exited with {}",
                output.status
            )));
        }

        // 버전에 따라 목록이 stdout 또는 stderr로 나옵니다.
        let listing = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let installed = parse_language_list(&listing);
        let missing: Vec<&str> = languages
            .split('+')
            .filter(|lang| !lang.is_empty() && !installed.iter().any(|i| i == lang))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::NotConfigured(format!(
                "tesseract language data missing: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            command: command.to_string(),
            languages: languages.to_string(),
        })
    }

    pub async fn recognize(&self, image: &[u8]) -> Result<String, EngineError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", &self.languages])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Recognizer("tesseract stdin unavailable".to_string()))?;

        // 입력 쓰기와 출력 읽기를 동시에 진행해야 파이프 버퍼가 차서 멈추지 않습니다.
        let write = async move {
            stdin.write_all(image).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Recognizer(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// `--list-langs` 출력에서 언어 코드 목록을 뽑습니다.
///
/// ```text
/// List of available languages in "/usr/share/tesseract-ocr/5/tessdata/" (3):
/// eng
/// nep
/// osd
/// ```
fn parse_language_list(listing: &str) -> Vec<String> {
    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("List of available languages"))
        .filter(|line| !line.contains(char::is_whitespace))
        .map(str::to_string)
        .collect()
}

/// tesseract 실행 파일을 감싼 `OcrEngine`
pub struct TesseractEngine {
    command: String,
    languages: String,
    worker: LazyWorker<TesseractWorker>,
}

impl TesseractEngine {
    pub fn new(command: &str, languages: &str) -> Self {
        Self {
            command: command.to_string(),
            languages: languages.to_string(),
            worker: LazyWorker::new(),
        }
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(&self, image: &[u8]) -> Result<String, EngineError> {
        let worker = self
            .worker
            .get_or_try_init(|| TesseractWorker::spawn(&self.command, &self.languages))
            .await?;
        worker.recognize(image).await
    }

    async fn shutdown(&self) {
        if self.worker.take().await.is_some() {
            tracing::info!("tesseract worker released");
        }
    }
}
