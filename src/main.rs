//! # Scanpad 웹 서버 진입점
//!
//! 스캔한 이미지/PDF를 받아 OCR로 텍스트를 추출하고, 원문과 편집본을 문서로 보관하는 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 문서 저장소 선택 (SQLite 또는 메모리)
//! 4. 업로드 디렉토리 생성
//! 5. OCR 엔진 체인 구성 (Cloud Vision → tesseract)
//! 6. API 라우터 설정
//! 7. HTTP 서버 시작, Ctrl+C를 받으면 OCR 워커를 정리하고 종료

mod config;
mod db;
mod error;
mod models;
mod ocr;
mod routes;
mod services;

use anyhow::Result;
use config::Config;
use db::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore};
use ocr::OcrOrchestrator;
use routes::documents::AppState;
use services::ProcessingBoard;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 scanpad, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scanpad=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Scanpad server on {}:{}", config.host, config.port);

    // ── 4단계: 문서 저장소 선택 ──
    // DATABASE_URL이 있으면 SQLite, 없으면 프로세스 메모리에 보관합니다.
    let store: Arc<dyn DocumentStore> = match &config.database_url {
        Some(url) => {
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(url)
                .await?;

            let store = SqliteDocumentStore::new(pool);
            tracing::info!("Running database migrations...");
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set; documents are kept in memory only");
            Arc::new(MemoryDocumentStore::new())
        }
    };

    // ── 5단계: 업로드 디렉토리 생성 ──
    let uploads_path = PathBuf::from(&config.uploads_path);
    if !uploads_path.exists() {
        tokio::fs::create_dir_all(&uploads_path).await?;
        tracing::info!("Created uploads directory: {}", config.uploads_path);
    }

    // ── 6단계: OCR 엔진 체인 ──
    // tesseract 워커는 첫 추출 요청 때 만들어집니다.
    let ocr = Arc::new(OcrOrchestrator::from_config(&config)?);
    tracing::info!("OCR engines: {}", ocr.engine_names().join(" → "));

    let state = AppState {
        store,
        ocr: ocr.clone(),
        board: ProcessingBoard::new(),
        uploads_path,
    };

    // ── 7단계: 라우터와 미들웨어 ──
    // 개발 환경 기준으로 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::api_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // ── 8단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // 서버가 멈춘 뒤 tesseract 워커 같은 장기 자원을 정리합니다.
    ocr.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Ctrl+C를 기다립니다. 시그널 핸들러 설치에 실패하면 바로 종료 절차로 넘어갑니다.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
