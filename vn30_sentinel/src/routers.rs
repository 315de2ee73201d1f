use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::errors::{Result, SentinelError};
use crate::models::{AnalysisResult, MarketOverview, RunState};
use crate::AppState;

#[derive(Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub tickers: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub run: RunState,
    pub progress_percent: f64,
    pub results_count: usize,
    pub available_endpoints: Vec<String>,
}

#[derive(Serialize)]
pub struct ResultsResponse {
    pub run: RunState,
    pub progress_percent: f64,
    pub results: Vec<AnalysisResult>,
    pub overview: MarketOverview,
}

fn ticker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]{1,10}$").expect("ticker pattern is valid"))
}

/// Приводит тикеры к верхнему регистру, отбрасывает пустые, проверяет формат и лимит.
/// Порядок и повторы сохраняются.
pub fn normalize_tickers(raw: &[String], max_tickers: usize) -> Result<Vec<String>> {
    let tickers: Vec<String> = raw
        .iter()
        .map(|ticker| ticker.trim().to_uppercase())
        .filter(|ticker| !ticker.is_empty())
        .collect();

    if let Some(invalid) = tickers.iter().find(|ticker| !ticker_pattern().is_match(ticker)) {
        return Err(SentinelError::InvalidRequest(format!(
            "Некорректный тикер: {}",
            invalid
        )));
    }

    if tickers.len() > max_tickers {
        return Err(SentinelError::InvalidRequest(format!(
            "Слишком много тикеров: {} (максимум {})",
            tickers.len(),
            max_tickers
        )));
    }

    Ok(tickers)
}

// Запуск анализа списка тикеров в фоне
pub async fn start_analysis(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> std::result::Result<(StatusCode, Json<Value>), StatusCode> {
    let tickers = normalize_tickers(&req.tickers, state.config.max_tickers()).map_err(|e| {
        tracing::warn!("{}", e);
        StatusCode::BAD_REQUEST
    })?;

    if tickers.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(json!({
                "status": "idle",
                "message": "Список тикеров пуст, анализ не запускался"
            })),
        ));
    }

    if let Err(e) = state.results.begin(tickers.len()).await {
        tracing::warn!("{}", e);
        return Err(StatusCode::CONFLICT);
    }

    tracing::info!("Запускаем анализ: {}", tickers.join(", "));

    let events = state.orchestrator.spawn(tickers.clone());
    let holder = state.results.clone();
    tokio::spawn(async move {
        if let Err(e) = holder.consume(events).await {
            tracing::error!("Ошибка сохранения результатов: {}", e);
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "running",
            "total": tickers.len(),
            "tickers": tickers
        })),
    ))
}

// Текущие (в том числе частичные) результаты прогона
pub async fn get_results(
    State(state): State<AppState>,
) -> std::result::Result<Json<ResultsResponse>, StatusCode> {
    let snapshot = state.results.snapshot().await.map_err(|e| {
        tracing::error!("Ошибка чтения результатов: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(ResultsResponse {
        run: snapshot.run,
        progress_percent: snapshot.progress_percent,
        overview: MarketOverview::from_results(&snapshot.results),
        results: snapshot.results,
    }))
}

// Синхронный анализ одного тикера
pub async fn analyze_single(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> std::result::Result<Json<AnalysisResult>, StatusCode> {
    let tickers = normalize_tickers(&[ticker], 1).map_err(|e| {
        tracing::warn!("{}", e);
        StatusCode::BAD_REQUEST
    })?;
    let ticker = tickers.first().ok_or(StatusCode::BAD_REQUEST)?;

    Ok(Json(state.orchestrator.analyze_ticker(ticker).await))
}

// Проверка здоровья сервиса
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "VN30 Sentinel API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Получение статуса сервиса
pub async fn get_status(
    State(state): State<AppState>,
) -> std::result::Result<Json<StatusResponse>, StatusCode> {
    let snapshot = state.results.snapshot().await.map_err(|e| {
        tracing::error!("Ошибка чтения статуса: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(StatusResponse {
        run: snapshot.run,
        progress_percent: snapshot.progress_percent,
        results_count: snapshot.results.len(),
        available_endpoints: vec![
            "/".to_string(),
            "/status".to_string(),
            "/api/analysis".to_string(),
            "/api/analysis/:ticker".to_string(),
            "/api/results".to_string(),
        ],
    }))
}

// Создание маршрутов
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/status", get(get_status))
        .route("/api/analysis", post(start_analysis))
        .route("/api/analysis/:ticker", post(analyze_single))
        .route("/api/results", get(get_results))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize_keeps_order_and_duplicates() {
        let tickers = normalize_tickers(&owned(&[" fpt", "VNM", "", "fpt "]), 30).unwrap();
        assert_eq!(tickers, vec!["FPT", "VNM", "FPT"]);
    }

    #[test]
    fn test_normalize_rejects_bad_input() {
        assert!(normalize_tickers(&owned(&["FPT; DROP"]), 30).is_err());
        assert!(normalize_tickers(&owned(&["FPT", "VNM"]), 1).is_err());
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_tickers(&owned(&["  "]), 30).unwrap().is_empty());
    }
}
