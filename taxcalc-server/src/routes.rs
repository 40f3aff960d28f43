//! JSON binding of the tax service.

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Serialize;
use tracing::debug;

use taxcalc::core::calculator::Assessment;
use taxcalc::core::schedule::{self, BracketRow};
use taxcalc::facade::{CalculateRequest, CalculateResponse, OPERATION_NAME};

use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(&format!("/{OPERATION_NAME}"), post(calculate))
        .route("/assess", post(assess_income))
        .route("/brackets", get(list_brackets))
}

/// Error body returned by the JSON binding.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            code: "BAD_REQUEST",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

/// POST /api/calculatePersonalIncomeTax - `{"grossIncome": f64}` to `{"tax": f64}`.
async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<CalculateResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.service.handle(request);
    debug!(gross_income = request.gross_income, tax = response.tax, "json call");
    Ok(Json(response))
}

/// POST /api/assess - full per-bracket breakdown.
async fn assess_income(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<Assessment>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.service.assess(request.gross_income)))
}

/// GET /api/brackets - the fixed schedule, lowest bracket first.
async fn list_brackets() -> Json<Vec<BracketRow>> {
    Json(schedule::rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use taxcalc::core::calculator::assess;
    use taxcalc::facade::TaxService;
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    struct FlatService;

    impl TaxService for FlatService {
        fn calculate_personal_income_tax(&self, _gross_income: f64) -> f64 {
            42.0
        }

        fn assess(&self, gross_income: f64) -> Assessment {
            Assessment {
                tax: 42.0,
                charges: Vec::new(),
                ..assess(gross_income)
            }
        }
    }

    fn app() -> Router {
        Router::new()
            .nest("/api", api_router())
            .with_state(AppState::new(ServerConfig::default()))
    }

    fn flat_app() -> Router {
        Router::new()
            .nest("/api", api_router())
            .with_state(AppState::with_service(
                ServerConfig::default(),
                Arc::new(FlatService),
            ))
    }

    async fn post_json(uri: &str, body: &str) -> (StatusCode, Value) {
        post_json_to(app(), uri, body).await
    }

    async fn post_json_to(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn calculate_returns_tax() {
        let (status, json) =
            post_json("/api/calculatePersonalIncomeTax", r#"{"grossIncome": 10000}"#).await;
        assert_eq!(status, StatusCode::OK);
        let tax = json["tax"].as_f64().expect("tax");
        assert!((tax - 190.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn calculate_below_threshold_is_zero() {
        let (status, json) =
            post_json("/api/calculatePersonalIncomeTax", r#"{"grossIncome": -10}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tax"].as_f64(), Some(0.0));
    }

    #[tokio::test]
    async fn calculate_rejects_missing_field() {
        let (status, json) =
            post_json("/api/calculatePersonalIncomeTax", r#"{"income": 10000}"#).await;
        assert!(status.is_client_error());
        assert_eq!(json["code"], "BAD_REQUEST");
        assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn calculate_rejects_malformed_json() {
        let (status, json) = post_json("/api/calculatePersonalIncomeTax", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn assess_returns_breakdown() {
        let (status, json) = post_json("/api/assess", r#"{"grossIncome": 100000}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["charges"].as_array().map(Vec::len), Some(7));
        let tax = json["tax"].as_f64().expect("tax");
        assert!((tax - 23_090.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn brackets_lists_schedule() {
        let request = Request::builder()
            .uri("/api/brackets")
            .body(Body::empty())
            .expect("request");
        let response = app().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let rows: Vec<Value> = serde_json::from_slice(&body).expect("json");
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[1]["lower"].as_f64(), Some(3000.0));
        assert!(rows[6]["upper"].is_null());
        let expected = serde_json::to_value(schedule::rows()).expect("rows");
        assert_eq!(Value::Array(rows), expected);
    }

    #[tokio::test]
    async fn calculate_delegates_to_configured_service() {
        let (status, json) = post_json_to(
            flat_app(),
            "/api/calculatePersonalIncomeTax",
            r#"{"grossIncome": 1}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tax"].as_f64(), Some(42.0));
    }

    #[tokio::test]
    async fn assess_delegates_to_configured_service() {
        let (status, json) =
            post_json_to(flat_app(), "/api/assess", r#"{"grossIncome": 100000}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tax"].as_f64(), Some(42.0));
        assert_eq!(json["charges"].as_array().map(Vec::len), Some(0));
    }
}
