use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::document::Capitolato;
use crate::engine::designer::design_system;
use crate::engine::error::DesignError;
use crate::models::design::{
    AnalysisResult, AnalyzeRequest, DesignRequest, HealthStatus, SystemDesign,
};
use crate::services::{analysis, narrative_service};
use crate::shared_state::AppState;

/// Map a pipeline failure to an HTTP response carrying the structured error
/// kind so the client can tell "bad request" from "collaborator down" and
/// "sized but not economically justified".
fn error_response(err: &DesignError) -> Response {
    let status = match err {
        DesignError::ExternalDataUnavailable { .. } => StatusCode::BAD_GATEWAY,
        DesignError::InvalidInput { .. }
        | DesignError::InsufficientRoofArea { .. }
        | DesignError::Economics(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (
        status,
        Json(serde_json::json!({
            "error": err.kind(),
            "message": err.to_string(),
        })),
    )
        .into_response()
}

async fn run_design(state: &AppState, request: &DesignRequest) -> Result<SystemDesign, DesignError> {
    let analysis = analysis::analyze_site(&request.address, &state.config).await?;
    design_system(
        analysis.site,
        analysis.solar,
        request,
        &state.catalog,
        &state.config.engine,
    )
}

/// GET /api/health
///
/// Liveness probe plus catalog snapshot counters.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthStatus)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        modules_in_catalog: state.catalog.modules().len(),
        inverters_in_catalog: state.catalog.inverters().len(),
    })
}

/// POST /api/analyze
///
/// Geocode an Italian address and fetch its solar resource; no sizing yet.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Site and solar facts", body = AnalysisResult),
        (status = 502, description = "Geocoding or solar data unavailable")
    )
)]
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    match analysis::analyze_site(&request.address, &state.config).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/design
///
/// Full pipeline: analyze the address, then size the system and run the
/// economic model against the product catalog.
#[utoipa::path(
    post,
    path = "/api/design",
    request_body = DesignRequest,
    responses(
        (status = 200, description = "Complete system design", body = SystemDesign),
        (status = 422, description = "Invalid input, roof too small or uneconomic system"),
        (status = 502, description = "Geocoding or solar data unavailable")
    )
)]
pub async fn create_design(
    State(state): State<AppState>,
    Json(request): Json<DesignRequest>,
) -> impl IntoResponse {
    match run_design(&state, &request).await {
        Ok(design) => Json(design).into_response(),
        Err(e) => {
            tracing::warn!("progetto non generato: {e}");
            error_response(&e)
        }
    }
}

/// POST /api/document
///
/// Design the system and assemble the capitolato; narrative prose is merged
/// in when an Anthropic API key is configured.
#[utoipa::path(
    post,
    path = "/api/document",
    request_body = DesignRequest,
    responses(
        (status = 200, description = "Assembled technical document", body = Capitolato),
        (status = 422, description = "Invalid input, roof too small or uneconomic system"),
        (status = 502, description = "Geocoding or solar data unavailable")
    )
)]
pub async fn generate_document(
    State(state): State<AppState>,
    Json(request): Json<DesignRequest>,
) -> impl IntoResponse {
    match run_design(&state, &request).await {
        Ok(design) => {
            let narrative =
                narrative_service::generate_narrative(&design, &state.config.narrative).await;
            Json(Capitolato::from_design(&design, narrative.as_ref())).into_response()
        }
        Err(e) => error_response(&e),
    }
}
