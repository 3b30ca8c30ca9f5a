use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bizcred_core::domain::proposal::{Proposal, RawProposalRecord};
use bizcred_core::fetch::types::STATUS_SUCCESS;
use bizcred_core::normalize::{normalize, normalize_batch};
use bizcred_core::pipeline::present;
use bizcred_core::select::{Selection, DEFAULT_LATEST_LIMIT, DEFAULT_RISK_THRESHOLD};
use bizcred_core::storage::documents;
use bizcred_core::view::{derive_view_model, ViewModel};

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = bizcred_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();
    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match bizcred_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting API in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let app = router(AppState { pool });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/proposals", get(list_proposals))
        .route("/api/proposals/:id", get(get_proposal))
        .route("/api/proposals/:id/view", get(get_proposal_view))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/selections/risk-below", get(get_risk_below))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    pool: Option<PgPool>,
}

impl AppState {
    fn pool(&self) -> Result<&PgPool, StatusCode> {
        self.pool.as_ref().ok_or(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[derive(Debug, Serialize)]
struct ApiList<T> {
    status: &'static str,
    proposals: Vec<T>,
}

#[derive(Debug, Serialize)]
struct ApiOne<T> {
    status: &'static str,
    proposal: T,
}

#[derive(Debug, Deserialize)]
struct DashboardParams {
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RiskBelowParams {
    threshold: Option<f64>,
}

async fn list_proposals(
    State(state): State<AppState>,
) -> Result<Json<ApiList<Proposal>>, StatusCode> {
    let records = documents::list_documents(state.pool()?)
        .await
        .map_err(internal_error)?;

    Ok(Json(ApiList {
        status: STATUS_SUCCESS,
        proposals: normalize_batch(&records).proposals,
    }))
}

async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiOne<Proposal>>, StatusCode> {
    let proposal = load_proposal(&state, &id).await?;
    Ok(Json(ApiOne {
        status: STATUS_SUCCESS,
        proposal,
    }))
}

async fn get_proposal_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ViewModel>, StatusCode> {
    let proposal = load_proposal(&state, &id).await?;
    Ok(Json(derive_view_model(&proposal)))
}

async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<ApiList<ViewModel>>, StatusCode> {
    let records = documents::list_documents(state.pool()?)
        .await
        .map_err(internal_error)?;
    let selection = Selection::Latest(params.limit.unwrap_or(DEFAULT_LATEST_LIMIT));

    Ok(Json(ApiList {
        status: STATUS_SUCCESS,
        proposals: present(&records, selection).view_models,
    }))
}

async fn get_risk_below(
    State(state): State<AppState>,
    Query(params): Query<RiskBelowParams>,
) -> Result<Json<ApiOne<Option<ViewModel>>>, StatusCode> {
    let threshold = params.threshold.unwrap_or(DEFAULT_RISK_THRESHOLD);
    if !threshold.is_finite() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let records = documents::list_documents(state.pool()?)
        .await
        .map_err(internal_error)?;

    Ok(Json(ApiOne {
        status: STATUS_SUCCESS,
        proposal: present(&records, Selection::RiskBelow(threshold))
            .view_models
            .into_iter()
            .next(),
    }))
}

async fn load_proposal(state: &AppState, id: &str) -> Result<Proposal, StatusCode> {
    let record: RawProposalRecord = documents::fetch_document(state.pool()?, id)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    normalize(&record).map_err(|e| internal_error(anyhow::Error::new(e)))
}

fn internal_error(err: anyhow::Error) -> StatusCode {
    sentry_anyhow::capture_anyhow(&err);
    tracing::error!(error = %err, "request failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &bizcred_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
