use std::{collections::HashMap, future::IntoFuture, net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::{
    config::VoteboardConfig,
    error::{VoteboardError, VoteboardResult},
    feature::{Feature, NewFeature},
    store::FeatureStore,
};

#[derive(Clone)]
pub struct VoteboardServer {
    config: VoteboardConfig,
    store: Arc<FeatureStore>,
}

#[derive(Clone)]
struct ApiState {
    store: Arc<FeatureStore>,
}

impl VoteboardServer {
    pub fn new(config: VoteboardConfig) -> VoteboardResult<Self> {
        let store = Arc::new(FeatureStore::new(&config.database_file));
        Ok(Self { config, store })
    }

    pub fn router(&self) -> Router {
        let state = ApiState {
            store: self.store.clone(),
        };
        Router::new()
            .route("/api/features", get(list_features).post(add_feature))
            .route("/api/features/:id/vote", post(vote_feature))
            .route("/health", get(health))
            .with_state(state)
            .layer(cors_layer(&self.config))
            .layer(TraceLayer::new_for_http())
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> VoteboardResult<()> {
        let addr: SocketAddr = self
            .config
            .rest
            .bind_addr
            .parse()
            .map_err(|err: std::net::AddrParseError| {
                VoteboardError::Configuration(err.to_string())
            })?;
        let app = self.router();

        info!(?addr, "voteboard listening");
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| VoteboardError::Io(err.to_string()))?;
        tokio::select! {
            result = axum::serve(listener, app).into_future() => {
                result.map_err(|err| VoteboardError::Internal(err.to_string()))
            }
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received, shutting down");
                Ok(())
            }
        }
    }

    pub fn store(&self) -> Arc<FeatureStore> {
        self.store.clone()
    }
}

fn cors_layer(config: &VoteboardConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]);
    let origins: Vec<HeaderValue> = config
        .rest
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        layer.allow_origin(AllowOrigin::any())
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

#[derive(Debug, Deserialize)]
struct ListParams {
    category: Option<String>,
}

async fn list_features(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Feature>>, ApiError> {
    let mut features = state.store.list()?;
    if let Some(category) = params.category.filter(|c| !c.is_empty()) {
        features.retain(|feature| feature.category == category);
    }
    Ok(Json(features))
}

async fn add_feature(
    State(state): State<ApiState>,
    Json(payload): Json<NewFeature>,
) -> Result<(StatusCode, Json<Feature>), ApiError> {
    let feature = state.store.add(payload)?;
    Ok((StatusCode::CREATED, Json(feature)))
}

async fn vote_feature(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.vote(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "voteboard",
    }))
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<HashMap<String, String>>,
}

struct ApiError(VoteboardError);

impl From<VoteboardError> for ApiError {
    fn from(value: VoteboardError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let details = match &self.0 {
            VoteboardError::Validation { field, message } => Some(HashMap::from([(
                field.clone(),
                message.clone(),
            )])),
            _ => None,
        };
        let body = Json(ApiErrorBody {
            error: self.0.to_string(),
            details,
        });
        (status, body).into_response()
    }
}
