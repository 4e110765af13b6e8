use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use starnotary_core::{Block, Blockchain, ChainError, Hash, StarRecord};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub chain: Arc<Blockchain>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct Head {
    height: u64,
}

#[derive(Deserialize)]
struct AddressIn {
    address: String,
}

#[derive(Deserialize)]
struct StarIn {
    address: String,
    message: String,
    signature: String,
    star: serde_json::Value,
}

pub enum ApiError {
    Chain(ChainError),
    BlockNotFound(u64),
}

impl From<ChainError> for ApiError {
    fn from(e: ChainError) -> Self {
        ApiError::Chain(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Chain(e) => {
                let status = match e {
                    ChainError::MessageExpired { .. } | ChainError::InvalidSignature => {
                        StatusCode::UNAUTHORIZED
                    }
                    ChainError::MalformedMessage(_) | ChainError::InvalidAddress(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ChainError::NotFound(_) => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
            ApiError::BlockNotFound(height) => (
                StatusCode::NOT_FOUND,
                format!("NOT FOUND: no block at height {height}"),
            ),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/chain/height", get(chain_height))
        .route("/block/height/{height}", get(block_by_height))
        .route("/block/hash/{hash}", get(block_by_hash))
        .route("/requestValidation", post(request_validation))
        .route("/submitstar", post(submit_star))
        .route("/blocks/{address}", get(stars_by_address))
        .route("/validateChain", get(validate_chain))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn chain_height(State(state): State<AppState>) -> Json<Head> {
    Json(Head {
        height: state.chain.height().await,
    })
}

async fn block_by_height(
    State(state): State<AppState>,
    Path(height): Path<u64>,
) -> Result<Json<Block>, ApiError> {
    state
        .chain
        .block_by_height(height)
        .await
        .map(Json)
        .ok_or(ApiError::BlockNotFound(height))
}

/// Unknown and unparseable hashes both answer `null`.
async fn block_by_hash(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Json<Option<Vec<Block>>> {
    let mut parsed: Hash = [0u8; 32];
    if hex::decode_to_slice(&hash, &mut parsed).is_err() {
        return Json(None);
    }
    Json(state.chain.block_by_hash(&parsed).await)
}

async fn request_validation(
    State(state): State<AppState>,
    Json(body): Json<AddressIn>,
) -> Result<Json<String>, ApiError> {
    let message = state
        .chain
        .request_message_ownership_verification(&body.address)
        .await?;
    Ok(Json(message))
}

async fn submit_star(
    State(state): State<AppState>,
    Json(body): Json<StarIn>,
) -> Result<Json<Block>, ApiError> {
    let block = state
        .chain
        .submit_star(&body.address, &body.message, &body.signature, body.star)
        .await?;
    info!(address = %body.address, height = block.height, "star registered");
    Ok(Json(block))
}

async fn stars_by_address(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<StarRecord>>, ApiError> {
    Ok(Json(state.chain.stars_by_wallet_address(&address).await?))
}

async fn validate_chain(State(state): State<AppState>) -> Json<Vec<String>> {
    let errors = state.chain.validate_chain().await;
    Json(errors.iter().map(ToString::to_string).collect())
}
