//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::domain::{AccountSnapshot, OperationContext};
use crate::error::AppError;
use crate::handlers::{BuyItemCommand, SendCoinCommand};

use super::middleware::{auth_middleware, logging_middleware, AuthenticatedUser};
use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    pub to_user: String,
    pub amount: i64,
}

// =========================================================================
// Router
// =========================================================================

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/info", get(info))
        .route("/sendCoin", post(send_coin))
        .route("/buy/:item", get(buy_item))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new().route("/auth", post(auth)).merge(protected);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// Turn a body extraction failure into our error shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

// =========================================================================
// Handlers
// =========================================================================

async fn health_check() -> &'static str {
    "OK"
}

/// Log in, registering the username on first use
async fn auth(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let request = json_body(payload)?;

    if request.username.is_empty() || request.password.is_empty() {
        return Err(AppError::InvalidRequest(
            "username and password are required".to_string(),
        ));
    }

    let token = state
        .auth
        .execute(&request.username, &request.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

/// Balance, inventory and transfer history of the caller
async fn info(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(context): Extension<OperationContext>,
) -> Result<Json<AccountSnapshot>, AppError> {
    let snapshot = state.info.execute(&user.username, &context).await?;
    Ok(Json(snapshot))
}

async fn send_coin(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let request = json_body(payload)?;

    if request.to_user.is_empty() {
        return Err(AppError::InvalidRequest("toUser is required".to_string()));
    }

    let command = SendCoinCommand::new(user.username, request.to_user, request.amount);
    state.transfers.execute(command, &context).await?;

    Ok(StatusCode::OK)
}

async fn buy_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Extension(context): Extension<OperationContext>,
    Path(item): Path<String>,
) -> Result<StatusCode, AppError> {
    let command = BuyItemCommand::new(user.username, item);
    state.purchases.execute(command, &context).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_coin_request_deserialize() {
        let json = r#"{ "toUser": "bob", "amount": 60 }"#;

        let request: SendCoinRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.to_user, "bob");
        assert_eq!(request.amount, 60);
    }

    #[test]
    fn test_send_coin_request_keeps_non_positive_amounts() {
        // Rejected by the transfer handler, not by deserialization
        let request: SendCoinRequest =
            serde_json::from_str(r#"{ "toUser": "bob", "amount": -5 }"#).unwrap();
        assert_eq!(request.amount, -5);
    }

    #[test]
    fn test_auth_request_requires_both_fields() {
        assert!(serde_json::from_str::<AuthRequest>(r#"{ "username": "alice" }"#).is_err());
    }
}
