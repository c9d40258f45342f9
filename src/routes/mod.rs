use crate::state::AppState;
use axum::middleware;
use axum::{
    routing::{get, put},
    Json, Router,
};

pub mod conversations;
pub mod messages;

use conversations::{get_or_create_conversation, list_conversations, mark_as_read};
use messages::{get_messages, send_message};

async fn openapi_json() -> Json<serde_json::Value> {
    use utoipa::OpenApi;
    Json(serde_json::to_value(crate::openapi::ApiDoc::openapi()).unwrap_or_default())
}

pub fn build_router(state: AppState) -> Router {
    // Service introspection endpoints (public, used by healthchecks)
    let introspection = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/openapi.json", get(openapi_json));

    // API v1 endpoints, requester identity comes from the JWT
    let api_v1 = Router::new()
        .route("/conversations", get(list_conversations))
        .route(
            "/conversations/user/:user_id",
            get(get_or_create_conversation),
        )
        .route(
            "/conversations/:id/messages",
            get(get_messages).post(send_message),
        )
        .route("/conversations/:id/read", put(mark_as_read))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware,
        ));

    let router = introspection.merge(Router::new().nest("/api/v1", api_v1));

    crate::middleware::with_defaults(router).with_state(state)
}
