#![allow(dead_code)]

use axum::Router;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use sodev_messaging::{
    config::Config,
    directory::MemoryDirectory,
    middleware::auth::Claims,
    routes,
    services::ConversationService,
    state::AppState,
    store::MemoryStore,
};
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub users: Arc<MemoryDirectory>,
    pub service: Arc<ConversationService>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let users = Arc::new(MemoryDirectory::new());
    let service = Arc::new(ConversationService::new(store.clone(), users.clone()));
    TestApp {
        store,
        users,
        service,
    }
}

/// Router over the in-memory store, with the test JWT secret.
pub fn test_router(app: &TestApp) -> Router {
    let state = AppState {
        service: app.service.clone(),
        config: Arc::new(Config::test_defaults()),
    };
    routes::build_router(state)
}

pub fn bearer(user_id: Uuid) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(Config::test_defaults().jwt_secret.as_bytes()),
    )
    .expect("sign test token");
    format!("Bearer {token}")
}
