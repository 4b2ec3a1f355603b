// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, community, feed, interaction, profile, share},
    state::AppState,
    utils::jwt::{auth_middleware, optional_auth_middleware},
};

/// Assembles the main application router.
///
/// * Public reads (feed, post detail, comments) accept an optional token.
/// * Writes require a valid token.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let public_routes = Router::new()
        .route("/feed", get(feed::list_feed))
        .route("/posts/{id}", get(community::get_post))
        .route("/posts/{id}/comments", get(interaction::list_comments))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let protected_routes = Router::new()
        .route("/posts", post(community::create_post))
        .route(
            "/posts/{id}",
            put(community::update_post).delete(community::delete_post),
        )
        .route("/posts/{id}/share", post(share::share_post))
        .route("/shares/{id}", delete(share::delete_share))
        .route("/posts/{id}/like", post(interaction::toggle_like))
        .route("/posts/{id}/comments", post(interaction::create_comment))
        .route("/posts/{id}/attendance", post(interaction::toggle_attendance))
        .route("/users/me", get(profile::get_me).delete(profile::delete_me))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", public_routes.merge(protected_routes))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
