//! Library Lending API Server
//!
//! Startup order: env, logging, config, database (with migrations), router,
//! serve. Request flow: route → body extraction (serde validation) → lending
//! workflow or CRUD query → JSON response, with every domain failure shaped
//! into the 422 error envelope by `ApiError`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use library_lending_api::{routes, AppState, Config, Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG=debug,sqlx=warn style level control
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_lending_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting Library Lending API Server");

    let config = Config::from_env()?;
    tracing::info!("📋 Configuration loaded");

    let db = Database::connect(&config.database_url).await?;
    tracing::info!("🗄️  Database connected");

    db.run_migrations().await?;
    tracing::info!("📦 Migrations completed");

    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🌐 Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router.
///
/// # Route Structure
///
/// ```text
/// GET  /health                          - server and database status
///
/// POST /users                           - register a user
/// GET  /users                           - list users (id, name)
/// GET  /users/:userId                   - user with past/present books
///
/// POST /books                           - register a book
/// GET  /books                           - list books (id, name)
/// GET  /books/:bookId                   - book with current score
///
/// POST /users/:userId/borrow/:bookId    - borrow a book
/// POST /users/:userId/return/:bookId    - return it with a rating
/// ```
fn create_router(state: AppState) -> Router {
    // Production restricts origins via ALLOWED_ORIGINS; development is open
    let cors = if state.config.is_production() {
        let allowed_origins = std::env::var("ALLOWED_ORIGINS").unwrap_or_default();
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/users",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route("/users/:userId", get(routes::users::get_user))
        .route(
            "/books",
            post(routes::books::create_book).get(routes::books::list_books),
        )
        .route("/books/:bookId", get(routes::books::get_book))
        .route(
            "/users/:userId/borrow/:bookId",
            post(routes::lending::borrow_book),
        )
        .route(
            "/users/:userId/return/:bookId",
            post(routes::lending::return_book),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
