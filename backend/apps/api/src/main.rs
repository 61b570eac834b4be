//! Auth Server Entry Point
//!
//! Mounts the auth plugin plus one protected demo route.
//! Uses `anyhow` for startup errors; request-level errors are
//! `auth_plugin::AuthError`.

use auth_plugin::config::DEFAULT_COOKIE_SECRET;
use auth_plugin::{
    AuthConfig, AuthOptions, AuthPlugin, CookieOptions, CurrentUser, DatabaseOptions,
    PgUserRepository,
};
use axum::{
    Json, Router,
    http::{self, Method, header},
    routing::get,
};
use serde_json::{Value, json};
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_server=info,auth_plugin=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = load_options()?;
    let config = AuthConfig::resolve(options)?;

    // Database connection and schema
    let auth = AuthPlugin::<PgUserRepository>::connect(config).await?;

    // CORS configuration (credentials are needed for the session cookie)
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router
    let protected_routes = auth.protect(Router::new().route("/protected", get(protected)));

    let app = auth
        .router()
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /protected
async fn protected(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "message": "You are authenticated",
        "user": { "id": user.id, "email": user.email },
    }))
}

/// Options from the `AUTH_CONFIG` JSON file, or from individual variables
fn load_options() -> anyhow::Result<AuthOptions> {
    if let Ok(path) = env::var("AUTH_CONFIG") {
        let raw = std::fs::read_to_string(&path)?;
        tracing::info!(path = %path, "Loaded plugin options");
        return Ok(AuthOptions::from_json_str(&raw)?);
    }

    let cookie_secret = env::var("COOKIE_SECRET").ok();
    let cookie_secure = env::var("COOKIE_SECURE")
        .ok()
        .map(|raw| raw.parse::<bool>())
        .transpose()?;

    let cookie_options = (cookie_secret.is_some() || cookie_secure.is_some()).then(|| {
        let mut cookie = CookieOptions::new(
            cookie_secret.unwrap_or_else(|| DEFAULT_COOKIE_SECRET.to_string()),
        );
        cookie.secure = cookie_secure;
        cookie
    });

    Ok(AuthOptions {
        route_prefix: env::var("AUTH_ROUTE_PREFIX").ok(),
        jwt_secret: env::var("JWT_SECRET").ok(),
        database_pool_connection: env::var("DATABASE_URL").ok().map(DatabaseOptions::from_url),
        cookie_options,
        ..AuthOptions::default()
    })
}
