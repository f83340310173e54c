use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};
use service::auth::repo::seaorm::SeaOrmUserRepository;
use service::auth::AuthService;
use service::message::repo::seaorm::SeaOrmMessageRepository;
use service::message::MessageService;
use service::token::repo::seaorm::SeaOrmRevocationStore;
use service::token::{TokenConfig, TokenService};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Token settings from configs with env fallbacks.
fn load_token_config() -> TokenConfig {
    let (secret, ttl_secs) = match configs::load_default() {
        Ok(mut cfg) => {
            cfg.auth.normalize_from_env();
            (cfg.auth.jwt_secret, cfg.auth.token_ttl_secs)
        }
        Err(_) => {
            let secret = env::var("JWT_SECRET").unwrap_or_default();
            let ttl_secs = env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3600);
            (secret, ttl_secs)
        }
    };
    let secret = if secret.trim().is_empty() {
        "dev-secret-change-me".to_string()
    } else {
        secret
    };
    TokenConfig { secret, ttl_secs: ttl_secs as i64 }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // DB connection: pooled settings from config.toml when available
    let db = match configs::load_default() {
        Ok(mut cfg) => {
            cfg.database.normalize_from_env();
            cfg.database.validate()?;
            models::db::connect_with(&cfg.database).await?
        }
        Err(_) => models::db::connect().await?,
    };

    let users = Arc::new(SeaOrmUserRepository { db: db.clone() });
    let revocations = Arc::new(SeaOrmRevocationStore { db: db.clone() });
    let message_repo = Arc::new(SeaOrmMessageRepository { db });
    let tokens = Arc::new(TokenService::new(revocations, load_token_config()));
    let auth = Arc::new(AuthService::new(Arc::clone(&users), Arc::clone(&tokens)));
    let messages = Arc::new(MessageService::new(message_repo, users, tokens));
    let state = AppState { auth, messages };

    // Build router
    let app: Router = routes::build_router(build_cors(), state);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting messaging server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
