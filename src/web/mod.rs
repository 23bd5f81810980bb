//! Web layer module
//!
//! Read-only HTTP interface over a loaded store. Handlers stay thin and
//! delegate to [`OrganisationService`] for assembly.

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::{config::Config, database::Database, services::OrganisationService};

pub mod handlers;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, database: Database) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = Self::create_router(AppState {
            organisations: OrganisationService::new(database.clone()),
            database,
            config,
        });

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        let organisations_path = format!(
            "{}/organisations",
            state.config.web.base_path.trim_end_matches('/')
        );

        Router::new()
            .route("/__health", get(handlers::health_check))
            .nest(&organisations_path, Self::organisation_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    fn organisation_routes() -> Router<AppState> {
        Router::new()
            .route("/__ids", get(handlers::list_identities))
            .route("/__count", get(handlers::count_organisations))
            .route("/:uuid", get(handlers::get_organisation))
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub organisations: OrganisationService,
    pub config: Config,
}
