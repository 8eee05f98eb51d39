//! Application builder: wires repositories, services, router, and
//! middleware into a runnable Axum app.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use tickethub_core::config::AppConfig;
use tickethub_core::error::AppError;
use tickethub_database::repositories::{
    EventRepository, OrganizationRepository, SessionRepository, TicketRepository, UserRepository,
};

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Constructs the full application state from configuration and a pool.
pub fn build_state(config: AppConfig, db_pool: PgPool) -> AppState {
    // Repositories
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let organization_repo = Arc::new(OrganizationRepository::new(db_pool.clone()));
    let event_repo = Arc::new(EventRepository::new(db_pool.clone()));
    let session_repo = Arc::new(SessionRepository::new(db_pool.clone()));
    let ticket_repo = Arc::new(TicketRepository::new(db_pool.clone()));

    // Auth
    let password_hasher = Arc::new(tickethub_auth::password::hasher::PasswordHasher::new());
    let jwt_encoder = Arc::new(tickethub_auth::jwt::encoder::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(tickethub_auth::jwt::decoder::JwtDecoder::new(&config.auth));

    // Services
    let mailer = Arc::new(tickethub_service::notification::mailer::Mailer::new(
        config.mail.clone(),
    ));
    let account_service = Arc::new(tickethub_service::account::service::AccountService::new(
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
        Arc::clone(&jwt_encoder),
        config.auth.password_min_length,
    ));
    let organization_service = Arc::new(
        tickethub_service::organization::service::OrganizationService::new(Arc::clone(
            &organization_repo,
        )),
    );
    let event_service = Arc::new(tickethub_service::event::service::EventService::new(
        Arc::clone(&event_repo),
        Arc::clone(&organization_service),
    ));
    let session_service = Arc::new(tickethub_service::session::service::SessionService::new(
        Arc::clone(&session_repo),
        Arc::clone(&event_service),
        Arc::clone(&organization_service),
    ));
    let issue_service = Arc::new(tickethub_service::ticket::issue::TicketIssueService::new(
        db_pool.clone(),
        Arc::clone(&session_repo),
        Arc::clone(&ticket_repo),
        Arc::clone(&event_repo),
        Arc::clone(&mailer),
    ));
    let admission_service = Arc::new(tickethub_service::ticket::admission::AdmissionService::new(
        db_pool.clone(),
        Arc::clone(&ticket_repo),
        Arc::clone(&session_repo),
        Arc::clone(&event_repo),
        Arc::clone(&organization_service),
    ));

    AppState {
        config: Arc::new(config),
        db_pool,
        jwt_encoder,
        jwt_decoder,
        password_hasher,
        user_repo,
        organization_repo,
        event_repo,
        session_repo,
        ticket_repo,
        account_service,
        organization_service,
        event_service,
        session_service,
        issue_service,
        admission_service,
        mailer,
    }
}

/// Runs the TicketHub server with the given configuration and pool.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config, db_pool);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("TicketHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
}
