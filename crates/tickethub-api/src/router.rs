//! Route definitions for the TicketHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.server.max_body_size_bytes as usize;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(organization_routes())
        .merge(event_routes())
        .merge(session_routes())
        .merge(ticket_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: register, login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Organization CRUD and membership
fn organization_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/organizations",
            post(handlers::organization::create_organization),
        )
        .route(
            "/organizations",
            get(handlers::organization::list_organizations),
        )
        .route(
            "/organizations/{id}",
            get(handlers::organization::get_organization),
        )
        .route(
            "/organizations/{id}",
            put(handlers::organization::update_organization),
        )
        .route(
            "/organizations/{id}",
            delete(handlers::organization::delete_organization),
        )
        .route(
            "/organizations/{id}/members",
            get(handlers::organization::list_members),
        )
        .route(
            "/organizations/{id}/members",
            post(handlers::organization::add_member),
        )
        .route(
            "/organizations/{id}/members/{user_id}",
            put(handlers::organization::update_member_role)
                .delete(handlers::organization::remove_member),
        )
}

/// Event CRUD and the public listing
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::event::search_events))
        .route("/events/{id}", get(handlers::event::get_event))
        .route("/events/{id}", put(handlers::event::update_event))
        .route("/events/{id}", delete(handlers::event::delete_event))
        .route(
            "/organizations/{id}/events",
            post(handlers::event::create_event),
        )
        .route(
            "/organizations/{id}/events",
            get(handlers::event::list_organization_events),
        )
}

/// Session CRUD, occupancy, and statistics
fn session_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/{id}/sessions",
            post(handlers::session::create_session),
        )
        .route(
            "/events/{id}/sessions",
            get(handlers::session::list_event_sessions),
        )
        .route(
            "/events/{id}/sessions/stats",
            get(handlers::session::event_session_stats),
        )
        .route("/sessions/{id}", get(handlers::session::get_session))
        .route(
            "/sessions/{id}/capacity",
            get(handlers::session::get_session_capacity),
        )
        .route("/sessions/{id}", put(handlers::session::update_session))
        .route("/sessions/{id}", delete(handlers::session::delete_session))
        .route(
            "/sessions/{id}/tickets",
            get(handlers::session::list_session_tickets),
        )
}

/// Public issuance and door-side admission
fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            post(handlers::ticket::issue_tickets).get(handlers::ticket::list_applicant_tickets),
        )
        .route("/tickets/{code}", get(handlers::ticket::lookup_ticket))
        .route(
            "/tickets/{code}/redeem",
            post(handlers::ticket::redeem_ticket),
        )
        .route(
            "/tickets/{code}/status",
            put(handlers::ticket::set_ticket_status),
        )
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
