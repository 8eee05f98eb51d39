//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use tickethub_auth::jwt::decoder::JwtDecoder;
use tickethub_auth::jwt::encoder::JwtEncoder;
use tickethub_auth::password::hasher::PasswordHasher;
use tickethub_core::config::AppConfig;

use tickethub_database::repositories::event::EventRepository;
use tickethub_database::repositories::organization::OrganizationRepository;
use tickethub_database::repositories::session::SessionRepository;
use tickethub_database::repositories::ticket::TicketRepository;
use tickethub_database::repositories::user::UserRepository;

use tickethub_service::account::service::AccountService;
use tickethub_service::event::service::EventService;
use tickethub_service::notification::mailer::Mailer;
use tickethub_service::organization::service::OrganizationService;
use tickethub_service::session::service::SessionService;
use tickethub_service::ticket::admission::AdmissionService;
use tickethub_service::ticket::issue::TicketIssueService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token encoder
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,

    // ── Repositories ─────────────────────────────────────────
    /// User repository
    pub user_repo: Arc<UserRepository>,
    /// Organization repository
    pub organization_repo: Arc<OrganizationRepository>,
    /// Event repository
    pub event_repo: Arc<EventRepository>,
    /// Session repository
    pub session_repo: Arc<SessionRepository>,
    /// Ticket repository
    pub ticket_repo: Arc<TicketRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Account service
    pub account_service: Arc<AccountService>,
    /// Organization service
    pub organization_service: Arc<OrganizationService>,
    /// Event service
    pub event_service: Arc<EventService>,
    /// Session service
    pub session_service: Arc<SessionService>,
    /// Ticket issuance service
    pub issue_service: Arc<TicketIssueService>,
    /// Admission service
    pub admission_service: Arc<AdmissionService>,
    /// Ticket mail delivery
    pub mailer: Arc<Mailer>,
}
