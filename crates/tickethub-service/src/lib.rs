//! # tickethub-service
//!
//! Business logic service layer for TicketHub. Each service orchestrates
//! repositories, authentication, and mail delivery to implement
//! application-level use cases.
//!
//! Services follow constructor injection; all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod capacity;
pub mod context;
pub mod event;
pub mod notification;
pub mod organization;
pub mod session;
pub mod ticket;

pub use account::AccountService;
pub use context::RequestContext;
pub use event::EventService;
pub use notification::Mailer;
pub use organization::OrganizationService;
pub use session::SessionService;
pub use ticket::{AdmissionService, TicketIssueService};
