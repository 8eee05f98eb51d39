//! Repository implementations for all TicketHub entities.

pub mod event;
pub mod organization;
pub mod session;
pub mod ticket;
pub mod user;

pub use event::EventRepository;
pub use organization::OrganizationRepository;
pub use session::SessionRepository;
pub use ticket::TicketRepository;
pub use user::UserRepository;
