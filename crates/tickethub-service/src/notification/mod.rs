//! Outbound mail delivery.

pub mod mailer;

pub use mailer::Mailer;
