//! Ticket entity and redemption state machine.

pub mod model;
pub mod redemption;

pub use model::{NewTicket, Ticket, TicketStatus};
pub use redemption::{AvailableModes, RedemptionError, RedemptionMode};
