//! Ticket issuance and admission.

pub mod admission;
pub mod issue;

pub use admission::{AdmissionService, ManualStatusRequest, TicketDetails};
pub use issue::{IssueTicketsRequest, IssuedTickets, TicketIssueService};
