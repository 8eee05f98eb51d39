//! # tickethub-entity
//!
//! Domain entity models for TicketHub: users, organizations, events,
//! event sessions, and tickets, plus the pure redemption state machine
//! that governs ticket usage transitions.

pub mod event;
pub mod organization;
pub mod session;
pub mod ticket;
pub mod user;
