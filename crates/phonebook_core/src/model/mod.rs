//! Domain model for the contact book.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep one contact shape for list, detail and entry projections.
//!
//! # Invariants
//! - Every persisted contact is identified by a store-assigned `ContactId`.
//! - Phone slots are paired records, never parallel lists.

pub mod contact;
