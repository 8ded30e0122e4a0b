//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact store contract used by services.
//! - Isolate SQLite query details from view-model orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Contact::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod contact_repo;
