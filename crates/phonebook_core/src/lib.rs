//! Core domain logic for the PhoneBook app.
//! This crate is the single source of truth for contact invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::contact::{
    Category, Contact, ContactId, ContactValidationError, NumberType, PhoneEntry, Rgb,
    EMPTY_NAME_SECTION_KEY, UNSAVED_CONTACT_ID,
};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::{ContactObserver, ContactService, ContactServiceError};
pub use view::contact_list::{
    rebuild_sections, CategoryFilter, ContactListState, ContactSection, ListEvent,
};
pub use view::entry_form::{
    max_extra_numbers, ContactDetails, EntryFormState, FieldError, FieldState,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
