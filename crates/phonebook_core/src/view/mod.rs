//! Screen state for the contact list and the entry form.
//!
//! # Responsibility
//! - Hold immutable snapshots rendered by the screen host.
//! - Expose pure transitions: each input returns the next snapshot.
//!
//! # Invariants
//! - No transition performs I/O; persistence goes through `service`.

pub mod contact_list;
pub mod entry_form;
