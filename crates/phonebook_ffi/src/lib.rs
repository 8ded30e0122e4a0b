//! Flutter bridge crate for the PhoneBook core.

pub mod api;
