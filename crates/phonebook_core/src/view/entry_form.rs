//! Contact entry form state.
//!
//! # Responsibility
//! - Hold the editable copy of one contact for create/edit screens.
//! - Validate fields incrementally and keep per-field error state.
//! - Manage the repeatable phone slots bounded by `NumberType::ALL`.
//!
//! # Invariants
//! - Every phone slot carries exactly one number type; types are unique.
//! - `extra_numbers_used == details.phones.len() - 1` and never exceeds
//!   `max_extra_numbers()`.
//! - `is_enabled_more` iff another slot can be added.
//! - `is_entry_valid` is recomputed on every transition from all validators.
//! - Slot count changes only through `add_more_numbers`/`delete_number`.

use crate::model::contact::{
    Category, Contact, ContactId, NumberType, PhoneEntry, UNSAVED_CONTACT_ID,
};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

static NAME_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.@-]{0,20}$").expect("valid name text regex"));
static EMAIL_TEXT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.@-]{0,64}$").expect("valid email text regex"));
static NOTES_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N} +_.,@!?'()-]{0,200}$").expect("valid notes text regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{0,20}$").expect("valid phone regex"));
static EMAIL_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9+._%-]{1,256}@[A-Za-z0-9][A-Za-z0-9-]{0,64}(\.[A-Za-z0-9][A-Za-z0-9-]{0,25})+$",
    )
    .expect("valid email address regex")
});

/// Highest number of phone slots beyond the mandatory primary one.
pub fn max_extra_numbers() -> usize {
    NumberType::ALL.len() - 1
}

/// Field-local validation failure shown under the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    NameRequired,
    NumberRequired,
    InvalidEmail,
}

impl FieldError {
    pub fn message(self) -> &'static str {
        match self {
            Self::NameRequired => "Name is required",
            Self::NumberRequired => "Number is required",
            Self::InvalidEmail => "Invalid email",
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Per-field validation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldState {
    /// Never edited; no error is shown even if the value is invalid.
    #[default]
    Untouched,
    Valid,
    Invalid(FieldError),
}

impl FieldState {
    fn from_check(check: Result<(), FieldError>) -> Self {
        match check {
            Ok(()) => Self::Valid,
            Err(err) => Self::Invalid(err),
        }
    }

    pub fn error(self) -> Option<FieldError> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Untouched | Self::Valid => None,
        }
    }

    pub fn is_touched(self) -> bool {
        self != Self::Untouched
    }
}

/// Editable contact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    /// `0` for a contact being created.
    pub id: ContactId,
    pub photo: String,
    pub name: String,
    pub surname: String,
    pub category: Category,
    pub phones: Vec<PhoneEntry>,
    pub email: String,
    pub notes: String,
}

impl Default for ContactDetails {
    fn default() -> Self {
        Self {
            id: UNSAVED_CONTACT_ID,
            photo: String::new(),
            name: String::new(),
            surname: String::new(),
            category: Category::default(),
            phones: vec![PhoneEntry::empty(NumberType::ALL[0])],
            email: String::new(),
            notes: String::new(),
        }
    }
}

impl ContactDetails {
    /// Builds the record handed to the contact store.
    pub fn to_contact(&self) -> Contact {
        Contact {
            id: self.id,
            photo: self.photo.clone(),
            name: self.name.clone(),
            surname: self.surname.clone(),
            category: self.category,
            phones: self.phones.clone(),
            email: self.email.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn primary_number(&self) -> &str {
        self.phones
            .first()
            .map_or("", |phone| phone.number.as_str())
    }
}

impl From<Contact> for ContactDetails {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            photo: contact.photo,
            name: contact.name,
            surname: contact.surname,
            category: contact.category,
            phones: contact.phones,
            email: contact.email,
            notes: contact.notes,
        }
    }
}

/// Snapshot rendered by the create/edit screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormState {
    details: ContactDetails,
    name_state: FieldState,
    number_state: FieldState,
    email_state: FieldState,
    is_entry_valid: bool,
    extra_numbers_used: usize,
    is_enabled_more: bool,
}

impl Default for EntryFormState {
    fn default() -> Self {
        Self::with_details(ContactDetails::default())
    }
}

impl EntryFormState {
    /// Empty form for creating a contact.
    pub fn new() -> Self {
        Self::default()
    }

    /// Form pre-filled from a stored contact.
    ///
    /// Extra slots already used by the contact count against the cap.
    pub fn from_contact(contact: Contact) -> Self {
        Self::with_details(ContactDetails::from(contact))
    }

    fn with_details(mut details: ContactDetails) -> Self {
        if details.phones.is_empty() {
            details.phones.push(PhoneEntry::empty(NumberType::ALL[0]));
        }
        let extra_numbers_used = (details.phones.len() - 1).min(max_extra_numbers());
        details.phones.truncate(extra_numbers_used + 1);
        let is_entry_valid = is_details_valid(&details);
        Self {
            details,
            name_state: FieldState::Untouched,
            number_state: FieldState::Untouched,
            email_state: FieldState::Untouched,
            is_entry_valid,
            extra_numbers_used,
            is_enabled_more: extra_numbers_used < max_extra_numbers(),
        }
    }

    pub fn details(&self) -> &ContactDetails {
        &self.details
    }

    pub fn name_state(&self) -> FieldState {
        self.name_state
    }

    pub fn number_state(&self) -> FieldState {
        self.number_state
    }

    pub fn email_state(&self) -> FieldState {
        self.email_state
    }

    pub fn name_error(&self) -> Option<FieldError> {
        self.name_state.error()
    }

    pub fn number_error(&self) -> Option<FieldError> {
        self.number_state.error()
    }

    pub fn email_error(&self) -> Option<FieldError> {
        self.email_state.error()
    }

    /// Gates the save action.
    pub fn is_entry_valid(&self) -> bool {
        self.is_entry_valid
    }

    /// Number of phone slots beyond the primary one.
    pub fn extra_numbers_used(&self) -> usize {
        self.extra_numbers_used
    }

    pub fn is_enabled_more(&self) -> bool {
        self.is_enabled_more
    }

    /// Record for the contact store.
    pub fn to_contact(&self) -> Contact {
        self.details.to_contact()
    }

    /// Applies a full edited copy of the fields.
    ///
    /// The change is dropped when any text fails its input pattern, when the
    /// phone slot count differs, or when number types collide. Validators run
    /// only for fields whose value changed.
    pub fn apply_field_change(mut self, new_details: ContactDetails) -> Self {
        if new_details.phones.len() != self.details.phones.len()
            || has_duplicate_number_types(&new_details.phones)
        {
            warn!(
                "event=entry_change module=view status=rejected reason=slot_mismatch current_slots={} new_slots={}",
                self.details.phones.len(),
                new_details.phones.len()
            );
            return self;
        }
        if !accepts_input(&new_details) {
            debug!("event=entry_change module=view status=rejected reason=input_pattern");
            return self;
        }

        if self.details.name != new_details.name {
            self.name_state = FieldState::from_check(validate_name(&new_details.name));
        }
        if self.details.primary_number() != new_details.primary_number() {
            self.number_state =
                FieldState::from_check(validate_primary_number(new_details.primary_number()));
        }
        if self.details.email != new_details.email {
            self.email_state = FieldState::from_check(validate_email(&new_details.email));
        }

        self.is_entry_valid = is_details_valid(&new_details);
        self.details = new_details;
        self
    }

    /// Edits a copy of the current fields and applies it.
    pub fn edit(self, change: impl FnOnce(&mut ContactDetails)) -> Self {
        let mut details = self.details.clone();
        change(&mut details);
        self.apply_field_change(details)
    }

    /// Runs every validator and surfaces all errors, touched or not.
    pub fn validate_all(mut self) -> Self {
        self.name_state = FieldState::from_check(validate_name(&self.details.name));
        self.number_state =
            FieldState::from_check(validate_primary_number(self.details.primary_number()));
        self.email_state = FieldState::from_check(validate_email(&self.details.email));
        self.is_entry_valid = is_details_valid(&self.details);
        self
    }

    /// Adopts the id the store assigned on first save.
    ///
    /// Later saves of the same form then overwrite that contact. No-op when
    /// the form already refers to a stored contact.
    pub fn with_saved_id(mut self, id: ContactId) -> Self {
        if self.details.id == UNSAVED_CONTACT_ID {
            self.details.id = id;
        }
        self
    }

    /// Appends an empty slot labelled with the first unused number type.
    ///
    /// No-op once every number type is in use.
    pub fn add_more_numbers(mut self) -> Self {
        if !self.is_enabled_more {
            return self;
        }
        let Some(next_type) = NumberType::ALL.into_iter().find(|candidate| {
            !self
                .details
                .phones
                .iter()
                .any(|phone| phone.number_type == *candidate)
        }) else {
            return self;
        };

        self.details.phones.push(PhoneEntry::empty(next_type));
        self.extra_numbers_used += 1;
        self.is_enabled_more = self.extra_numbers_used < max_extra_numbers();
        self
    }

    /// Removes the slot at `index`.
    ///
    /// No-op when only the primary slot exists or `index` is out of range.
    pub fn delete_number(mut self, index: usize) -> Self {
        if self.extra_numbers_used == 0 || index >= self.details.phones.len() {
            return self;
        }
        self.details.phones.remove(index);
        self.extra_numbers_used -= 1;
        self.is_enabled_more = self.extra_numbers_used < max_extra_numbers();

        if index == 0 && self.number_state.is_touched() {
            self.number_state =
                FieldState::from_check(validate_primary_number(self.details.primary_number()));
        }
        self.is_entry_valid = is_details_valid(&self.details);
        self
    }
}

fn validate_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() {
        return Err(FieldError::NameRequired);
    }
    Ok(())
}

fn validate_primary_number(number: &str) -> Result<(), FieldError> {
    if number.trim().is_empty() || !PHONE_RE.is_match(number) {
        return Err(FieldError::NumberRequired);
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.trim().is_empty() || EMAIL_ADDRESS_RE.is_match(email) {
        return Ok(());
    }
    Err(FieldError::InvalidEmail)
}

fn is_details_valid(details: &ContactDetails) -> bool {
    validate_name(&details.name).is_ok()
        && validate_primary_number(details.primary_number()).is_ok()
        && validate_email(&details.email).is_ok()
}

fn accepts_input(details: &ContactDetails) -> bool {
    NAME_TEXT_RE.is_match(&details.name)
        && NAME_TEXT_RE.is_match(&details.surname)
        && EMAIL_TEXT_RE.is_match(&details.email)
        && NOTES_TEXT_RE.is_match(&details.notes)
        && details
            .phones
            .iter()
            .all(|phone| PHONE_RE.is_match(&phone.number))
}

fn has_duplicate_number_types(phones: &[PhoneEntry]) -> bool {
    let mut seen = HashSet::with_capacity(phones.len());
    phones.iter().any(|phone| !seen.insert(phone.number_type))
}

#[cfg(test)]
mod tests {
    use super::{accepts_input, validate_email, ContactDetails, FieldError};

    #[test]
    fn email_validator_accepts_common_addresses() {
        assert!(validate_email("jan.kowalski@example.com").is_ok());
        assert!(validate_email("a+tag@mail.co.uk").is_ok());
        assert!(validate_email("").is_ok());
        assert_eq!(validate_email("a@b"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("@example.com"), Err(FieldError::InvalidEmail));
    }

    #[test]
    fn input_filter_rejects_unsafe_characters() {
        let mut details = ContactDetails::default();
        details.name = "Bob".to_string();
        assert!(accepts_input(&details));

        details.name = "Bob<script>".to_string();
        assert!(!accepts_input(&details));

        details.name = "Bob".to_string();
        details.phones[0].number = "12a".to_string();
        assert!(!accepts_input(&details));

        details.phones[0].number = "+48123".to_string();
        details.notes = "met at the office, call after 5pm!".to_string();
        assert!(accepts_input(&details));
    }

    #[test]
    fn input_filter_bounds_name_length() {
        let mut details = ContactDetails::default();
        details.name = "a".repeat(20);
        assert!(accepts_input(&details));
        details.name = "a".repeat(21);
        assert!(!accepts_input(&details));
    }
}
