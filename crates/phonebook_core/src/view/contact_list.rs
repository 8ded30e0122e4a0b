//! Contact list view state.
//!
//! # Responsibility
//! - Filter the contact collection by search text and category.
//! - Partition the filtered contacts into alphabetical sections.
//!
//! # Invariants
//! - `sections` is a pure function of (contacts, search text, filter) and is
//!   rebuilt on every input change, never patched.
//! - Sections are ordered by key; contacts keep collection order inside one
//!   section.
//! - Search matches name, surname, `name surname` or any phone number,
//!   case-insensitively. Blank search text matches everything.

use crate::model::contact::{Category, Contact};
use log::debug;
use std::collections::BTreeMap;

/// Category restriction applied to the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No restriction.
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, contact: &Contact) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => contact.category == category,
        }
    }
}

/// Contacts sharing one section key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSection {
    pub key: char,
    pub contacts: Vec<Contact>,
}

/// Input events accepted by `ContactListState::apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The store republished its full collection.
    ContactsChanged(Vec<Contact>),
    SearchChanged(String),
    CategoryFilterChanged(CategoryFilter),
}

/// Snapshot rendered by the contact list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactListState {
    contacts: Vec<Contact>,
    search_text: String,
    category_filter: CategoryFilter,
    sections: Vec<ContactSection>,
}

impl ContactListState {
    /// Creates a state over an initial collection with no search or filter.
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self::default().apply(ListEvent::ContactsChanged(contacts))
    }

    /// Returns the next snapshot for one input event.
    pub fn apply(mut self, event: ListEvent) -> Self {
        match event {
            ListEvent::ContactsChanged(contacts) => self.contacts = contacts,
            ListEvent::SearchChanged(text) => self.search_text = text,
            ListEvent::CategoryFilterChanged(filter) => self.category_filter = filter,
        }
        self.sections = rebuild_sections(&self.contacts, &self.search_text, self.category_filter);
        debug!(
            "event=list_rebuild module=view status=ok contacts={} sections={}",
            self.contacts.len(),
            self.sections.len()
        );
        self
    }

    /// Full collection as last published by the store.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn category_filter(&self) -> CategoryFilter {
        self.category_filter
    }

    pub fn sections(&self) -> &[ContactSection] {
        &self.sections
    }

    /// True when nothing matches; the screen shows its "no items" state.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of contacts across all sections.
    pub fn visible_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.contacts.len())
            .sum()
    }
}

/// Filters `contacts` and groups the survivors by `Contact::section_key`.
pub fn rebuild_sections(
    contacts: &[Contact],
    search_text: &str,
    category_filter: CategoryFilter,
) -> Vec<ContactSection> {
    let needle = search_text.trim().to_lowercase();
    let mut grouped: BTreeMap<char, Vec<Contact>> = BTreeMap::new();

    for contact in contacts
        .iter()
        .filter(|contact| category_filter.matches(contact))
        .filter(|contact| matches_search(contact, &needle))
    {
        grouped
            .entry(contact.section_key())
            .or_default()
            .push(contact.clone());
    }

    grouped
        .into_iter()
        .map(|(key, contacts)| ContactSection { key, contacts })
        .collect()
}

/// Case-insensitive containment over name fields and phone numbers.
///
/// `needle` must already be trimmed and lowercased.
fn matches_search(contact: &Contact, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    contact.name.to_lowercase().contains(needle)
        || contact.surname.to_lowercase().contains(needle)
        || contact.full_name().to_lowercase().contains(needle)
        || contact
            .phones
            .iter()
            .any(|phone| phone.number.contains(needle))
}
