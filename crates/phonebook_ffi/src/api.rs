//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose contact list and entry form use-cases to Dart via FRB.
//! - Own the current screen snapshots and replace them per transition.
//! - Flatten core types into UI envelopes with stable string values.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Snapshot slots are replaced wholesale, never mutated in place.
//! - Store writes are plain (non-sync) functions so Dart awaits them off the
//!   UI isolate while further edits keep flowing through sync calls.
//! - A created contact's id is written back into the entry form that saved
//!   it, so saving that form again overwrites the same contact.

use log::warn;
use phonebook_core::db::open_db;
use phonebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, CategoryFilter, Contact, ContactDetails, ContactId, ContactListState,
    ContactService, EntryFormState, FieldState, ListEvent, NumberType, PhoneEntry,
    SqliteContactRepository,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, OnceLock};

const CONTACTS_DB_FILE_NAME: &str = "phonebook.sqlite3";
const NO_CONTACTS_MESSAGE: &str = "No contacts.";

static CONTACTS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static LIST_STATE: OnceLock<Mutex<ContactListState>> = OnceLock::new();
static ENTRY_STATE: OnceLock<Mutex<EntryFormState>> = OnceLock::new();
/// Bumped whenever the entry slot starts a different form.
static ENTRY_SESSION: AtomicU64 = AtomicU64::new(0);
static SAVE_GATE: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the contact list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRowItem {
    pub contact_id: i64,
    /// Full name, shortened for the row width.
    pub label: String,
    /// Category storage string (`NONE|FAMILY|FRIENDS|WORK`).
    pub category: String,
    /// Badge color as `0xRRGGBB`; `None` hides the badge.
    pub category_color: Option<u32>,
    /// Avatar letter; empty for unnamed contacts.
    pub initial: String,
    /// Avatar color as `0xRRGGBB`; `None` means neutral gray.
    pub avatar_color: Option<u32>,
}

/// One alphabetical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSectionItem {
    pub key: String,
    pub rows: Vec<ContactRowItem>,
}

/// Contact list snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactListResponse {
    pub sections: Vec<ContactSectionItem>,
    /// True when the screen should show its "no items" state.
    pub is_empty: bool,
    pub search_text: String,
    /// Active category filter, `None` for no filter.
    pub category_filter: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

/// Field values sent by the entry screen on every edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormInput {
    pub photo: String,
    pub name: String,
    pub surname: String,
    pub category: String,
    pub numbers: Vec<String>,
    pub number_types: Vec<String>,
    pub email: String,
    pub notes: String,
}

/// Entry form snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormResponse {
    /// `0` while creating a new contact.
    pub contact_id: i64,
    pub photo: String,
    pub name: String,
    pub surname: String,
    pub category: String,
    pub numbers: Vec<String>,
    pub number_types: Vec<String>,
    pub email: String,
    pub notes: String,
    /// Empty string when the field has no error.
    pub name_error: String,
    pub number_error: String,
    pub email_error: String,
    pub is_entry_valid: bool,
    pub is_enabled_more: bool,
    pub message: String,
}

/// Generic action response envelope for store writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactActionResponse {
    pub ok: bool,
    pub contact_id: Option<i64>,
    pub message: String,
}

impl ContactActionResponse {
    fn success(message: impl Into<String>, contact_id: Option<ContactId>) -> Self {
        Self {
            ok: true,
            contact_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            contact_id: None,
            message: message.into(),
        }
    }
}

/// Reloads the collection from the store and rebuilds sections.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - On store failure the previous snapshot is kept and the message says why.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_refresh() -> ContactListResponse {
    match with_contact_service(|service| Ok(service.list_contacts()?)) {
        Ok(contacts) => {
            let mut slot = lock_slot(&LIST_STATE);
            replace_with(&mut *slot, |state| {
                state.apply(ListEvent::ContactsChanged(contacts))
            });
            to_list_response(&slot, None)
        }
        Err(err) => to_list_response(
            &lock_slot(&LIST_STATE),
            Some(format!("contacts_refresh failed: {err}")),
        ),
    }
}

/// Updates the search text and rebuilds sections.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_set_search(text: String) -> ContactListResponse {
    let mut slot = lock_slot(&LIST_STATE);
    replace_with(&mut *slot, |state| state.apply(ListEvent::SearchChanged(text)));
    to_list_response(&slot, None)
}

/// Sets the category filter; `None` or an unknown value clears it.
#[flutter_rust_bridge::frb(sync)]
pub fn contacts_set_category_filter(category: Option<String>) -> ContactListResponse {
    let filter = category
        .as_deref()
        .and_then(Category::parse)
        .map_or(CategoryFilter::All, CategoryFilter::Only);
    let mut slot = lock_slot(&LIST_STATE);
    replace_with(&mut *slot, |state| {
        state.apply(ListEvent::CategoryFilterChanged(filter))
    });
    to_list_response(&slot, None)
}

/// Deletes every contact of the current collection.
///
/// # FFI contract
/// - Async on the Dart side; the list refreshes from the store afterwards.
pub fn contacts_delete_all() -> ContactActionResponse {
    let contacts = lock_slot(&LIST_STATE).contacts().to_vec();
    match with_contact_service(|service| Ok(service.delete_all(&contacts)?)) {
        Ok(removed) => {
            contacts_refresh();
            ContactActionResponse::success(format!("Deleted {removed} contact(s)."), None)
        }
        Err(err) => ContactActionResponse::failure(format!("contacts_delete_all failed: {err}")),
    }
}

/// Deletes one contact by id.
pub fn contacts_delete(contact_id: i64) -> ContactActionResponse {
    match with_contact_service(|service| Ok(service.delete_contact(contact_id)?)) {
        Ok(()) => {
            contacts_refresh();
            ContactActionResponse::success("Contact deleted.", Some(contact_id))
        }
        Err(err) => ContactActionResponse::failure(format!("contacts_delete failed: {err}")),
    }
}

/// Starts a blank entry form.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_begin_create() -> EntryFormResponse {
    let mut slot = lock_slot(&ENTRY_STATE);
    ENTRY_SESSION.fetch_add(1, Ordering::SeqCst);
    *slot = EntryFormState::new();
    to_entry_response(&slot, String::new())
}

/// Starts an entry form pre-filled from a stored contact.
///
/// On failure the form is reset to blank and the message says why.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_begin_edit(contact_id: i64) -> EntryFormResponse {
    let loaded = with_contact_service(|service| Ok(service.load_entry(contact_id)?));
    let mut slot = lock_slot(&ENTRY_STATE);
    ENTRY_SESSION.fetch_add(1, Ordering::SeqCst);
    match loaded {
        Ok(form) => {
            *slot = form;
            to_entry_response(&slot, String::new())
        }
        Err(err) => {
            *slot = EntryFormState::new();
            to_entry_response(&slot, format!("entry_begin_edit failed: {err}"))
        }
    }
}

/// Applies the edited field values.
///
/// Values with unknown category or number type strings are dropped.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_update(input: EntryFormInput) -> EntryFormResponse {
    let mut slot = lock_slot(&ENTRY_STATE);
    match to_details(slot.details().id, input) {
        Some(details) => {
            replace_with(&mut *slot, |form| form.apply_field_change(details));
            to_entry_response(&slot, String::new())
        }
        None => {
            warn!("event=entry_update module=ffi status=rejected reason=unparseable_input");
            to_entry_response(&slot, "entry_update ignored: malformed input".to_string())
        }
    }
}

/// Adds one phone slot when the cap allows it.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_add_number() -> EntryFormResponse {
    let mut slot = lock_slot(&ENTRY_STATE);
    replace_with(&mut *slot, EntryFormState::add_more_numbers);
    to_entry_response(&slot, String::new())
}

/// Removes the phone slot at `index`.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_delete_number(index: u32) -> EntryFormResponse {
    let mut slot = lock_slot(&ENTRY_STATE);
    replace_with(&mut *slot, |form| form.delete_number(index as usize));
    to_entry_response(&slot, String::new())
}

/// Validates and saves the current entry form.
///
/// # FFI contract
/// - Async on the Dart side.
/// - Invalid forms are rejected with `ok=false`; field errors become visible
///   on the next `entry_*` snapshot.
/// - Saves run one at a time; a repeated save of a new form updates the
///   contact created by the first one.
pub fn entry_save() -> ContactActionResponse {
    let _save_guard = SAVE_GATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let (form, session) = {
        let mut slot = lock_slot(&ENTRY_STATE);
        replace_with(&mut *slot, EntryFormState::validate_all);
        (slot.clone(), ENTRY_SESSION.load(Ordering::SeqCst))
    };
    match with_contact_service(|service| Ok(service.save_entry(&form)?)) {
        Ok(contact_id) => {
            adopt_saved_id(session, contact_id);
            contacts_refresh();
            ContactActionResponse::success("Contact saved.", Some(contact_id))
        }
        Err(err) => ContactActionResponse::failure(format!("entry_save failed: {err}")),
    }
}

fn adopt_saved_id(session: u64, contact_id: ContactId) {
    let mut slot = lock_slot(&ENTRY_STATE);
    if ENTRY_SESSION.load(Ordering::SeqCst) != session {
        return;
    }
    replace_with(&mut *slot, |form| form.with_saved_id(contact_id));
}

fn resolve_contacts_db_path() -> PathBuf {
    CONTACTS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PHONEBOOK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CONTACTS_DB_FILE_NAME)
        })
        .clone()
}

fn with_contact_service<T>(
    f: impl FnOnce(
        &mut ContactService<SqliteContactRepository<'_>>,
    ) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<T, String> {
    let db_path = resolve_contacts_db_path();
    let mut conn = open_db(&db_path).map_err(|err| format!("contacts DB open failed: {err}"))?;
    let mut service = ContactService::new(SqliteContactRepository::new(&mut conn));
    f(&mut service).map_err(|err| err.to_string())
}

fn lock_slot<T: Default>(slot: &'static OnceLock<Mutex<T>>) -> MutexGuard<'static, T> {
    slot.get_or_init(|| Mutex::new(T::default()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn replace_with<T: Default>(slot: &mut T, transition: impl FnOnce(T) -> T) {
    let current = std::mem::take(slot);
    *slot = transition(current);
}

fn to_details(id: ContactId, input: EntryFormInput) -> Option<ContactDetails> {
    if input.numbers.len() != input.number_types.len() {
        return None;
    }
    let category = Category::parse(&input.category)?;
    let phones = input
        .numbers
        .into_iter()
        .zip(input.number_types.iter())
        .map(|(number, kind)| NumberType::parse(kind).map(|kind| PhoneEntry::new(number, kind)))
        .collect::<Option<Vec<_>>>()?;
    Some(ContactDetails {
        id,
        photo: input.photo,
        name: input.name,
        surname: input.surname,
        category,
        phones,
        email: input.email,
        notes: input.notes,
    })
}

fn to_list_response(state: &ContactListState, error: Option<String>) -> ContactListResponse {
    let sections = state
        .sections()
        .iter()
        .map(|section| ContactSectionItem {
            key: section.key.to_string(),
            rows: section.contacts.iter().map(to_row_item).collect(),
        })
        .collect::<Vec<_>>();
    let message = error.unwrap_or_else(|| {
        if state.is_empty() {
            NO_CONTACTS_MESSAGE.to_string()
        } else {
            format!("{} contact(s).", state.visible_count())
        }
    });
    let category_filter = match state.category_filter() {
        CategoryFilter::All => None,
        CategoryFilter::Only(category) => Some(category.as_str().to_string()),
    };
    ContactListResponse {
        sections,
        is_empty: state.is_empty(),
        search_text: state.search_text().to_string(),
        category_filter,
        message,
    }
}

fn to_row_item(contact: &Contact) -> ContactRowItem {
    ContactRowItem {
        contact_id: contact.id,
        label: contact.list_label(),
        category: contact.category.as_str().to_string(),
        category_color: contact.category.badge_color().map(pack_rgb),
        initial: contact
            .name
            .chars()
            .next()
            .map(|_| contact.section_key().to_string())
            .unwrap_or_default(),
        avatar_color: contact.avatar_color().map(pack_rgb),
    }
}

fn pack_rgb(color: phonebook_core::Rgb) -> u32 {
    (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b)
}

fn to_entry_response(form: &EntryFormState, message: String) -> EntryFormResponse {
    let details = form.details();
    EntryFormResponse {
        contact_id: details.id,
        photo: details.photo.clone(),
        name: details.name.clone(),
        surname: details.surname.clone(),
        category: details.category.as_str().to_string(),
        numbers: details.phones.iter().map(|p| p.number.clone()).collect(),
        number_types: details
            .phones
            .iter()
            .map(|p| p.number_type.as_str().to_string())
            .collect(),
        email: details.email.clone(),
        notes: details.notes.clone(),
        name_error: error_text(form.name_state()),
        number_error: error_text(form.number_state()),
        email_error: error_text(form.email_state()),
        is_entry_valid: form.is_entry_valid(),
        is_enabled_more: form.is_enabled_more(),
        message,
    }
}

fn error_text(state: FieldState) -> String {
    state
        .error()
        .map(|err| err.message().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{
        contacts_refresh, contacts_set_search, core_version, entry_add_number,
        entry_begin_create, entry_begin_edit, entry_save, entry_update, init_logging, pack_rgb,
        ping, to_details, to_list_response, EntryFormInput,
    };
    use phonebook_core::{Category, CategoryFilter, Contact, ContactListState, ListEvent, Rgb};
    use std::sync::{Mutex, MutexGuard};
    use std::time::{SystemTime, UNIX_EPOCH};

    // Entry and list slots are process-wide; flows touching them run serially.
    static FLOW_LOCK: Mutex<()> = Mutex::new(());

    fn flow_guard() -> MutexGuard<'static, ()> {
        FLOW_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn input(numbers: &[&str], types: &[&str]) -> EntryFormInput {
        EntryFormInput {
            photo: String::new(),
            name: "Amy".to_string(),
            surname: String::new(),
            category: "family".to_string(),
            numbers: numbers.iter().map(|n| n.to_string()).collect(),
            number_types: types.iter().map(|t| t.to_string()).collect(),
            email: String::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn to_details_pairs_numbers_with_types() {
        let details = to_details(4, input(&["1", "2"], &["HOME", "work"])).unwrap();
        assert_eq!(details.id, 4);
        assert_eq!(details.category, Category::Family);
        assert_eq!(details.phones.len(), 2);
        assert_eq!(details.phones[1].number, "2");
    }

    #[test]
    fn to_details_rejects_mismatched_or_unknown_values() {
        assert!(to_details(0, input(&["1", "2"], &["HOME"])).is_none());
        assert!(to_details(0, input(&["1"], &["FAX"])).is_none());

        let mut bad_category = input(&["1"], &["HOME"]);
        bad_category.category = "ENEMIES".to_string();
        assert!(to_details(0, bad_category).is_none());
    }

    #[test]
    fn list_response_reports_empty_state() {
        let state = ContactListState::new(vec![Contact::new("Amy", "1")]).apply(
            ListEvent::CategoryFilterChanged(CategoryFilter::Only(Category::Work)),
        );
        let response = to_list_response(&state, None);
        assert!(response.is_empty);
        assert!(response.sections.is_empty());
        assert_eq!(response.message, "No contacts.");
        assert_eq!(response.category_filter.as_deref(), Some("WORK"));
    }

    #[test]
    fn list_response_flattens_rows() {
        let mut unnamed = Contact::new("", "2");
        unnamed.category = Category::None;
        let state = ContactListState::new(vec![Contact::new("amy", "1"), unnamed]);
        let response = to_list_response(&state, None);

        assert_eq!(response.sections.len(), 2);
        assert_eq!(response.sections[0].key, "#");
        let unnamed_row = &response.sections[0].rows[0];
        assert_eq!(unnamed_row.initial, "");
        assert_eq!(unnamed_row.avatar_color, None);
        assert_eq!(unnamed_row.category_color, None);

        let amy_row = &response.sections[1].rows[0];
        assert_eq!(amy_row.initial, "A");
        assert_eq!(amy_row.category, "FAMILY");
        assert!(amy_row.category_color.is_some());
    }

    #[test]
    fn pack_rgb_orders_channels() {
        assert_eq!(pack_rgb(Rgb::new(0x12, 0x34, 0x56)), 0x123456);
    }

    #[test]
    fn entry_flow_rejects_invalid_then_saves_and_reloads() {
        let _guard = flow_guard();
        let blank = entry_begin_create();
        assert_eq!(blank.contact_id, 0);
        assert_eq!(blank.number_types, vec!["HOME"]);

        let rejected = entry_save();
        assert!(!rejected.ok);
        let shown = entry_update(input(&[""], &["HOME"]));
        assert_eq!(shown.number_error, "Number is required");

        let name = unique_name("Amy");
        let mut values = input(&["+48123"], &["HOME"]);
        values.name = name.clone();
        let filled = entry_update(values);
        assert!(filled.is_entry_valid, "{}", filled.message);
        assert_eq!(filled.name_error, "");

        let extended = entry_add_number();
        assert_eq!(extended.number_types, vec!["HOME", "MOBILE"]);
        assert!(extended.is_enabled_more);

        let saved = entry_save();
        assert!(saved.ok, "{}", saved.message);
        let contact_id = saved.contact_id.expect("save should return contact_id");

        let reloaded = entry_begin_edit(contact_id);
        assert_eq!(reloaded.contact_id, contact_id);
        assert_eq!(reloaded.name, name);
        assert_eq!(reloaded.numbers, vec!["+48123", ""]);
        assert!(reloaded.is_entry_valid);
    }

    #[test]
    fn saving_new_form_twice_stores_one_contact() {
        let _guard = flow_guard();
        entry_begin_create();
        let name = unique_name("Twice");
        let mut values = input(&["123"], &["HOME"]);
        values.name = name.clone();
        entry_update(values);

        let first = entry_save();
        assert!(first.ok, "{}", first.message);
        let second = entry_save();
        assert!(second.ok, "{}", second.message);
        assert_eq!(first.contact_id, second.contact_id);

        contacts_refresh();
        let listed = contacts_set_search(name.clone());
        let rows = listed
            .sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .filter(|row| row.label == name)
            .count();
        assert_eq!(rows, 1);
        contacts_set_search(String::new());

        let restarted = entry_begin_create();
        assert_eq!(restarted.contact_id, 0);
    }

    fn unique_name(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}{}", nanos % 1_000_000)
    }
}
