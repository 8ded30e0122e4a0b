//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical contact record shared by list and entry views.
//! - Own the fixed `Category` and `NumberType` enumerations.
//! - Provide presentation helpers derived from contact fields.
//!
//! # Invariants
//! - `phones` is never empty.
//! - Number types are unique within one contact.
//! - `id == 0` means the contact has not been persisted yet.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned contact identifier.
pub type ContactId = i64;

/// Id used by contacts that were never persisted.
pub const UNSAVED_CONTACT_ID: ContactId = 0;

/// Section key used for contacts with an empty name.
pub const EMPTY_NAME_SECTION_KEY: char = '#';

const LIST_LABEL_MAX_CHARS: usize = 16;
const LIST_LABEL_KEEP_CHARS: usize = 13;

/// Contact grouping label shown as a colored badge in list rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// No badge is rendered.
    None,
    #[default]
    Family,
    Friends,
    Work,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 4] = [
        Category::None,
        Category::Family,
        Category::Friends,
        Category::Work,
    ];

    /// Stable storage and wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Family => "FAMILY",
            Self::Friends => "FRIENDS",
            Self::Work => "WORK",
        }
    }

    /// Parses a storage string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "NONE" => Some(Self::None),
            "FAMILY" => Some(Self::Family),
            "FRIENDS" => Some(Self::Friends),
            "WORK" => Some(Self::Work),
            _ => None,
        }
    }

    /// Badge color, `None` for `Category::None`.
    pub fn badge_color(self) -> Option<Rgb> {
        match self {
            Self::None => None,
            Self::Family => Some(Rgb::new(0xE5, 0x39, 0x35)),
            Self::Friends => Some(Rgb::new(0x43, 0xA0, 0x47)),
            Self::Work => Some(Rgb::new(0x1E, 0x88, 0xE5)),
        }
    }
}

/// Label attached to each phone slot.
///
/// The member count bounds how many phone slots one contact can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NumberType {
    Home,
    Mobile,
    Work,
    Other,
}

impl NumberType {
    /// All number types in slot allocation order.
    pub const ALL: [NumberType; 4] = [
        NumberType::Home,
        NumberType::Mobile,
        NumberType::Work,
        NumberType::Other,
    ];

    /// Stable storage and wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Mobile => "MOBILE",
            Self::Work => "WORK",
            Self::Other => "OTHER",
        }
    }

    /// Parses a storage string, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "HOME" => Some(Self::Home),
            "MOBILE" => Some(Self::Mobile),
            "WORK" => Some(Self::Work),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// One phone slot: the number text and its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneEntry {
    pub number: String,
    pub number_type: NumberType,
}

impl PhoneEntry {
    pub fn new(number: impl Into<String>, number_type: NumberType) -> Self {
        Self {
            number: number.into(),
            number_type,
        }
    }

    /// Empty slot with the given label.
    pub fn empty(number_type: NumberType) -> Self {
        Self::new(String::new(), number_type)
    }
}

/// 8-bit RGB color used for badges and avatars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Contact model validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    /// Contact carries no phone slot.
    EmptyPhones,
    /// The same number type is used by two slots.
    DuplicateNumberType(NumberType),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPhones => write!(f, "contact must have at least one phone slot"),
            Self::DuplicateNumberType(kind) => {
                write!(f, "number type `{}` is used more than once", kind.as_str())
            }
        }
    }
}

impl Error for ContactValidationError {}

/// Canonical contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ContactWire")]
pub struct Contact {
    /// Store-assigned id, `0` before first save.
    pub id: ContactId,
    /// Photo URI, empty when no photo was picked.
    pub photo: String,
    pub name: String,
    pub surname: String,
    pub category: Category,
    /// Ordered phone slots; the first slot is the primary number.
    pub phones: Vec<PhoneEntry>,
    pub email: String,
    pub notes: String,
}

#[derive(Deserialize)]
struct ContactWire {
    id: ContactId,
    #[serde(default)]
    photo: String,
    name: String,
    #[serde(default)]
    surname: String,
    #[serde(default)]
    category: Category,
    phones: Vec<PhoneEntry>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    notes: String,
}

impl TryFrom<ContactWire> for Contact {
    type Error = ContactValidationError;

    fn try_from(value: ContactWire) -> Result<Self, Self::Error> {
        let contact = Self {
            id: value.id,
            photo: value.photo,
            name: value.name,
            surname: value.surname,
            category: value.category,
            phones: value.phones,
            email: value.email,
            notes: value.notes,
        };
        contact.validate()?;
        Ok(contact)
    }
}

impl Contact {
    /// Creates an unsaved contact with one primary number.
    pub fn new(name: impl Into<String>, primary_number: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_CONTACT_ID,
            photo: String::new(),
            name: name.into(),
            surname: String::new(),
            category: Category::default(),
            phones: vec![PhoneEntry::new(primary_number, NumberType::ALL[0])],
            email: String::new(),
            notes: String::new(),
        }
    }

    /// Checks phone slot invariants.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.phones.is_empty() {
            return Err(ContactValidationError::EmptyPhones);
        }
        let mut seen = HashSet::with_capacity(self.phones.len());
        for phone in &self.phones {
            if !seen.insert(phone.number_type) {
                return Err(ContactValidationError::DuplicateNumberType(
                    phone.number_type,
                ));
            }
        }
        Ok(())
    }

    /// Returns whether the store has assigned an id.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_CONTACT_ID
    }

    /// Primary number text, empty when the slot list is somehow empty.
    pub fn primary_number(&self) -> &str {
        self.phones
            .first()
            .map_or("", |phone| phone.number.as_str())
    }

    /// Uppercased first character of the name, `#` for an empty name.
    pub fn section_key(&self) -> char {
        self.name
            .chars()
            .next()
            .and_then(|first| first.to_uppercase().next())
            .unwrap_or(EMPTY_NAME_SECTION_KEY)
    }

    /// `name surname`, or only `name` without a surname.
    pub fn full_name(&self) -> String {
        if self.surname.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.surname)
        }
    }

    /// Row label, shortened with `...` when it does not fit a list row.
    pub fn list_label(&self) -> String {
        let full = self.full_name();
        if full.chars().count() > LIST_LABEL_MAX_CHARS {
            let mut label: String = full.chars().take(LIST_LABEL_KEEP_CHARS).collect();
            label.push_str("...");
            label
        } else {
            full
        }
    }

    /// Avatar background, stable for the same id, initial and primary number.
    ///
    /// Returns `None` for an empty name; callers render a neutral avatar.
    pub fn avatar_color(&self) -> Option<Rgb> {
        let initial = self.name.chars().next()?;
        let id_hash = self.id as i32;
        let initial_hash = initial as u32 as i32;
        let number_hash = string_hash(self.primary_number());
        Some(Rgb::new(
            avatar_channel(id_hash, 17),
            avatar_channel(initial_hash, 31),
            avatar_channel(number_hash, 47),
        ))
    }
}

// Channel stays in 0..=255; negative remainders pull it below 128.
fn avatar_channel(hash: i32, factor: i32) -> u8 {
    (hash.wrapping_mul(factor) % 128 + 128) as u8
}

fn string_hash(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0_i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(i32::from(unit)))
}
