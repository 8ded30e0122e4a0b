//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/read/delete APIs over `contacts` + `contact_numbers`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Contact::validate()` before SQL mutations.
//! - A contact row and its phone rows are written in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::contact::{
    Category, Contact, ContactId, ContactValidationError, NumberType, PhoneEntry,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    photo,
    name,
    surname,
    category,
    email,
    notes
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact storage.
pub trait ContactRepository {
    /// Inserts a new contact (`id == 0`) or replaces an existing one.
    ///
    /// Returns the id the contact is stored under.
    fn insert_contact(&mut self, contact: &Contact) -> RepoResult<ContactId>;
    /// Gets one contact with its phone slots.
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Lists all contacts in insertion order.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    /// Deletes one contact; `NotFound` when absent.
    fn delete_contact(&mut self, id: ContactId) -> RepoResult<()>;
    /// Deletes every listed contact in one transaction, returns removed rows.
    fn delete_contacts(&mut self, ids: &[ContactId]) -> RepoResult<usize>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn insert_contact(&mut self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = if contact.is_persisted() {
            upsert_contact_row(&tx, contact)?;
            contact.id
        } else {
            insert_contact_row(&tx, contact)?
        };
        replace_phone_rows(&tx, id, &contact.phones)?;
        tx.commit()?;

        Ok(id)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(self.conn, row)?);
        }
        Ok(contacts)
    }

    fn delete_contact(&mut self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_contacts(&mut self, ids: &[ContactId]) -> RepoResult<usize> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut removed = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM contacts WHERE id = ?1;")?;
            for id in ids {
                removed += stmt.execute([id])?;
            }
        }
        tx.commit()?;
        Ok(removed)
    }
}

fn insert_contact_row(tx: &Transaction<'_>, contact: &Contact) -> RepoResult<ContactId> {
    tx.execute(
        "INSERT INTO contacts (
            photo,
            name,
            surname,
            category,
            email,
            notes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            contact.photo.as_str(),
            contact.name.as_str(),
            contact.surname.as_str(),
            contact.category.as_str(),
            contact.email.as_str(),
            contact.notes.as_str(),
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn upsert_contact_row(tx: &Transaction<'_>, contact: &Contact) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO contacts (
            id,
            photo,
            name,
            surname,
            category,
            email,
            notes
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(id) DO UPDATE SET
            photo = excluded.photo,
            name = excluded.name,
            surname = excluded.surname,
            category = excluded.category,
            email = excluded.email,
            notes = excluded.notes,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![
            contact.id,
            contact.photo.as_str(),
            contact.name.as_str(),
            contact.surname.as_str(),
            contact.category.as_str(),
            contact.email.as_str(),
            contact.notes.as_str(),
        ],
    )?;
    Ok(())
}

fn replace_phone_rows(
    tx: &Transaction<'_>,
    contact_id: ContactId,
    phones: &[PhoneEntry],
) -> RepoResult<()> {
    tx.execute(
        "DELETE FROM contact_numbers WHERE contact_id = ?1;",
        [contact_id],
    )?;
    let mut stmt = tx.prepare(
        "INSERT INTO contact_numbers (
            contact_id,
            position,
            number,
            number_type
        ) VALUES (?1, ?2, ?3, ?4);",
    )?;
    for (position, phone) in phones.iter().enumerate() {
        stmt.execute(params![
            contact_id,
            position as i64,
            phone.number.as_str(),
            phone.number_type.as_str(),
        ])?;
    }
    Ok(())
}

fn parse_contact_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;

    let category_text: String = row.get("category")?;
    let category = Category::parse(&category_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid category `{category_text}` in contacts.category"
        ))
    })?;

    let contact = Contact {
        id,
        photo: row.get("photo")?,
        name: row.get("name")?,
        surname: row.get("surname")?,
        category,
        phones: load_phones(conn, id)?,
        email: row.get("email")?,
        notes: row.get("notes")?,
    };
    contact
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("contact {id}: {err}")))?;
    Ok(contact)
}

fn load_phones(conn: &Connection, contact_id: ContactId) -> RepoResult<Vec<PhoneEntry>> {
    let mut stmt = conn.prepare(
        "SELECT number, number_type
         FROM contact_numbers
         WHERE contact_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([contact_id])?;
    let mut phones = Vec::new();
    while let Some(row) = rows.next()? {
        let type_text: String = row.get("number_type")?;
        let number_type = NumberType::parse(&type_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid number type `{type_text}` in contact_numbers.number_type"
            ))
        })?;
        phones.push(PhoneEntry {
            number: row.get("number")?,
            number_type,
        });
    }
    Ok(phones)
}
