//! Contact use-case service.
//!
//! # Responsibility
//! - Provide the contact store entry points used by list and entry screens.
//! - Gate saves on entry form validity.
//! - Republish the full collection to observers after every write.
//!
//! # Invariants
//! - Invalid entry forms never reach the repository.
//! - Observers always receive the complete current collection, never a diff.
//! - Failed writes do not notify observers.
//! - A committed write is reported as success even when republishing fails.

use crate::model::contact::{Contact, ContactId};
use crate::repo::contact_repo::{ContactRepository, RepoError, RepoResult};
use crate::view::entry_form::EntryFormState;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Callback receiving the full contact collection.
pub type ContactObserver = Box<dyn FnMut(&[Contact])>;

/// Service error for contact use-cases.
#[derive(Debug)]
pub enum ContactServiceError {
    /// Save was requested while the entry form is invalid.
    InvalidEntry,
    /// Target contact does not exist.
    ContactNotFound(ContactId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntry => write!(f, "entry form has validation errors"),
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ContactNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Contact service facade over repository implementations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    observers: Vec<ContactObserver>,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            observers: Vec::new(),
        }
    }

    /// Registers an observer and immediately publishes the current collection.
    pub fn observe_all(
        &mut self,
        mut observer: impl FnMut(&[Contact]) + 'static,
    ) -> RepoResult<()> {
        let contacts = self.repo.list_contacts()?;
        observer(&contacts);
        self.observers.push(Box::new(observer));
        Ok(())
    }

    /// Inserts or replaces one contact and republishes the collection.
    pub fn insert_contact(&mut self, contact: &Contact) -> Result<ContactId, ContactServiceError> {
        let id = self.repo.insert_contact(contact)?;
        info!(
            "event=contact_insert module=service status=ok contact_id={id} phones={}",
            contact.phones.len()
        );
        self.publish();
        Ok(id)
    }

    /// Saves the entry form when it is valid.
    ///
    /// # Errors
    /// - `InvalidEntry` when `form.is_entry_valid()` is false; nothing is written.
    pub fn save_entry(&mut self, form: &EntryFormState) -> Result<ContactId, ContactServiceError> {
        if !form.is_entry_valid() {
            warn!("event=contact_save module=service status=rejected reason=invalid_entry");
            return Err(ContactServiceError::InvalidEntry);
        }
        self.insert_contact(&form.to_contact())
    }

    /// Loads a stored contact into an edit form.
    pub fn load_entry(&self, id: ContactId) -> Result<EntryFormState, ContactServiceError> {
        self.repo
            .get_contact(id)?
            .map(EntryFormState::from_contact)
            .ok_or(ContactServiceError::ContactNotFound(id))
    }

    /// Gets one contact by id.
    pub fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        self.repo.get_contact(id)
    }

    /// Lists all contacts in insertion order.
    pub fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        self.repo.list_contacts()
    }

    /// Deletes one contact by id.
    pub fn delete_contact(&mut self, id: ContactId) -> Result<(), ContactServiceError> {
        self.repo.delete_contact(id)?;
        info!("event=contact_delete module=service status=ok contact_id={id}");
        self.publish();
        Ok(())
    }

    /// Deletes every given contact; ids already gone are skipped.
    ///
    /// Returns the number of removed contacts.
    pub fn delete_all(&mut self, contacts: &[Contact]) -> Result<usize, ContactServiceError> {
        let ids = contacts
            .iter()
            .filter(|contact| contact.is_persisted())
            .map(|contact| contact.id)
            .collect::<Vec<_>>();
        let removed = self.repo.delete_contacts(&ids)?;
        info!(
            "event=contact_delete_all module=service status=ok requested={} removed={removed}",
            ids.len()
        );
        self.publish();
        Ok(removed)
    }

    fn publish(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        match self.repo.list_contacts() {
            Ok(contacts) => {
                for observer in &mut self.observers {
                    observer(&contacts);
                }
            }
            Err(err) => warn!(
                "event=contact_publish module=service status=error observers={} error={err}",
                self.observers.len()
            ),
        }
    }
}
