//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `phonebook_core` linkage without the Flutter runtime.
//! - Print the sectioned contact list of a database file when one is given.
//!
//! Usage: `phonebook_cli [db-path] [search-text]`

use phonebook_core::db::open_db;
use phonebook_core::{ContactListState, ContactService, ListEvent, SqliteContactRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("phonebook_core ping={}", phonebook_core::ping());
    println!("phonebook_core version={}", phonebook_core::core_version());

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };
    let search_text = args.next().unwrap_or_default();

    match print_sections(&db_path, search_text) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("phonebook_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_sections(db_path: &str, search_text: String) -> Result<(), Box<dyn std::error::Error>> {
    let mut conn = open_db(db_path)?;
    let service = ContactService::new(SqliteContactRepository::new(&mut conn));
    let state = ContactListState::new(service.list_contacts()?)
        .apply(ListEvent::SearchChanged(search_text));

    if state.is_empty() {
        println!("No contacts.");
        return Ok(());
    }
    for section in state.sections() {
        println!("{}", section.key);
        for contact in &section.contacts {
            println!(
                "  [{}] {} ({})",
                contact.id,
                contact.list_label(),
                contact.category.as_str().to_lowercase()
            );
        }
    }
    Ok(())
}
