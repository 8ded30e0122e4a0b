use phonebook_core::{
    Category, Contact, ContactValidationError, NumberType, PhoneEntry, UNSAVED_CONTACT_ID,
};

#[test]
fn contact_new_sets_defaults() {
    let contact = Contact::new("Amy", "123");

    assert_eq!(contact.id, UNSAVED_CONTACT_ID);
    assert!(!contact.is_persisted());
    assert_eq!(contact.category, Category::Family);
    assert_eq!(contact.phones, vec![PhoneEntry::new("123", NumberType::Home)]);
    assert_eq!(contact.primary_number(), "123");
    assert!(contact.photo.is_empty());
    assert!(contact.validate().is_ok());
}

#[test]
fn validate_rejects_empty_phones_and_duplicate_types() {
    let mut contact = Contact::new("Amy", "123");
    contact.phones.clear();
    assert_eq!(contact.validate(), Err(ContactValidationError::EmptyPhones));

    contact.phones = vec![
        PhoneEntry::new("1", NumberType::Work),
        PhoneEntry::new("2", NumberType::Work),
    ];
    assert_eq!(
        contact.validate(),
        Err(ContactValidationError::DuplicateNumberType(NumberType::Work))
    );
}

#[test]
fn section_key_uppercases_first_character() {
    assert_eq!(Contact::new("ann", "1").section_key(), 'A');
    assert_eq!(Contact::new("Łukasz", "1").section_key(), 'Ł');
    assert_eq!(Contact::new("ż", "1").section_key(), 'Ż');
    assert_eq!(Contact::new("7even", "1").section_key(), '7');
}

#[test]
fn section_key_uses_placeholder_for_empty_name() {
    assert_eq!(Contact::new("", "1").section_key(), '#');
}

#[test]
fn list_label_joins_surname_and_truncates_long_names() {
    let mut contact = Contact::new("Amy", "1");
    assert_eq!(contact.list_label(), "Amy");

    contact.surname = "Pond".to_string();
    assert_eq!(contact.full_name(), "Amy Pond");
    assert_eq!(contact.list_label(), "Amy Pond");

    contact.name = "Bartholomew".to_string();
    contact.surname = "Kowalczyk".to_string();
    assert_eq!(contact.list_label(), "Bartholomew K...");
}

#[test]
fn avatar_color_is_stable_and_absent_without_name() {
    let mut contact = Contact::new("Amy", "123");
    contact.id = 7;
    let first = contact.avatar_color().expect("named contact has avatar color");
    assert_eq!(contact.avatar_color(), Some(first));
    assert!(first.r >= 128 && first.g >= 128);

    contact.name.clear();
    assert_eq!(contact.avatar_color(), None);
}

#[test]
fn category_badges_skip_none() {
    assert_eq!(Category::None.badge_color(), None);
    for category in Category::ALL.into_iter().filter(|c| *c != Category::None) {
        assert!(category.badge_color().is_some());
    }
}

#[test]
fn enum_strings_roundtrip() {
    for category in Category::ALL {
        assert_eq!(Category::parse(category.as_str()), Some(category));
    }
    for kind in NumberType::ALL {
        assert_eq!(NumberType::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(NumberType::parse(" mobile "), Some(NumberType::Mobile));
    assert_eq!(Category::parse("colleagues"), None);
}

#[test]
fn contact_serialization_uses_expected_wire_fields() {
    let mut contact = Contact::new("Amy", "+48123");
    contact.id = 3;
    contact.category = Category::Work;
    contact.phones.push(PhoneEntry::new("555", NumberType::Mobile));
    contact.email = "amy@example.com".to_string();

    let json = serde_json::to_value(&contact).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["category"], "WORK");
    assert_eq!(json["phones"][0]["number"], "+48123");
    assert_eq!(json["phones"][0]["number_type"], "HOME");
    assert_eq!(json["phones"][1]["number_type"], "MOBILE");
    assert_eq!(json["email"], "amy@example.com");

    let decoded: Contact = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, contact);
}

#[test]
fn deserialize_rejects_duplicate_number_types() {
    let value = serde_json::json!({
        "id": 1,
        "name": "Amy",
        "phones": [
            { "number": "1", "number_type": "HOME" },
            { "number": "2", "number_type": "HOME" }
        ]
    });

    let err = serde_json::from_value::<Contact>(value).unwrap_err();
    assert!(
        err.to_string().contains("number type `HOME` is used more than once"),
        "unexpected error: {err}"
    );
}
