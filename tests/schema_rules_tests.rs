use mongodb::bson::{self, doc, Bson, DateTime, Document};

use edulift::models::{Profile, RiskFlag, Role, User};
use edulift::schema::{user_schema, BsonKind, ViolationKind};

fn minimal() -> Document {
    doc! {
        "roles": ["student"],
        "email": "jane.doe@example.com",
        "createdAt": DateTime::now(),
    }
}

fn kinds(doc: &Document) -> Vec<(String, ViolationKind)> {
    match user_schema().check(doc) {
        Ok(()) => Vec::new(),
        Err(errs) => errs.into_iter().map(|v| (v.path, v.kind)).collect(),
    }
}

#[test]
fn minimal_record_is_accepted() {
    assert!(kinds(&minimal()).is_empty());
}

#[test]
fn each_required_field_is_enforced() {
    for field in ["roles", "email", "createdAt"] {
        let mut doc = minimal();
        doc.remove(field);
        assert_eq!(kinds(&doc), vec![(field.to_string(), ViolationKind::Missing)]);
    }
}

#[test]
fn roles_outside_vocabulary_are_rejected() {
    let mut doc = minimal();
    doc.insert("roles", vec!["student", "teacher"]);
    assert_eq!(
        kinds(&doc),
        vec![("roles.1".to_string(), ViolationKind::NotInVocabulary("teacher".into()))]
    );
}

#[test]
fn roles_must_be_non_empty_and_unique() {
    let mut doc = minimal();
    doc.insert("roles", Bson::Array(vec![]));
    assert!(matches!(kinds(&doc)[0].1, ViolationKind::TooFewItems { min: 1, actual: 0 }));

    doc.insert("roles", vec!["mentor", "mentor"]);
    assert_eq!(kinds(&doc), vec![("roles".to_string(), ViolationKind::DuplicateItem)]);
}

#[test]
fn every_risk_flag_term_is_accepted_and_others_rejected() {
    let mut doc = minimal();
    doc.insert("riskFlags", RiskFlag::terms());
    assert!(kinds(&doc).is_empty());

    doc.insert("riskFlags", vec!["academic_risk", "legal_risk"]);
    assert_eq!(
        kinds(&doc),
        vec![("riskFlags.1".to_string(), ViolationKind::NotInVocabulary("legal_risk".into()))]
    );
}

#[test]
fn profile_first_name_length_boundary() {
    let mut doc = minimal();
    doc.insert("profile", doc! { "firstName": "a".repeat(50) });
    assert!(kinds(&doc).is_empty());

    doc.insert("profile", doc! { "firstName": "a".repeat(51) });
    assert_eq!(
        kinds(&doc),
        vec![("profile.firstName".to_string(), ViolationKind::TooLong { max: 50, actual: 51 })]
    );
}

#[test]
fn group_home_id_bounds() {
    let mut doc = minimal();
    doc.insert("groupHomeId", "");
    assert!(matches!(kinds(&doc)[0].1, ViolationKind::TooShort { min: 1, actual: 0 }));

    doc.insert("groupHomeId", "g".repeat(101));
    assert!(matches!(kinds(&doc)[0].1, ViolationKind::TooLong { max: 100, .. }));

    doc.insert("groupHomeId", "g".repeat(100));
    assert!(kinds(&doc).is_empty());
}

#[test]
fn wrong_primitive_kinds_are_rejected() {
    let mut doc = minimal();
    doc.insert("createdAt", "2024-01-01T00:00:00Z");
    doc.insert("consentFlags", doc! { "communicationConsent": "yes" });
    doc.insert("preferences", doc! { "language": "xx" });

    assert_eq!(
        kinds(&doc),
        vec![
            ("createdAt".to_string(), ViolationKind::WrongType { expected: BsonKind::Date }),
            (
                "consentFlags.communicationConsent".to_string(),
                ViolationKind::WrongType { expected: BsonKind::Bool },
            ),
            ("preferences.language".to_string(), ViolationKind::NotInVocabulary("xx".into())),
        ]
    );
}

#[test]
fn extra_fields_are_allowed_at_every_level() {
    let mut doc = minimal();
    doc.insert("nickname", "jd");
    doc.insert("profile", doc! { "pronouns": "they/them", "additionalInfo": { "a": { "b": [1, 2] } } });
    doc.insert("preferences", doc! { "theme": "dark", "customPreferences": { "x": true } });
    assert!(kinds(&doc).is_empty());
}

#[test]
fn legacy_fields_are_independent_of_profile() {
    let mut doc = minimal();
    doc.insert("firstName", "Janet");
    doc.insert("profile", doc! { "firstName": "Jane" });
    doc.insert("username", "u".repeat(51));
    assert_eq!(
        kinds(&doc),
        vec![("username".to_string(), ViolationKind::TooLong { max: 50, actual: 51 })]
    );
}

#[test]
fn records_written_by_the_model_pass_the_rule() {
    let example = bson::to_document(&User::example()).unwrap();
    assert!(kinds(&example).is_empty());

    let mut user = User::new(vec![Role::Counselor, Role::Admin], "c@example.com");
    user.risk_flags = RiskFlag::ALL.to_vec();
    user.profile = Some(Profile {
        address: Some("x".repeat(200)),
        ..Profile::default()
    });
    assert!(kinds(&bson::to_document(&user).unwrap()).is_empty());
}

// (dotted path, maxLength) for every bounded string in the user rule
const MAX_LENGTHS: &[(&str, usize)] = &[
    ("email", 255),
    ("groupHomeId", 100),
    ("profile.firstName", 50),
    ("profile.lastName", 50),
    ("profile.address", 200),
    ("profile.emergencyContact", 100),
    ("preferences.timezone", 50),
    ("username", 50),
    ("firstName", 50),
    ("lastName", 50),
];

fn with_string(path: &str, value: String) -> Document {
    let mut doc = minimal();
    match path.split_once('.') {
        Some((parent, field)) => {
            let mut inner = Document::new();
            inner.insert(field, value);
            doc.insert(parent, inner);
        }
        None => {
            doc.insert(path, value);
        }
    }
    doc
}

#[test]
fn every_length_bound_accepts_max_and_rejects_one_more() {
    for (path, max) in MAX_LENGTHS {
        assert!(kinds(&with_string(path, "x".repeat(*max))).is_empty(), "{path} at {max}");

        assert_eq!(
            kinds(&with_string(path, "x".repeat(max + 1))),
            vec![(
                path.to_string(),
                ViolationKind::TooLong { max: *max as u32, actual: max + 1 },
            )],
            "{path} at {}",
            max + 1
        );
    }
}

#[test]
fn length_table_covers_every_bounded_field() {
    let schema = user_schema();
    let mut bounded = Vec::new();
    for (name, rule) in &schema.properties {
        if rule.max_length.is_some() {
            bounded.push(name.to_string());
        }
        if let Some(object) = &rule.object {
            for (field, inner) in &object.properties {
                if inner.max_length.is_some() {
                    bounded.push(format!("{name}.{field}"));
                }
            }
        }
    }
    bounded.sort();

    let mut listed: Vec<String> = MAX_LENGTHS.iter().map(|(p, _)| p.to_string()).collect();
    listed.sort();

    assert_eq!(bounded, listed);
}
