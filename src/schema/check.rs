use std::fmt;

use mongodb::bson::{Bson, Document};

use super::{BsonKind, FieldRule, ObjectRule, UnknownFields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType { expected: BsonKind },
    NotInVocabulary(String),
    TooShort { min: u32, actual: usize },
    TooLong { max: u32, actual: usize },
    TooFewItems { min: u32, actual: usize },
    DuplicateItem,
    UnknownField,
}

/// One failed rule, addressed by dotted path (`profile.firstName`, `roles.1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::Missing => write!(f, "{}: required field is missing", self.path),
            ViolationKind::WrongType { expected } => {
                write!(f, "{}: expected bsonType {}", self.path, expected.as_str())
            }
            ViolationKind::NotInVocabulary(v) => {
                write!(f, "{}: `{}` is not an allowed value", self.path, v)
            }
            ViolationKind::TooShort { min, actual } => {
                write!(f, "{}: length {} is below minLength {}", self.path, actual, min)
            }
            ViolationKind::TooLong { max, actual } => {
                write!(f, "{}: length {} exceeds maxLength {}", self.path, actual, max)
            }
            ViolationKind::TooFewItems { min, actual } => {
                write!(f, "{}: {} items, at least {} required", self.path, actual, min)
            }
            ViolationKind::DuplicateItem => write!(f, "{}: items must be unique", self.path),
            ViolationKind::UnknownField => write!(f, "{}: field is not allowed", self.path),
        }
    }
}

impl ObjectRule {
    /// Evaluates `doc` the way the server evaluates the rendered `$jsonSchema`.
    pub fn check(&self, doc: &Document) -> Result<(), Vec<Violation>> {
        let mut out = Vec::new();
        check_object(self, doc, "", &mut out);
        if out.is_empty() { Ok(()) } else { Err(out) }
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_object(rule: &ObjectRule, doc: &Document, prefix: &str, out: &mut Vec<Violation>) {
    for name in &rule.required {
        if !doc.contains_key(name) {
            out.push(Violation {
                path: join(prefix, name),
                kind: ViolationKind::Missing,
            });
        }
    }

    for (key, value) in doc {
        let path = join(prefix, key);
        match rule.property(key) {
            Some(field) => check_field(field, value, &path, out),
            None if rule.unknown_fields == UnknownFields::Reject => out.push(Violation {
                path,
                kind: ViolationKind::UnknownField,
            }),
            None => {}
        }
    }
}

fn check_field(rule: &FieldRule, value: &Bson, path: &str, out: &mut Vec<Violation>) {
    if !rule.kind.matches(value) {
        out.push(Violation {
            path: path.to_string(),
            kind: ViolationKind::WrongType { expected: rule.kind },
        });
        return;
    }

    match value {
        Bson::String(s) => {
            // lengths are counted in code points, not bytes
            let len = s.chars().count();
            if let Some(min) = rule.min_length {
                if len < min as usize {
                    out.push(Violation {
                        path: path.to_string(),
                        kind: ViolationKind::TooShort { min, actual: len },
                    });
                }
            }
            if let Some(max) = rule.max_length {
                if len > max as usize {
                    out.push(Violation {
                        path: path.to_string(),
                        kind: ViolationKind::TooLong { max, actual: len },
                    });
                }
            }
            if let Some(terms) = &rule.allowed {
                if !terms.iter().any(|t| *t == s.as_str()) {
                    out.push(Violation {
                        path: path.to_string(),
                        kind: ViolationKind::NotInVocabulary(s.clone()),
                    });
                }
            }
        }
        Bson::Array(items) => {
            if let Some(min) = rule.min_items {
                if items.len() < min as usize {
                    out.push(Violation {
                        path: path.to_string(),
                        kind: ViolationKind::TooFewItems { min, actual: items.len() },
                    });
                }
            }
            if rule.unique_items {
                let dup = items
                    .iter()
                    .enumerate()
                    .any(|(i, a)| items[..i].contains(a));
                if dup {
                    out.push(Violation {
                        path: path.to_string(),
                        kind: ViolationKind::DuplicateItem,
                    });
                }
            }
            if let Some(item_rule) = &rule.items {
                for (i, item) in items.iter().enumerate() {
                    check_field(item_rule, item, &format!("{path}.{i}"), out);
                }
            }
        }
        Bson::Document(inner) => {
            if let Some(object) = &rule.object {
                check_object(object, inner, path, out);
            }
        }
        _ => {}
    }
}
