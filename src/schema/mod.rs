//! Collection validation rules expressed as data.
//!
//! An [`ObjectRule`] renders to the `$jsonSchema` body the server enforces on
//! every write, and [`ObjectRule::check`] evaluates the same rule in-process.

mod check;
mod user;

use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{CreateCollectionOptions, ValidationAction, ValidationLevel};

pub use check::{Violation, ViolationKind};
pub use user::{user_collection, user_schema};

/// BSON type names accepted by `bsonType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsonKind {
    ObjectId,
    String,
    Bool,
    Date,
    Array,
    Object,
}

impl BsonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BsonKind::ObjectId => "objectId",
            BsonKind::String => "string",
            BsonKind::Bool => "bool",
            BsonKind::Date => "date",
            BsonKind::Array => "array",
            BsonKind::Object => "object",
        }
    }

    pub fn matches(self, value: &Bson) -> bool {
        matches!(
            (self, value),
            (BsonKind::ObjectId, Bson::ObjectId(_))
                | (BsonKind::String, Bson::String(_))
                | (BsonKind::Bool, Bson::Boolean(_))
                | (BsonKind::Date, Bson::DateTime(_))
                | (BsonKind::Array, Bson::Array(_))
                | (BsonKind::Object, Bson::Document(_))
        )
    }
}

/// What happens to fields an object rule does not list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFields {
    #[default]
    Allow,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub kind: BsonKind,
    pub description: Option<&'static str>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub allowed: Option<Vec<&'static str>>,
    pub min_items: Option<u32>,
    pub unique_items: bool,
    pub items: Option<Box<FieldRule>>,
    pub object: Option<Box<ObjectRule>>,
}

impl FieldRule {
    pub fn new(kind: BsonKind) -> Self {
        Self {
            kind,
            description: None,
            min_length: None,
            max_length: None,
            allowed: None,
            min_items: None,
            unique_items: false,
            items: None,
            object: None,
        }
    }

    pub fn string() -> Self {
        Self::new(BsonKind::String)
    }

    pub fn boolean() -> Self {
        Self::new(BsonKind::Bool)
    }

    pub fn date() -> Self {
        Self::new(BsonKind::Date)
    }

    /// An object with no declared shape.
    pub fn any_object() -> Self {
        Self::new(BsonKind::Object)
    }

    pub fn object(rule: ObjectRule) -> Self {
        let mut field = Self::new(BsonKind::Object);
        field.object = Some(Box::new(rule));
        field
    }

    pub fn array_of(items: FieldRule) -> Self {
        let mut field = Self::new(BsonKind::Array);
        field.items = Some(Box::new(items));
        field
    }

    /// A string restricted to a fixed vocabulary.
    pub fn one_of(terms: Vec<&'static str>) -> Self {
        let mut field = Self::string();
        field.allowed = Some(terms);
        field
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    pub fn length(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn max_len(self, max: u32) -> Self {
        let min = self.min_length;
        self.length(min, Some(max))
    }

    pub fn non_empty(mut self) -> Self {
        self.min_items = Some(1);
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique_items = true;
        self
    }

    pub fn to_document(&self) -> Document {
        let mut out = doc! { "bsonType": self.kind.as_str() };

        if let Some(d) = self.description {
            out.insert("description", d);
        }
        if let Some(n) = self.min_length {
            out.insert("minLength", n as i64);
        }
        if let Some(n) = self.max_length {
            out.insert("maxLength", n as i64);
        }
        if let Some(terms) = &self.allowed {
            out.insert("enum", terms.clone());
        }
        if let Some(n) = self.min_items {
            out.insert("minItems", n as i64);
        }
        if self.unique_items {
            out.insert("uniqueItems", true);
        }
        if let Some(items) = &self.items {
            out.insert("items", items.to_document());
        }
        if let Some(object) = &self.object {
            object.render_into(&mut out);
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectRule {
    pub title: Option<&'static str>,
    pub required: Vec<&'static str>,
    pub properties: Vec<(&'static str, FieldRule)>,
    pub unknown_fields: UnknownFields,
}

impl ObjectRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    pub fn required(mut self, name: &'static str, rule: FieldRule) -> Self {
        self.required.push(name);
        self.properties.push((name, rule));
        self
    }

    pub fn optional(mut self, name: &'static str, rule: FieldRule) -> Self {
        self.properties.push((name, rule));
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    pub fn property(&self, name: &str) -> Option<&FieldRule> {
        self.properties
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, rule)| rule)
    }

    /// The `$jsonSchema` body for this rule.
    pub fn to_json_schema(&self) -> Document {
        let mut out = doc! { "bsonType": "object" };
        if let Some(t) = self.title {
            out.insert("title", t);
        }
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut Document) {
        if !self.required.is_empty() {
            out.insert("required", self.required.clone());
        }

        let mut props = Document::new();
        for (name, rule) in &self.properties {
            props.insert(*name, rule.to_document());
        }
        out.insert("properties", props);

        if self.unknown_fields == UnknownFields::Reject {
            out.insert("additionalProperties", false);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Off,
    Moderate,
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Warn,
    Error,
}

/// How the server applies the validator to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    pub level: Level,
    pub action: Action,
}

impl ValidationPolicy {
    /// Every insert and update must pass; violations refuse the write.
    pub const STRICT_ERROR: ValidationPolicy = ValidationPolicy {
        level: Level::Strict,
        action: Action::Error,
    };

    pub fn level_name(&self) -> &'static str {
        match self.level {
            Level::Off => "off",
            Level::Moderate => "moderate",
            Level::Strict => "strict",
        }
    }

    pub fn action_name(&self) -> &'static str {
        match self.action {
            Action::Warn => "warn",
            Action::Error => "error",
        }
    }
}

/// A collection together with the rule and policy it is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub rule: ObjectRule,
    pub policy: ValidationPolicy,
}

impl CollectionSpec {
    pub fn validator(&self) -> Document {
        doc! { "$jsonSchema": self.rule.to_json_schema() }
    }

    pub fn create_options(&self) -> CreateCollectionOptions {
        let level = match self.policy.level {
            Level::Off => ValidationLevel::Off,
            Level::Moderate => ValidationLevel::Moderate,
            Level::Strict => ValidationLevel::Strict,
        };
        let action = match self.policy.action {
            Action::Warn => ValidationAction::Warn,
            Action::Error => ValidationAction::Error,
        };

        CreateCollectionOptions::builder()
            .validator(self.validator())
            .validation_level(level)
            .validation_action(action)
            .build()
    }

    /// Whether `options` (as reported by `listCollections`) carry exactly
    /// this validator and policy. Absent level/action mean the server
    /// defaults, `strict` and `error`.
    pub fn matches_options(&self, options: &Document) -> bool {
        let level = options.get_str("validationLevel").unwrap_or("strict");
        let action = options.get_str("validationAction").unwrap_or("error");

        let same_validator = options
            .get_document("validator")
            .map(|v| same_document(v, &self.validator()))
            .unwrap_or(false);

        same_validator && level == self.policy.level_name() && action == self.policy.action_name()
    }
}

/// Structural equality that treats all numeric BSON types as numbers.
pub(crate) fn same_document(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a.iter().all(|(k, va)| b.get(k).is_some_and(|vb| same_value(va, vb)))
}

fn same_value(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Document(x), Bson::Document(y)) => same_document(x, y),
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| same_value(p, q))
        }
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

pub(crate) fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}
