//! Index definitions for the users collection.
//!
//! - `{ "email": 1 }` unique, sparse - point lookup; absent emails never collide
//! - `{ "groupHomeId": 1 }` - scope filter
//! - `{ "roles": 1 }` - multikey, role membership
//! - `{ "roles": 1, "groupHomeId": 1 }` - "role X in group Y"
//! - `{ "createdAt": -1 }` - newest-first sort and range
//! - `{ "riskFlags": 1 }` - multikey, triage filter

use mongodb::{
    bson::{Bson, Document},
    options::IndexOptions,
    IndexModel,
};

use crate::schema::as_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_i32(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: &'static str,
    pub keys: Vec<(&'static str, Direction)>,
    pub unique: bool,
    pub sparse: bool,
}

impl IndexSpec {
    pub fn new(name: &'static str, keys: Vec<(&'static str, Direction)>) -> Self {
        Self {
            name,
            keys,
            unique: false,
            sparse: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn sparse(mut self) -> Self {
        self.sparse = true;
        self
    }

    pub fn key_document(&self) -> Document {
        let mut keys = Document::new();
        for (field, dir) in &self.keys {
            keys.insert(*field, dir.as_i32());
        }
        keys
    }

    pub fn to_model(&self) -> IndexModel {
        // only set the flags that are on, so the server echoes back the same options
        let mut options = IndexOptions::builder().name(self.name.to_string()).build();
        if self.unique {
            options.unique = Some(true);
        }
        if self.sparse {
            options.sparse = Some(true);
        }

        IndexModel::builder()
            .keys(self.key_document())
            .options(options)
            .build()
    }

    /// Same ordered key pattern as `keys`, directions compared numerically.
    pub fn same_keys(&self, keys: &Document) -> bool {
        keys.len() == self.keys.len()
            && keys.iter().zip(&self.keys).all(|((field, value), (want, dir))| {
                field == want && same_direction(value, *dir)
            })
    }

    /// Whether an index reported by `listIndexes` has exactly this definition.
    pub fn matches_existing(&self, existing: &IndexModel) -> bool {
        let opts = existing.options.as_ref();
        let name = opts.and_then(|o| o.name.as_deref());
        let unique = opts.and_then(|o| o.unique).unwrap_or(false);
        let sparse = opts.and_then(|o| o.sparse).unwrap_or(false);

        name == Some(self.name)
            && self.same_keys(&existing.keys)
            && unique == self.unique
            && sparse == self.sparse
    }

    /// Field names, with ` (unique)` on unique indexes.
    pub fn describe_fields(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|(field, _)| {
                if self.unique {
                    format!("{field} (unique)")
                } else {
                    field.to_string()
                }
            })
            .collect()
    }
}

fn same_direction(value: &Bson, dir: Direction) -> bool {
    as_number(value) == Some(dir.as_i32() as f64)
}

pub fn user_indexes() -> Vec<IndexSpec> {
    use Direction::{Ascending, Descending};

    vec![
        IndexSpec::new("email_unique_index", vec![("email", Ascending)])
            .unique()
            .sparse(),
        IndexSpec::new("groupHomeId_index", vec![("groupHomeId", Ascending)]),
        IndexSpec::new("roles_index", vec![("roles", Ascending)]),
        IndexSpec::new(
            "roles_groupHomeId_compound_index",
            vec![("roles", Ascending), ("groupHomeId", Ascending)],
        ),
        IndexSpec::new("createdAt_desc_index", vec![("createdAt", Descending)]),
        IndexSpec::new("riskFlags_index", vec![("riskFlags", Ascending)]),
    ]
}

/// Distinct indexed field names in declaration order, as shown in the setup summary.
pub fn indexed_fields(specs: &[IndexSpec]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for spec in specs {
        for (i, (field, _)) in spec.keys.iter().enumerate() {
            if out.iter().any(|f| f.split(' ').next() == Some(*field)) {
                continue;
            }
            out.push(spec.describe_fields()[i].clone());
        }
    }
    out
}
