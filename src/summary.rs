//! Console text printed after setup. Human-readable only.

use mongodb::bson::{self, Bson};

use crate::{
    indexes::{indexed_fields, IndexSpec},
    models::User,
    schema::ObjectRule,
    services::db_init::{IndexSummary, ProvisionReport, StepOutcome},
};

pub fn status_lines(report: &ProvisionReport) -> String {
    let mut out = String::new();

    match report.collection_outcome {
        StepOutcome::Applied => out.push_str(&format!(
            "✅ {} collection created with schema validation\n",
            report.collection
        )),
        StepOutcome::AlreadyApplied => out.push_str(&format!(
            "ℹ️  {} collection already provisioned, validation unchanged\n",
            report.collection
        )),
    }

    for (name, outcome) in &report.indexes {
        match outcome {
            StepOutcome::Applied => out.push_str(&format!("✅ {name} created\n")),
            StepOutcome::AlreadyApplied => out.push_str(&format!("ℹ️  {name} already exists\n")),
        }
    }

    out
}

pub fn index_listing(indexes: &[IndexSummary]) -> String {
    let mut out = String::from("📋 All indexes:\n");
    for index in indexes {
        let keys = Bson::Document(index.keys.clone()).into_relaxed_extjson();
        out.push_str(&format!("  - {}: {}\n", index.name, keys));
    }
    out
}

pub fn requirements(rule: &ObjectRule, indexes: &[IndexSpec]) -> String {
    format!(
        "🔍 Required fields: {}\n🏷️  Indexed fields: {}\n",
        rule.required.join(", "),
        indexed_fields(indexes).join(", ")
    )
}

/// Pretty-printed JSON for `user`, dates in relaxed extended JSON.
pub fn example_document(user: &User) -> Result<String, bson::ser::Error> {
    let doc = bson::to_document(user)?;
    let json = Bson::Document(doc).into_relaxed_extjson();
    Ok(serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string()))
}
