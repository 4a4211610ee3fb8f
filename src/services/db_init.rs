use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    Collection, Database, IndexModel,
};

use crate::{
    error::{is_namespace_exists, SetupError, SetupResult},
    indexes::IndexSpec,
    schema::CollectionSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Applied,
    AlreadyApplied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub collection: String,
    pub collection_outcome: StepOutcome,
    pub indexes: Vec<(String, StepOutcome)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSummary {
    pub name: String,
    pub keys: Document,
}

/// Creates the validated collection, then each index in order.
///
/// Definitions already present and identical are left alone. Anything that
/// differs is an error, and steps applied before it stay applied.
pub async fn provision(
    db: &Database,
    spec: &CollectionSpec,
    indexes: &[IndexSpec],
) -> SetupResult<ProvisionReport> {
    let collection_outcome = ensure_collection(db, spec).await?;

    let col = db.collection::<Document>(&spec.name);
    let existing: Vec<IndexModel> = col.list_indexes(None).await?.try_collect().await?;

    let mut applied = Vec::with_capacity(indexes.len());
    for index in indexes {
        let outcome = ensure_index(&col, &existing, index).await?;
        applied.push((index.name.to_string(), outcome));
    }

    Ok(ProvisionReport {
        collection: spec.name.clone(),
        collection_outcome,
        indexes: applied,
    })
}

async fn ensure_collection(db: &Database, spec: &CollectionSpec) -> SetupResult<StepOutcome> {
    if let Some(options) = collection_options(db, &spec.name).await? {
        return compare_collection(spec, &options);
    }

    match db.create_collection(&spec.name, spec.create_options()).await {
        Ok(()) => {
            tracing::info!(collection = %spec.name, "collection created with schema validation");
            Ok(StepOutcome::Applied)
        }
        // created by someone else between the lookup and the create
        Err(e) if is_namespace_exists(&e) => {
            let options = collection_options(db, &spec.name).await?.unwrap_or_default();
            compare_collection(spec, &options)
        }
        Err(e) => Err(e.into()),
    }
}

fn compare_collection(spec: &CollectionSpec, options: &Document) -> SetupResult<StepOutcome> {
    if spec.matches_options(options) {
        tracing::info!(collection = %spec.name, "collection already provisioned");
        Ok(StepOutcome::AlreadyApplied)
    } else {
        tracing::warn!(collection = %spec.name, "collection exists with different validation");
        Err(SetupError::CollectionConflict {
            collection: spec.name.clone(),
        })
    }
}

/// The `options` of a collection as reported by `listCollections`, or `None`
/// when it does not exist.
pub async fn collection_options(db: &Database, name: &str) -> SetupResult<Option<Document>> {
    let reply = db
        .run_command(
            doc! { "listCollections": 1, "filter": { "name": name } },
            None,
        )
        .await?;

    Ok(first_batch(&reply)
        .into_iter()
        .next()
        .map(|c| c.get_document("options").cloned().unwrap_or_default()))
}

fn first_batch(reply: &Document) -> Vec<Document> {
    reply
        .get_document("cursor")
        .and_then(|c| c.get_array("firstBatch"))
        .map(|batch| {
            batch
                .iter()
                .filter_map(|b| b.as_document().cloned())
                .collect()
        })
        .unwrap_or_default()
}

async fn ensure_index(
    col: &Collection<Document>,
    existing: &[IndexModel],
    spec: &IndexSpec,
) -> SetupResult<StepOutcome> {
    match check_existing(existing, spec)? {
        Some(outcome) => {
            tracing::info!(index = spec.name, "index already exists");
            Ok(outcome)
        }
        None => {
            col.create_index(spec.to_model(), None).await?;
            tracing::info!(index = spec.name, keys = %spec.key_document(), "index created");
            Ok(StepOutcome::Applied)
        }
    }
}

/// `Some(AlreadyApplied)` when an identical index exists, `None` when it
/// must be created, and a conflict when the name or key spec is taken by a
/// different definition.
pub fn check_existing(existing: &[IndexModel], spec: &IndexSpec) -> SetupResult<Option<StepOutcome>> {
    let name_of = |m: &IndexModel| m.options.as_ref().and_then(|o| o.name.clone());

    if let Some(found) = existing.iter().find(|m| name_of(m).as_deref() == Some(spec.name)) {
        if spec.matches_existing(found) {
            return Ok(Some(StepOutcome::AlreadyApplied));
        }
        return Err(SetupError::IndexConflict {
            name: spec.name.to_string(),
            reason: format!("an index with this name already exists on {}", found.keys),
        });
    }

    if let Some(found) = existing.iter().find(|m| spec.same_keys(&m.keys)) {
        return Err(SetupError::IndexConflict {
            name: spec.name.to_string(),
            reason: format!(
                "key spec {} is already indexed as `{}`",
                spec.key_document(),
                name_of(found).unwrap_or_default()
            ),
        });
    }

    Ok(None)
}

pub async fn list_indexes(db: &Database, collection: &str) -> SetupResult<Vec<IndexSummary>> {
    let col = db.collection::<Document>(collection);
    let models: Vec<IndexModel> = col.list_indexes(None).await?.try_collect().await?;

    Ok(models
        .into_iter()
        .map(|m| IndexSummary {
            name: m.options.and_then(|o| o.name).unwrap_or_default(),
            keys: m.keys,
        })
        .collect())
}

/// Fails with the names of declared indexes the collection does not have.
pub async fn verify(db: &Database, collection: &str, indexes: &[IndexSpec]) -> SetupResult<()> {
    let names = db.collection::<Document>(collection).list_index_names().await?;

    let missing: Vec<String> = indexes
        .iter()
        .filter(|spec| !names.iter().any(|n| n == spec.name))
        .map(|spec| spec.name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SetupError::MissingIndexes(missing))
    }
}

/// Query planner output for a `find` with `filter`.
pub async fn explain_find(db: &Database, collection: &str, filter: Document) -> SetupResult<Document> {
    let plan = db
        .run_command(
            doc! {
                "explain": { "find": collection, "filter": filter },
                "verbosity": "queryPlanner",
            },
            None,
        )
        .await?;
    Ok(plan)
}

/// Name of the index the winning plan scans, or `None` for a collection scan.
pub fn winning_index(plan: &Document) -> Option<String> {
    let winning = plan
        .get_document("queryPlanner")
        .and_then(|q| q.get_document("winningPlan"))
        .ok()?;
    find_ixscan(winning)
}

fn find_ixscan(stage: &Document) -> Option<String> {
    if stage.get_str("stage").ok() == Some("IXSCAN") {
        return stage.get_str("indexName").ok().map(str::to_string);
    }

    // classic plans nest through inputStage(s); SBE plans wrap them in queryPlan
    stage.values().find_map(|v| match v {
        Bson::Document(d) => find_ixscan(d),
        Bson::Array(items) => items
            .iter()
            .filter_map(Bson::as_document)
            .find_map(find_ixscan),
        _ => None,
    })
}
