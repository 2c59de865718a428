//! Map certification names to persisted certifications, creating the missing ones.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::domains::certifications::models::Certification;
use crate::kernel::{StoreResult, StoreTx};

/// Distinct, trimmed, non-blank names in first-seen order.
///
/// Matching is exact after trimming: "Organic" and "organic" are different
/// certifications.
pub fn distinct_names(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(*n))
        .map(str::to_string)
        .collect()
}

/// Resolve `names` to certifications inside the caller's transaction.
///
/// One batch lookup, then exactly one insert per distinct missing name. The
/// result follows the first-seen order of the distinct names. Empty input
/// touches nothing.
pub async fn reconcile_certifications(
    names: &[String],
    tx: &mut dyn StoreTx,
) -> StoreResult<Vec<Certification>> {
    let names = distinct_names(names);
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut by_name: HashMap<String, Certification> = tx
        .find_certifications_by_names(&names)
        .await?
        .into_iter()
        .map(|c| (c.name.clone(), c))
        .collect();

    debug!(
        requested = names.len(),
        existing = by_name.len(),
        "Looked up certifications"
    );

    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let certification = match by_name.remove(&name) {
            Some(existing) => existing,
            None => {
                let created = tx.insert_certification(&Certification::new(&name)).await?;
                info!(certification_id = %created.id, name = %created.name, "Created certification");
                created
            }
        };
        resolved.push(certification);
    }

    Ok(resolved)
}
