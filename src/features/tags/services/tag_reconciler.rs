use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::tags::models::Tag;
use crate::shared::constants::MAX_TAG_LENGTH;

/// Lookup-or-create collaborator used by [`reconcile_tags`].
///
/// Implementations run inside the caller's unit of work, so tags created for
/// a write that later fails are rolled back with it.
#[async_trait]
pub trait TagSource: Send {
    /// Return the tag whose name matches `name` case-insensitively, creating
    /// it when none exists. Must be idempotent.
    async fn find_or_create_tag(&mut self, name: &str) -> Result<Tag>;
}

/// Map free-text tag names to tag records, one per case-insensitively distinct
/// name. Names are trimmed and blank entries ignored. The result order follows
/// first occurrence but carries no meaning.
pub async fn reconcile_tags<S>(names: &[String], source: &mut S) -> Result<Vec<Tag>>
where
    S: TagSource + ?Sized,
{
    let distinct = distinct_tag_names(names)?;

    let mut tags: Vec<Tag> = Vec::with_capacity(distinct.len());
    for name in &distinct {
        let tag = source.find_or_create_tag(name).await?;
        if !tags.iter().any(|t| t.id == tag.id) {
            tags.push(tag);
        }
    }

    debug!(
        "Reconciled {} submitted tag names into {} tags",
        names.len(),
        tags.len()
    );

    Ok(tags)
}

/// Validate and case-insensitively deduplicate names before touching storage
fn distinct_tag_names(names: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut distinct = Vec::new();

    for raw in names {
        let name = raw.trim();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::Validation(format!(
                "Tag '{}' exceeds {} characters",
                name, MAX_TAG_LENGTH
            )));
        }
        if seen.insert(name.to_lowercase()) {
            distinct.push(name.to_string());
        }
    }

    Ok(distinct)
}
