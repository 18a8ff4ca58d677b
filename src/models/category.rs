use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Catalog grouping record. Slugs are unique; the hierarchy is a single
/// optional parent level and is not checked for cycles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: String, slug: String, description: Option<String>, parent: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            slug,
            description,
            parent,
            created_at: Utc::now(),
        }
    }
}

/// Derive a URL slug from a display name: lowercase, runs of anything outside
/// `[a-z0-9]` collapse to a single `-`, leading/trailing dashes trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_single_word() {
        assert_eq!(slugify("Shoes"), "shoes");
    }

    #[test]
    fn slug_from_multiple_words() {
        assert_eq!(slugify("Running Shoes"), "running-shoes");
    }

    #[test]
    fn slug_collapses_symbol_runs_and_trims() {
        assert_eq!(slugify("  Hats & Caps!! "), "hats-caps");
        assert_eq!(slugify("--Sale--"), "sale");
    }

    #[test]
    fn slug_of_symbols_only_is_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
