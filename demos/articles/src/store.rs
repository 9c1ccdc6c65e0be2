//! Article storage.
//!
//! Handlers only see the [`ArticleStore`] trait; the service wires in
//! [`MemoryStore`], tests can wire in anything else.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// A published article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Numeric identifier, as it appears in `/articles/{articleID}`.
    pub id: String,
    /// URL slug, as it appears in `/articles/{articleSlug}`.
    pub slug: String,
    /// Title.
    pub title: String,
    /// Publication date, `YYYY-MM-DD`.
    pub published: String,
}

/// Fields accepted when creating or updating an article.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArticleDraft {
    /// Title.
    pub title: String,
    /// Slug; derived from the title when absent.
    #[serde(default)]
    pub slug: Option<String>,
    /// Publication date, `YYYY-MM-DD`.
    #[serde(default)]
    pub published: Option<String>,
}

/// Article storage used by the handlers.
pub trait ArticleStore: Send + Sync + 'static {
    /// Returns every article, oldest first.
    fn list(&self) -> Vec<Article>;

    /// Looks up an article by ID.
    fn get(&self, id: &str) -> Option<Article>;

    /// Looks up an article by slug.
    fn get_by_slug(&self, slug: &str) -> Option<Article>;

    /// Stores a new article and returns it.
    fn create(&self, draft: ArticleDraft) -> Article;

    /// Replaces the title of an existing article.
    fn update(&self, id: &str, draft: ArticleDraft) -> Option<Article>;

    /// Removes an article.
    fn delete(&self, id: &str) -> Option<Article>;
}

/// Shared handle to a store.
pub type SharedStore = Arc<dyn ArticleStore>;

#[derive(Debug, Default)]
struct Inner {
    articles: Vec<Article>,
    next_id: u64,
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a few sample articles.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::new();
        store.create(ArticleDraft {
            title: "Home is Toronto".to_string(),
            slug: None,
            published: Some("2017-01-16".to_string()),
        });
        store.create(ArticleDraft {
            title: "Routing in depth".to_string(),
            slug: Some("routing-in-depth".to_string()),
            published: Some("2017-03-02".to_string()),
        });
        store
    }
}

impl ArticleStore for MemoryStore {
    fn list(&self) -> Vec<Article> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.articles.clone()
    }

    fn get(&self, id: &str) -> Option<Article> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.articles.iter().find(|a| a.id == id).cloned()
    }

    fn get_by_slug(&self, slug: &str) -> Option<Article> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.articles.iter().find(|a| a.slug == slug).cloned()
    }

    fn create(&self, draft: ArticleDraft) -> Article {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.next_id += 1;

        let slug = draft.slug.unwrap_or_else(|| slugify(&draft.title));
        let article = Article {
            id: inner.next_id.to_string(),
            slug,
            title: draft.title,
            published: draft.published.unwrap_or_default(),
        };
        inner.articles.push(article.clone());
        article
    }

    fn update(&self, id: &str, draft: ArticleDraft) -> Option<Article> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let article = inner.articles.iter_mut().find(|a| a.id == id)?;

        article.title = draft.title;
        if let Some(slug) = draft.slug {
            article.slug = slug;
        }
        if let Some(published) = draft.published {
            article.published = published;
        }
        Some(article.clone())
    }

    fn delete(&self, id: &str) -> Option<Article> {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let index = inner.articles.iter().position(|a| a.id == id)?;
        Some(inner.articles.remove(index))
    }
}

/// Lowercases `title` and joins its words with `-`.
pub fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Home is Toronto"), "home-is-toronto");
        assert_eq!(slugify("  Rust, 2nd ed.  "), "rust-2nd-ed");
    }

    #[test]
    fn test_crud() {
        let store = MemoryStore::new();
        let created = store.create(ArticleDraft {
            title: "First Post".to_string(),
            ..ArticleDraft::default()
        });
        assert_eq!(created.id, "1");
        assert_eq!(created.slug, "first-post");

        assert_eq!(store.get("1"), Some(created.clone()));
        assert_eq!(store.get_by_slug("first-post"), Some(created));

        let updated = store
            .update(
                "1",
                ArticleDraft {
                    title: "Renamed".to_string(),
                    ..ArticleDraft::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.slug, "first-post");

        assert!(store.delete("1").is_some());
        assert!(store.get("1").is_none());
        assert!(store.delete("1").is_none());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let store = MemoryStore::seeded();
        store.delete("2");
        let created = store.create(ArticleDraft {
            title: "Third".to_string(),
            ..ArticleDraft::default()
        });
        assert_eq!(created.id, "3");
    }
}
