//! In-memory book catalog.

use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use super::error::CatalogError;
use super::models::{Book, BookPage, BookStats, CreateBook, UpdateBook, NO_TOP_AUTHOR};
use super::query::ListParams;

/// Thread-safe catalog of books.
///
/// One lock guards both the records and the id counter, so every mutation
/// runs its duplicate check and its write as a single step. Reads share the
/// lock and always see a consistent snapshot.
#[derive(Debug, Default)]
pub struct BookStore {
    inner: RwLock<Catalog>,
}

#[derive(Debug)]
struct Catalog {
    // Ids only grow, so key order is insertion order.
    books: BTreeMap<u64, Book>,
    next_id: u64,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            books: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// Duplicate-detection key: trimmed, lowercased title and author.
fn normalized_key(title: &str, author: &str) -> (String, String) {
    (title.trim().to_lowercase(), author.trim().to_lowercase())
}

impl Catalog {
    fn has_duplicate(&self, title: &str, author: &str, exclude_id: Option<u64>) -> bool {
        let key = normalized_key(title, author);
        self.books
            .values()
            .filter(|book| Some(book.id) != exclude_id)
            .any(|book| normalized_key(&book.title, &book.author) == key)
    }
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a book and assign it the next id.
    pub async fn create(&self, input: CreateBook) -> Result<Book, CatalogError> {
        input.validate()?;

        let mut catalog = self.inner.write().await;
        if catalog.has_duplicate(&input.title, &input.author, None) {
            return Err(CatalogError::Conflict {
                title: input.title,
                author: input.author,
            });
        }

        let id = catalog.next_id;
        catalog.next_id += 1;

        let book = Book {
            id,
            title: input.title,
            author: input.author,
            year: input.year,
            read: input.read,
        };
        catalog.books.insert(id, book.clone());

        tracing::info!(book_id = id, "book created");
        Ok(book)
    }

    /// Filter, sort, and page the catalog.
    pub async fn list(&self, params: &ListParams) -> BookPage {
        let catalog = self.inner.read().await;
        params.apply(catalog.books.values())
    }

    /// Apply the supplied fields to an existing book.
    ///
    /// Nothing is written unless every check passes.
    pub async fn update(&self, id: u64, update: UpdateBook) -> Result<Book, CatalogError> {
        update.validate()?;

        let mut catalog = self.inner.write().await;
        let current = catalog
            .books
            .get(&id)
            .ok_or(CatalogError::NotFound { id })?;

        if update.changes_identity() {
            let title = update.title.as_deref().unwrap_or(&current.title);
            let author = update.author.as_deref().unwrap_or(&current.author);
            if catalog.has_duplicate(title, author, Some(id)) {
                return Err(CatalogError::Conflict {
                    title: title.to_string(),
                    author: author.to_string(),
                });
            }
        }

        let book = catalog
            .books
            .get_mut(&id)
            .ok_or(CatalogError::NotFound { id })?;
        if let Some(title) = update.title {
            book.title = title;
        }
        if let Some(author) = update.author {
            book.author = author;
        }
        if let Some(year) = update.year {
            book.year = year;
        }
        if let Some(read) = update.read {
            book.read = read;
        }

        tracing::info!(book_id = id, "book updated");
        Ok(book.clone())
    }

    /// Remove a book permanently; its id is never handed out again.
    pub async fn delete(&self, id: u64) -> Result<(), CatalogError> {
        let mut catalog = self.inner.write().await;
        catalog
            .books
            .remove(&id)
            .ok_or(CatalogError::NotFound { id })?;

        tracing::info!(book_id = id, "book deleted");
        Ok(())
    }

    /// Totals over the whole catalog, ignoring any filter.
    ///
    /// `top_author` is the author with the most books; a tie goes to the
    /// lexicographically smallest name.
    pub async fn stats(&self) -> BookStats {
        let catalog = self.inner.read().await;

        let mut per_author: HashMap<&str, usize> = HashMap::new();
        let mut read_count = 0;
        for book in catalog.books.values() {
            *per_author.entry(book.author.as_str()).or_default() += 1;
            if book.read {
                read_count += 1;
            }
        }

        let top_author = per_author
            .into_iter()
            .max_by(|(a_name, a_count), (b_name, b_count)| {
                a_count.cmp(b_count).then_with(|| b_name.cmp(a_name))
            })
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| NO_TOP_AUTHOR.to_string());

        BookStats {
            count: catalog.books.len(),
            read_count,
            top_author,
        }
    }

    /// Number of books currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_book(title: &str, author: &str, year: i32) -> CreateBook {
        CreateBook {
            title: title.to_string(),
            author: author.to_string(),
            year,
            read: false,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = BookStore::new();
        let first = store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();
        let second = store.create(new_book("Emma", "Austen", 1815)).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.read);
    }

    #[tokio::test]
    async fn duplicate_is_detected_after_normalization() {
        let store = BookStore::new();
        store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();

        let err = store
            .create(new_book("  dUNE ", "HERBERT  ", 1990))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict { .. }));
        assert_eq!(store.len().await, 1);

        // Same title by a different author is fine
        store.create(new_book("Dune", "Someone Else", 2000)).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = BookStore::new();
        let a = store.create(new_book("A", "X", 1)).await.unwrap();
        let b = store.create(new_book("B", "X", 2)).await.unwrap();
        store.delete(b.id).await.unwrap();
        store.delete(a.id).await.unwrap();
        assert!(store.is_empty().await);

        let c = store.create(new_book("C", "X", 3)).await.unwrap();
        assert_eq!(c.id, 3);

        // Re-creating a deleted pair is allowed and still gets a fresh id
        let a_again = store.create(new_book("A", "X", 1)).await.unwrap();
        assert_eq!(a_again.id, 4);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let store = BookStore::new();
        store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();

        assert_eq!(
            store.delete(999).await,
            Err(CatalogError::NotFound { id: 999 })
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_applies_only_supplied_fields() {
        let store = BookStore::new();
        let book = store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();

        let updated = store
            .update(
                book.id,
                UpdateBook {
                    read: Some(true),
                    year: Some(1966),
                    ..UpdateBook::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, book.id);
        assert_eq!(updated.title, "Dune");
        assert_eq!(updated.author, "Herbert");
        assert_eq!(updated.year, 1966);
        assert!(updated.read);
    }

    #[tokio::test]
    async fn empty_update_returns_record_unchanged() {
        let store = BookStore::new();
        let book = store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();

        let updated = store.update(book.id, UpdateBook::default()).await.unwrap();
        assert_eq!(updated, book);
    }

    #[tokio::test]
    async fn update_conflict_leaves_record_untouched() {
        let store = BookStore::new();
        store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();
        let emma = store.create(new_book("Emma", "Herbert", 1815)).await.unwrap();

        // Only the title changes; the author is taken from the stored record
        let err = store
            .update(
                emma.id,
                UpdateBook {
                    title: Some("DUNE ".to_string()),
                    year: Some(2000),
                    read: Some(true),
                    ..UpdateBook::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict { .. }));

        let page = store.list(&ListParams::default()).await;
        assert_eq!(page.items[1], emma);
    }

    #[tokio::test]
    async fn update_may_keep_its_own_pair() {
        let store = BookStore::new();
        let book = store.create(new_book("Dune", "Herbert", 1965)).await.unwrap();

        let updated = store
            .update(
                book.id,
                UpdateBook {
                    title: Some("dune".to_string()),
                    ..UpdateBook::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "dune");
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = BookStore::new();
        let err = store.update(7, UpdateBook::default()).await.unwrap_err();
        assert_eq!(err, CatalogError::NotFound { id: 7 });
    }

    #[tokio::test]
    async fn stats_on_empty_catalog_uses_sentinel() {
        let stats = BookStore::new().stats().await;
        assert_eq!(
            stats,
            BookStats {
                count: 0,
                read_count: 0,
                top_author: NO_TOP_AUTHOR.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn stats_counts_reads_and_top_author() {
        let store = BookStore::new();
        store.create(new_book("One", "A", 2001)).await.unwrap();
        store.create(new_book("Two", "B", 2002)).await.unwrap();
        let mut third = new_book("Three", "A", 2003);
        third.read = true;
        store.create(third).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.count, 3);
        assert_eq!(stats.read_count, 1);
        assert_eq!(stats.top_author, "A");
    }

    #[tokio::test]
    async fn top_author_tie_goes_to_smallest_name() {
        let store = BookStore::new();
        store.create(new_book("One", "Zola", 1)).await.unwrap();
        store.create(new_book("Two", "Austen", 2)).await.unwrap();
        store.create(new_book("Three", "Zola", 3)).await.unwrap();
        store.create(new_book("Four", "Austen", 4)).await.unwrap();

        assert_eq!(store.stats().await.top_author, "Austen");
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_ids() {
        let store = Arc::new(BookStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create(new_book(&format!("Book {i}"), "Author", 2000))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn concurrent_duplicate_creates_admit_exactly_one() {
        let store = Arc::new(BookStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(new_book("Dune", "Herbert", 1965)).await.is_ok()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }
}
