use serde::{Deserialize, Deserializer, Serialize};

use super::error::CatalogError;

/// Sentinel reported as `top_author` when the catalog is empty.
pub const NO_TOP_AUTHOR: &str = "N/A";

/// A book record held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Identifier assigned by the catalog, never reused
    pub id: u64,
    /// Title of the book
    pub title: String,
    /// Author of the book
    pub author: String,
    /// Publication year
    pub year: i32,
    /// Whether the book has been read
    pub read: bool,
}

/// Request model for creating a new book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub year: i32,
    #[serde(default)]
    pub read: bool,
}

impl CreateBook {
    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        require_text("title", &self.title)?;
        require_text("author", &self.author)
    }
}

/// Fields to change on an existing book; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub read: Option<bool>,
}

impl UpdateBook {
    /// Whether the update touches the duplicate-checked pair.
    pub fn changes_identity(&self) -> bool {
        self.title.is_some() || self.author.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(author) = &self.author {
            require_text("author", author)?;
        }
        Ok(())
    }
}

/// Wire form of a partial update.
///
/// Distinguishes an absent key (outer `None`) from an explicit `null`
/// (`Some(None)`), which is rejected since no book field is nullable.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default, deserialize_with = "present")]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    author: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "present")]
    read: Option<Option<bool>>,
}

impl TryFrom<UpdateBookRequest> for UpdateBook {
    type Error = CatalogError;

    fn try_from(request: UpdateBookRequest) -> Result<Self, Self::Error> {
        Ok(UpdateBook {
            title: non_null("title", request.title)?,
            author: non_null("author", request.author)?,
            year: non_null("year", request.year)?,
            read: non_null("read", request.read)?,
        })
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn non_null<T>(field: &'static str, value: Option<Option<T>>) -> Result<Option<T>, CatalogError> {
    match value {
        Some(None) => Err(CatalogError::Validation {
            field,
            reason: "must not be null",
        }),
        Some(Some(value)) => Ok(Some(value)),
        None => Ok(None),
    }
}

fn require_text(field: &'static str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation {
            field,
            reason: "must not be empty",
        });
    }
    Ok(())
}

/// Aggregate figures over the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStats {
    pub count: usize,
    pub read_count: usize,
    pub top_author: String,
}

/// One page of a list query plus the number of matches before paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub items: Vec<Book>,
    pub total: usize,
}
