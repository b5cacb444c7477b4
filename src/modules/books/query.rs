//! List query normalization.
//!
//! Every list parameter is optional and nothing here fails: unknown sort
//! fields and directions fall back to their defaults, and out-of-range or
//! unparseable paging values are clamped.

use std::cmp::Ordering;

use serde::Deserialize;

use super::models::{Book, BookPage};

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Query string exactly as the client sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListParams {
    pub q: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Title,
    Author,
    Year,
}

impl SortField {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("author") => SortField::Author,
            Some("year") => SortField::Year,
            _ => SortField::Title,
        }
    }

    fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortField::Title => a.title.cmp(&b.title),
            SortField::Author => a.author.cmp(&b.author),
            SortField::Year => a.year.cmp(&b.year),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Normalized list parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Lowercased search text; `None` disables filtering
    pub q: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            q: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListParams {
    pub fn from_raw(raw: &RawListParams) -> Self {
        let q = raw
            .q
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let offset = parse_offset(raw.offset.as_deref());

        let limit = parse_int(raw.limit.as_deref())
            .and_then(|limit| usize::try_from(limit).ok())
            .filter(|limit| (1..=MAX_LIMIT).contains(limit))
            .unwrap_or(DEFAULT_LIMIT);

        Self {
            q,
            sort: SortField::parse(raw.sort.as_deref()),
            order: SortOrder::parse(raw.order.as_deref()),
            offset,
            limit,
        }
    }

    fn matches(&self, book: &Book) -> bool {
        match &self.q {
            Some(q) => {
                book.title.to_lowercase().contains(q.as_str())
                    || book.author.to_lowercase().contains(q.as_str())
            }
            None => true,
        }
    }

    /// Filter, sort, and page `books`, which must be in insertion order.
    ///
    /// The sort is stable in both directions: books comparing equal keep
    /// their insertion order.
    pub fn apply<'a>(&self, books: impl IntoIterator<Item = &'a Book>) -> BookPage {
        let mut matched: Vec<&Book> = books.into_iter().filter(|b| self.matches(b)).collect();

        match self.order {
            SortOrder::Asc => matched.sort_by(|a, b| self.sort.compare(a, b)),
            SortOrder::Desc => matched.sort_by(|a, b| self.sort.compare(b, a)),
        }

        let total = matched.len();
        let items = matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit)
            .cloned()
            .collect();

        BookPage { items, total }
    }
}

fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// Negative offsets clamp to 0; integers too large for `i64` still page past
/// every book.
fn parse_offset(value: Option<&str>) -> usize {
    let Some(value) = value.map(str::trim) else {
        return 0;
    };
    match value.parse::<i64>() {
        Ok(offset) => usize::try_from(offset).unwrap_or(0),
        Err(_) if is_unsigned_integer(value) => usize::MAX,
        Err(_) => 0,
    }
}

fn is_unsigned_integer(value: &str) -> bool {
    let digits = value.strip_prefix('+').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
