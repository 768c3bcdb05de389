use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::ApiError;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: u32,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }
}

/// Anything that can serve one page of `T` for a cursor.
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>, ApiError>;
}

/// Accumulates cursor pages the way an infinite-scroll list does.
///
/// A failed fetch leaves the accumulated pages and cursor untouched, so
/// calling `fetch_next` again retries the same page.
pub struct InfiniteQuery<T, S> {
    source: S,
    limit: u32,
    pages: Vec<Page<T>>,
    next_cursor: Option<String>,
}

impl<T, S> InfiniteQuery<T, S>
where
    S: PageSource<T>,
    T: Send,
{
    pub fn new(source: S) -> Self {
        Self::with_limit(source, DEFAULT_PAGE_SIZE)
    }

    pub fn with_limit(source: S, limit: u32) -> Self {
        Self {
            source,
            limit: limit.max(1),
            pages: Vec::new(),
            next_cursor: None,
        }
    }

    /// True before the first fetch and while the last page carried a cursor.
    pub fn has_next_page(&self) -> bool {
        self.pages.is_empty() || self.next_cursor.is_some()
    }

    pub fn pages(&self) -> &[Page<T>] {
        &self.pages
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    /// Fetches the following page; returns how many items it added.
    pub async fn fetch_next(&mut self) -> Result<usize, ApiError> {
        if !self.has_next_page() {
            return Ok(0);
        }

        let request = PageRequest {
            cursor: self.next_cursor.clone(),
            limit: self.limit,
        };
        let page = self.source.fetch_page(request).await?;
        let added = page.items.len();
        debug!(page = self.pages.len() + 1, added, "fetched page");

        self.next_cursor = page.next_cursor.clone().filter(|cursor| !cursor.is_empty());
        self.pages.push(page);
        Ok(added)
    }

    pub async fn fetch_all(&mut self, max_pages: usize) -> Result<usize, ApiError> {
        let mut fetched = 0;
        while fetched < max_pages && self.has_next_page() {
            self.fetch_next().await?;
            fetched += 1;
        }
        Ok(fetched)
    }

    /// Drops accumulated pages; the next fetch starts from the first page.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.next_cursor = None;
    }

    pub fn into_items(self) -> Vec<T> {
        self.pages.into_iter().flat_map(|page| page.items).collect()
    }
}
