use std::sync::Arc;

use crate::domain::entities::total_pages;
use crate::domain::errors::PageError;

// Position within a server-paginated list. Pages are 1-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageCursor {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl PageCursor {
    pub fn new(limit: u32) -> Result<Self, PageError> {
        if limit == 0 {
            return Err(PageError::InvalidLimit);
        }
        Ok(Self {
            page: 1,
            limit,
            total: 0,
        })
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.limit)
    }

    // Rejects pages outside 1..=total_pages without touching the cursor.
    pub fn with_page(self, page: u32) -> Result<Self, PageError> {
        let total_pages = self.total_pages();
        if page == 0 || page > total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages,
            });
        }
        Ok(Self { page, ..self })
    }

    // A new page size always restarts from page 1.
    pub fn with_limit(self, limit: u32) -> Result<Self, PageError> {
        if limit == 0 {
            return Err(PageError::InvalidLimit);
        }
        Ok(Self {
            page: 1,
            limit,
            ..self
        })
    }

    // Records the server's total. The page is kept even if it is now past the end.
    pub fn with_total(self, total: u64) -> Self {
        Self { total, ..self }
    }

    // Moves the page back into 1..=total_pages.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.clamp(1, self.total_pages()),
            ..self
        }
    }
}

/// In-memory pagination over a fully loaded list.
///
/// Cloning is cheap: the backing list is shared.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientPager<T> {
    items: Arc<[T]>,
    page: u32,
    limit: u32,
}

impl<T> ClientPager<T> {
    pub fn new(limit: u32) -> Result<Self, PageError> {
        if limit == 0 {
            return Err(PageError::InvalidLimit);
        }
        Ok(Self {
            items: Arc::from(Vec::new()),
            page: 1,
            limit,
        })
    }

    // Swap in a freshly fetched list; the page restarts at 1.
    pub fn replaced(&self, items: Vec<T>) -> Self {
        Self {
            items: Arc::from(items),
            page: 1,
            limit: self.limit,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.items.len() as u64, self.limit)
    }

    // slice(start, start + limit) of the backing list.
    pub fn page_items(&self) -> &[T] {
        let start = (self.page as usize - 1).saturating_mul(self.limit as usize);
        let start = start.min(self.items.len());
        let end = start.saturating_add(self.limit as usize).min(self.items.len());
        &self.items[start..end]
    }

    pub fn with_page(&self, page: u32) -> Result<Self, PageError> {
        let total_pages = self.total_pages();
        if page == 0 || page > total_pages {
            return Err(PageError::OutOfRange {
                requested: page,
                total_pages,
            });
        }
        Ok(Self {
            items: Arc::clone(&self.items),
            page,
            limit: self.limit,
        })
    }

    pub fn with_limit(&self, limit: u32) -> Result<Self, PageError> {
        if limit == 0 {
            return Err(PageError::InvalidLimit);
        }
        Ok(Self {
            items: Arc::clone(&self.items),
            page: 1,
            limit,
        })
    }
}
