//! Page-number pagination for the fault list.

use std::num::NonZeroU32;

/// The page a browser request targets, paired with the fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
    page_size: NonZeroU32,
}

/// Zero-based, inclusive slice of the ordered record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceRange {
    pub from: u64,
    pub to: u64,
}

impl PageCursor {
    /// Pages are 1-based; zero is raised to the first page.
    pub fn new(page: u32, page_size: NonZeroU32) -> Self {
        Self {
            page: page.max(1),
            page_size,
        }
    }

    pub fn first(page_size: NonZeroU32) -> Self {
        Self::new(1, page_size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    pub fn slice(&self) -> SliceRange {
        let size = u64::from(self.page_size.get());
        let from = u64::from(self.page - 1) * size;
        SliceRange {
            from,
            to: from + size - 1,
        }
    }

    pub fn previous(self) -> Self {
        Self::new(self.page.saturating_sub(1), self.page_size)
    }

    /// Advance one page unless the last known page count says we are at the end.
    pub fn next(self, known_total_pages: Option<u32>) -> Self {
        match known_total_pages {
            Some(total) if self.page >= total => self,
            _ => Self::new(self.page.saturating_add(1), self.page_size),
        }
    }

    pub fn clamp_to(self, total_pages: u32) -> Self {
        Self::new(self.page.min(total_pages.max(1)), self.page_size)
    }
}

/// Number of pages needed for `total_count` records, never less than one.
pub fn total_pages(total_count: u64, page_size: NonZeroU32) -> u32 {
    let pages = total_count.div_ceil(u64::from(page_size.get())).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Outcome of a completed load: the clamped cursor and the page count it was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    cursor: PageCursor,
    total_pages: u32,
    total_count: u64,
}

impl PageWindow {
    pub fn resolve(requested: PageCursor, total_count: u64) -> Self {
        let total_pages = total_pages(total_count, requested.page_size());
        Self {
            cursor: requested.clamp_to(total_pages),
            total_pages,
            total_count,
        }
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn page(&self) -> u32 {
        self.cursor.page()
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn has_previous(&self) -> bool {
        self.cursor.page() > 1
    }

    pub fn has_next(&self) -> bool {
        self.cursor.page() < self.total_pages
    }

    pub fn label(&self) -> String {
        format!("Page {} of {}", self.cursor.page(), self.total_pages)
    }
}
