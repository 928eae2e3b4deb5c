//! Contact table pagination.
//!
//! Pages are one-based. The page-number strip shows `window` links centred
//! on the current page and clamped to the last page.

/// Page size and strip width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub per_page: usize,
    pub window: usize,
}

/// One page of items plus the navigation state around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Page links to show; empty when the strip is hidden.
    pub numbers: Vec<usize>,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            per_page: 10,
            window: 1,
        }
    }
}

impl Pager {
    pub fn new(per_page: usize, window: usize) -> Self {
        Self {
            per_page: per_page.max(1),
            window: window.max(1),
        }
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.per_page)
    }

    /// The strip is only shown when there is more than one page of items.
    pub fn shows_strip(&self, len: usize) -> bool {
        len > self.per_page
    }

    /// Page links around `current`.
    pub fn page_numbers(&self, current: usize, total_pages: usize) -> Vec<usize> {
        if total_pages == 0 {
            return Vec::new();
        }

        let half = self.window / 2;
        let mut start = 1;
        let mut end = self.window.min(total_pages);

        if current > half {
            start = current - half;
            end = start + self.window - 1;

            if end > total_pages {
                end = total_pages;
                start = (end + 1).saturating_sub(self.window).max(1);
            }
        }

        (start..=end).collect()
    }

    /// Slice out page `current`, clamped to the valid range.
    pub fn page<T: Clone>(&self, items: &[T], current: usize) -> Page<T> {
        let total_pages = self.total_pages(items.len());
        let current = current.clamp(1, total_pages.max(1));

        let first = (current - 1) * self.per_page;
        let last = (first + self.per_page).min(items.len());
        let page_items = items.get(first..last).map(<[T]>::to_vec).unwrap_or_default();

        let numbers = if self.shows_strip(items.len()) {
            self.page_numbers(current, total_pages)
        } else {
            Vec::new()
        };

        Page {
            items: page_items,
            current,
            total_pages,
            total_items: items.len(),
            numbers,
            has_prev: current > 1,
            has_next: current < total_pages,
        }
    }
}
