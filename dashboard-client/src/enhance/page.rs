//! Pagination arithmetic shared by tables and card grids.

/// The slice of a list that one page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based, always within `1..=page_count`.
    pub page: usize,
    pub page_count: usize,
    /// Half-open range into the filtered list.
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// `max(1, ceil(total / per_page))`. A zero `per_page` is treated as 1.
pub fn page_count(total: usize, per_page: usize) -> usize {
    total.div_ceil(per_page.max(1)).max(1)
}

/// Clamps `page` into range and computes the covered slice.
pub fn window(total: usize, per_page: usize, page: usize) -> PageWindow {
    let per_page = per_page.max(1);
    let page_count = page_count(total, per_page);
    let page = page.clamp(1, page_count);
    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);
    PageWindow {
        page,
        page_count,
        start,
        end,
    }
}
