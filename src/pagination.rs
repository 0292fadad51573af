//! # Pagination Module
//!
//! Slices a result list into fixed-size pages that fit inside a single
//! Telegram message. Telegram caps inline keyboards at 100 buttons, so the
//! page size is bounded well below that with room for the navigation row
//! and the menu row.

/// Inline controls Telegram accepts in one message
pub const PLATFORM_CONTROL_LIMIT: usize = 100;
/// Controls kept free for prev / counter / next and back-to-menu
pub const RESERVED_CONTROLS: usize = 10;
/// Largest page size the bot accepts
pub const MAX_PAGE_SIZE: usize = PLATFORM_CONTROL_LIMIT - RESERVED_CONTROLS;

/// One window over a result list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    /// Items on this page, at most `page_size` of them
    pub items: &'a [T],
    /// Effective (clamped) page index
    pub index: usize,
    /// Position of `items[0]` in the full list
    pub offset: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub total_pages: usize,
}

/// Number of pages needed for `len` items.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Clamp a page index to `[0, total_pages - 1]` (0 for an empty list).
pub fn clamp_page_index(len: usize, page_size: usize, page_index: usize) -> usize {
    page_index.min(total_pages(len, page_size).saturating_sub(1))
}

/// Return page `page_index` of `items`.
///
/// A request past the last page yields the last page rather than an empty
/// one; a `page_size` of zero is treated as one.
pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total = total_pages(items.len(), page_size);
    let index = clamp_page_index(items.len(), page_size, page_index);
    let offset = (index * page_size).min(items.len());
    let end = (offset + page_size).min(items.len());

    Page {
        items: &items[offset..end],
        index,
        offset,
        has_prev: index > 0,
        has_next: index + 1 < total,
        total_pages: total,
    }
}

/// Move `current` by `delta` pages, clamped to the valid range.
pub fn shift_page(len: usize, page_size: usize, current: usize, delta: i32) -> usize {
    let target = if delta < 0 {
        current.saturating_sub(delta.unsigned_abs() as usize)
    } else {
        current.saturating_add(delta as usize)
    };
    clamp_page_index(len, page_size, target)
}
