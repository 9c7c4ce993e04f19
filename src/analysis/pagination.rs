/// Page-based slicing of ranked results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Slice `items` to the 1-based `page` of size `limit`.
///
/// `page` and `limit` below 1 are treated as 1. A page past the end yields an
/// empty slice with the pagination metadata still describing the full set.
pub fn paginate<T>(items: &[T], page: usize, limit: usize) -> (&[T], Pagination) {
    let page = page.max(1);
    let limit = limit.max(1);

    let offset = (page - 1).saturating_mul(limit);
    let start = offset.min(items.len());
    let end = start.saturating_add(limit).min(items.len());
    let total_pages = items.len().div_ceil(limit);

    let pagination = Pagination {
        current_page: page,
        total_pages,
        total_items: items.len(),
        items_per_page: limit,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    };
    (&items[start..end], pagination)
}
