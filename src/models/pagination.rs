//! Pagination
//!
//! Listings are split into fixed-size pages. A requested page number is never
//! an error: garbage means the first page, and numbers outside the valid range
//! clamp to the nearest page. An empty listing still has one (empty) page.

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PER_PAGE: i64 = 10;

/// Parse a raw `page` query value; anything that is not an integer means page 1
pub fn parse_page_number(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(1)
}

/// Number of pages needed for `total` items (at least one)
pub fn total_pages_for(total: i64, per_page: i64) -> i64 {
    let per_page = per_page.max(1);
    let total = total.max(0);
    let pages = total / per_page + i64::from(total % per_page != 0);
    pages.max(1)
}

/// Resolved pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListParams {
    /// Page number (1-indexed, always within range)
    pub page: i64,
    /// Number of items per page
    pub per_page: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListParams {
    /// Resolve a requested page against the total item count
    pub fn clamped(requested: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        let last = total_pages_for(total, per_page);
        Self {
            page: requested.clamp(1, last),
            per_page,
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: i64,
    /// Number of items per page
    pub per_page: i64,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> i64 {
        total_pages_for(self.total, self.per_page)
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Convert the items, keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Slice an ordered collection the way the repositories apply OFFSET/LIMIT
    pub(super) fn paginate<T>(items: Vec<T>, requested: i64, per_page: i64) -> PagedResult<T> {
        let total = items.len() as i64;
        let params = ListParams::clamped(requested, per_page, total);
        let page_items = items
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        PagedResult::new(page_items, total, &params)
    }

    #[test]
    fn test_twenty_five_items_make_three_pages() {
        let items: Vec<i32> = (0..25).collect();

        let first = paginate(items.clone(), 1, 10);
        assert_eq!(first.total_pages(), 3);
        assert_eq!(first.len(), 10);
        assert!(first.has_next());
        assert!(!first.has_prev());

        let second = paginate(items.clone(), 2, 10);
        assert_eq!(second.len(), 10);
        assert_eq!(second.items[0], 10);
        assert!(second.has_next());
        assert!(second.has_prev());

        let third = paginate(items.clone(), 3, 10);
        assert_eq!(third.len(), 5);
        assert!(!third.has_next());
        assert!(third.has_prev());
    }

    #[test]
    fn test_out_of_range_clamps() {
        let items: Vec<i32> = (0..25).collect();

        let far = paginate(items.clone(), 99, 10);
        assert_eq!(far.page, 3);
        assert_eq!(far.len(), 5);

        let zero = paginate(items.clone(), 0, 10);
        assert_eq!(zero.page, 1);

        let negative = paginate(items, -4, 10);
        assert_eq!(negative.page, 1);
    }

    #[test]
    fn test_empty_listing_has_one_page() {
        let page = paginate(Vec::<i32>::new(), 5, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages(), 1);
        assert!(page.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number(None), 1);
        assert_eq!(parse_page_number(Some("3")), 3);
        assert_eq!(parse_page_number(Some(" 2 ")), 2);
        assert_eq!(parse_page_number(Some("last")), 1);
        assert_eq!(parse_page_number(Some("")), 1);
        assert_eq!(parse_page_number(Some("-1")), -1);
    }

    #[test]
    fn test_total_pages_with_huge_page_size() {
        assert_eq!(total_pages_for(25, i64::MAX), 1);
        assert_eq!(total_pages_for(i64::MAX, 10), i64::MAX / 10 + 1);
    }

    #[test]
    fn test_offset_and_limit() {
        let params = ListParams::clamped(3, 10, 100);
        assert_eq!(params.offset(), 20);
        assert_eq!(params.limit(), 10);
    }
}
