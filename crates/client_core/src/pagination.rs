//! Fixed-size slicing of an in-memory, already ordered collection.

use std::num::NonZeroUsize;

pub const DEFAULT_PAGE_SIZE: NonZeroUsize = match NonZeroUsize::new(10) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub current_page: usize,
    pub total_pages: usize,
    /// Size of the whole collection, not of this page.
    pub total_countries: usize,
}

pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Returns page `page` (1-based) of `collection`.
///
/// The page number is not clamped; callers check it against
/// [`total_pages`] first. A page whose start lies past the end of the
/// collection, or page `0`, comes back empty while still reporting the true
/// collection size.
pub fn paginate<T: Clone>(collection: &[T], page: usize, page_size: NonZeroUsize) -> Page<T> {
    let size = page_size.get();
    let len = collection.len();
    let items = page
        .checked_sub(1)
        .and_then(|index| index.checked_mul(size))
        .filter(|start| *start < len)
        .map(|start| collection[start..len.min(start.saturating_add(size))].to_vec())
        .unwrap_or_default();

    Page {
        items,
        current_page: page,
        total_pages: total_pages(len, page_size),
        total_countries: len,
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
