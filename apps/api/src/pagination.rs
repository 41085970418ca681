use serde::Serialize;

use crate::errors::AppError;

/// Jobs per page on the public listing.
pub const JOB_PAGE_SIZE: i64 = 10;

/// Paginated listing envelope.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub message: String,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_results: i64,
    pub results: Vec<T>,
}

/// A resolved page: 1-based number plus the row window it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub total_pages: i64,
    pub limit: i64,
    pub offset: i64,
}

/// An empty result set still has one (empty) first page.
pub fn total_pages(total_results: i64, page_size: i64) -> i64 {
    if total_results <= 0 {
        1
    } else {
        (total_results + page_size - 1) / page_size
    }
}

/// Resolves the `page` query value against the result count.
/// Accepts a positive integer or `last`; anything else or out of range is 404.
pub fn resolve_page(
    raw: Option<&str>,
    total_results: i64,
    page_size: i64,
) -> Result<PageWindow, AppError> {
    let total_pages = total_pages(total_results, page_size);
    let number = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => 1,
        Some("last") => total_pages,
        Some(s) => s
            .parse::<i64>()
            .map_err(|_| AppError::NotFound("Invalid page.".to_string()))?,
    };

    if number < 1 || number > total_pages {
        return Err(AppError::NotFound("Invalid page.".to_string()));
    }

    Ok(PageWindow {
        number,
        total_pages,
        limit: page_size,
        offset: (number - 1) * page_size,
    })
}

impl<T> Paginated<T> {
    pub fn new(message: &str, window: PageWindow, total_results: i64, results: Vec<T>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            current_page: window.number,
            total_pages: window.total_pages,
            total_results,
            results,
        }
    }
}
