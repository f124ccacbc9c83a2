//! Page-number pagination with clamping.

use std::ops::Range;

/// Categories shown per menu page.
pub const MENU_PAGE_SIZE: usize = 5;

/// Interpret a raw `page` query value. Missing or non-numeric input yields
/// `None`, which callers treat as the first page. Integers too large for
/// `i64` saturate so that they still clamp to the last (or first) page.
pub fn parse_page_param(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim();
    if let Ok(page) = value.parse::<i64>() {
        return Some(page);
    }

    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// A resolved page over an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub current_page: u32,
    pub total_pages: u32,
    start: usize,
    end: usize,
}

impl PageWindow {
    /// Requested pages outside `1..=total_pages` clamp to the nearest valid
    /// page. An empty sequence has zero pages and reports page 1.
    pub fn resolve(requested: Option<i64>, total_items: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_items.div_ceil(page_size);
        let last_page = total_pages.max(1) as i64;
        let current_page = requested.unwrap_or(1).clamp(1, last_page) as usize;

        let start = ((current_page - 1) * page_size).min(total_items);
        let end = (start + page_size).min(total_items);

        Self {
            current_page: current_page as u32,
            total_pages: total_pages as u32,
            start,
            end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        (1..=self.total_pages).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sequence_has_no_pages() {
        let window = PageWindow::resolve(Some(3), 0, MENU_PAGE_SIZE);
        assert_eq!(window.current_page, 1);
        assert_eq!(window.total_pages, 0);
        assert!(window.range().is_empty());
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageWindow::resolve(None, 5, 5).total_pages, 1);
        assert_eq!(PageWindow::resolve(None, 6, 5).total_pages, 2);
        assert_eq!(PageWindow::resolve(None, 11, 5).total_pages, 3);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        assert_eq!(PageWindow::resolve(Some(999), 4, 5).current_page, 1);
        assert_eq!(PageWindow::resolve(Some(999), 12, 5).current_page, 3);
        assert_eq!(PageWindow::resolve(Some(0), 12, 5).current_page, 1);
        assert_eq!(PageWindow::resolve(Some(-4), 12, 5).current_page, 1);
    }

    #[test]
    fn ranges_do_not_overlap() {
        let first = PageWindow::resolve(Some(1), 7, 5);
        let second = PageWindow::resolve(Some(2), 7, 5);
        assert_eq!(first.range(), 0..5);
        assert_eq!(second.range(), 5..7);
        assert!(first.has_next());
        assert!(second.has_previous());
        assert_eq!(second.page_numbers(), vec![1, 2]);
    }

    #[test]
    fn page_param_parsing() {
        assert_eq!(parse_page_param(Some("2")), Some(2));
        assert_eq!(parse_page_param(Some(" 3 ")), Some(3));
        assert_eq!(parse_page_param(Some("two")), None);
        assert_eq!(parse_page_param(Some("")), None);
        assert_eq!(parse_page_param(None), None);
        assert_eq!(parse_page_param(Some("-")), None);
        assert_eq!(parse_page_param(Some("12abc")), None);
    }

    #[test]
    fn oversized_page_numbers_saturate() {
        let huge = parse_page_param(Some("99999999999999999999"));
        assert_eq!(huge, Some(i64::MAX));
        assert_eq!(
            parse_page_param(Some("-99999999999999999999")),
            Some(i64::MIN)
        );

        assert_eq!(PageWindow::resolve(huge, 12, MENU_PAGE_SIZE).current_page, 3);
        assert_eq!(
            PageWindow::resolve(Some(i64::MIN), 12, MENU_PAGE_SIZE).current_page,
            1
        );
    }
}
