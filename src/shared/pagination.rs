/// Position of one page inside a result set.
///
/// Out-of-range page numbers are clamped to the nearest valid page, so a
/// request never fails because of its page parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageInfo {
    /// Resolve the raw `page` query value against `total` items.
    ///
    /// Missing or non-numeric values select page 1. Values below 1 or past
    /// the end select the last page. An empty result set has one empty page.
    pub fn resolve(raw_page: Option<&str>, total: i64, page_size: i64) -> Self {
        let page_size = page_size.max(1);
        let total = total.max(0);
        let total_pages = if total == 0 {
            1
        } else {
            (total + page_size - 1) / page_size
        };

        let page = match raw_page.map(str::trim).filter(|s| !s.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if (1..=total_pages).contains(&n) => n,
                Ok(_) => total_pages,
                Err(_) => 1,
            },
        };

        Self {
            page,
            page_size,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// SQL OFFSET of the first row on this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// SQL LIMIT for this page
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_by_default() {
        let page = PageInfo::resolve(None, 30, 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.offset(), 0);
        assert!(page.has_next);
        assert!(!page.has_prev);
    }

    #[test]
    fn test_page_beyond_end_clamps_to_last() {
        let last = PageInfo::resolve(Some("1"), 3, 12);
        let far = PageInfo::resolve(Some("999"), 3, 12);

        assert_eq!(far, last);
        assert_eq!(far.offset(), 0);
    }

    #[test]
    fn test_page_beyond_end_with_several_pages() {
        let page = PageInfo::resolve(Some("50"), 25, 10);
        assert_eq!(page.page, 3);
        assert_eq!(page.offset(), 20);
        assert!(!page.has_next);
        assert!(page.has_prev);
    }

    #[test]
    fn test_non_numeric_page_is_first_page() {
        let page = PageInfo::resolve(Some("abc"), 25, 10);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_zero_or_negative_page_is_last_page() {
        assert_eq!(PageInfo::resolve(Some("0"), 25, 10).page, 3);
        assert_eq!(PageInfo::resolve(Some("-4"), 25, 10).page, 3);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page = PageInfo::resolve(Some("7"), 0, 12);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_prev);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let page = PageInfo::resolve(Some("2"), 24, 12);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
    }
}
