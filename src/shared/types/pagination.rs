/// Paginated result wrapper
#[derive(Debug)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Normalize 1-based page / limit query values: page >= 1, limit in 1..=100.
pub fn validate_pagination(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}

/// Offset of the first item of a 1-based page, saturating at `i64::MAX`
/// (the largest offset SQL backends accept).
pub fn page_offset(page: u64, limit: u64) -> u64 {
    (page.max(1) - 1)
        .saturating_mul(limit)
        .min(i64::MAX as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(validate_pagination(None, None), (1, 20));
        assert_eq!(validate_pagination(Some(0), Some(0)), (1, 1));
        assert_eq!(validate_pagination(Some(3), Some(500)), (3, 100));
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: PaginatedResult<u8> = PaginatedResult::new(vec![], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let (page, limit) = validate_pagination(Some(u64::MAX), Some(100));
        assert_eq!(page_offset(page, limit), i64::MAX as u64);
    }
}
