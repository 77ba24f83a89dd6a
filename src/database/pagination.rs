use crate::error::{Error, Result};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;
/// Highest page whose offset still fits in an `i64`; anything beyond reads as empty.
pub const MAX_PAGE: i64 = i64::MAX / MAX_PER_PAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.per_page - 1) / self.per_page
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: Option<&str>, default: SortOrder) -> Result<Self> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(default),
            Some(s) if s.eq_ignore_ascii_case("asc") => Ok(SortOrder::Asc),
            Some(s) if s.eq_ignore_ascii_case("desc") => Ok(SortOrder::Desc),
            Some(_) => Err(Error::invalid(
                "sort_order",
                "The sort order must be either asc or desc.",
            )),
        }
    }

    pub const fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(Pagination::default(), Pagination { page: 1, per_page: 10 });
        assert_eq!(Pagination::new(Some(0), Some(1000)), Pagination { page: 1, per_page: 100 });
        assert_eq!(Pagination::new(Some(3), Some(0)).per_page, 1);
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let page = Pagination::new(Some(i64::MAX), Some(10));
        assert_eq!(page.page, MAX_PAGE);
        assert!(page.offset() > 0);

        let page = Pagination::new(Some(i64::MAX), Some(MAX_PER_PAGE));
        assert_eq!(page.offset(), (MAX_PAGE - 1) * MAX_PER_PAGE);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Pagination::default();
        assert_eq!(page.total_pages(0), 0);
        assert_eq!(page.total_pages(10), 1);
        assert_eq!(page.total_pages(11), 2);
    }

    #[test]
    fn sort_order_parsing() {
        assert_eq!(SortOrder::parse(None, SortOrder::Desc).unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some(""), SortOrder::Asc).unwrap(), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("ASC"), SortOrder::Desc).unwrap(), SortOrder::Asc);
        assert!(SortOrder::parse(Some("sideways"), SortOrder::Asc).is_err());
    }
}
