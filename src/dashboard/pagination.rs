pub const PAGE_SIZE: usize = 10;

/// Page bookkeeping for the route list. Pages are numbered from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: usize,
    pub total_pages: usize,
}

impl Pagination {
    pub fn from_route_count(route_count: i64) -> Self {
        let count = usize::try_from(route_count).unwrap_or(0);

        Self {
            page: 0,
            total_pages: count.div_ceil(PAGE_SIZE),
        }
    }

    pub fn skip(page: usize) -> usize {
        page * PAGE_SIZE
    }

    pub fn limit() -> usize {
        PAGE_SIZE
    }

    pub fn prev(&self) -> Option<usize> {
        self.page.checked_sub(1)
    }

    pub fn next(&self) -> Option<usize> {
        let next = self.page + 1;
        (next < self.total_pages).then_some(next)
    }

    /// Whether `page` exists.
    pub fn contains(&self, page: usize) -> bool {
        page < self.total_pages
    }

    /// The footer is only shown when there is somewhere to go.
    pub fn has_footer(&self) -> bool {
        self.total_pages > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::from_route_count(0).total_pages, 0);
        assert_eq!(Pagination::from_route_count(1).total_pages, 1);
        assert_eq!(Pagination::from_route_count(10).total_pages, 1);
        assert_eq!(Pagination::from_route_count(11).total_pages, 2);
        assert_eq!(Pagination::from_route_count(-3).total_pages, 0);
    }

    #[test]
    fn prev_and_next_respect_bounds() {
        let mut p = Pagination::from_route_count(25);
        assert_eq!(p.prev(), None);
        assert_eq!(p.next(), Some(1));

        p.page = 2;
        assert_eq!(p.prev(), Some(1));
        assert_eq!(p.next(), None);
        assert!(p.contains(2));
        assert!(!p.contains(3));
    }

    #[test]
    fn skip_is_page_times_page_size() {
        assert_eq!(Pagination::skip(0), 0);
        assert_eq!(Pagination::skip(3), 30);
        assert_eq!(Pagination::limit(), 10);
    }

    #[test]
    fn footer_only_with_several_pages() {
        assert!(!Pagination::from_route_count(10).has_footer());
        assert!(Pagination::from_route_count(11).has_footer());
    }
}
