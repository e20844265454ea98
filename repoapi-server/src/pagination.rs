//! Paging arithmetic and the `Link` response header

use axum::http::header::LINK;
use axum::http::{HeaderMap, HeaderValue};

use crate::context::ApiContext;

/// Page arithmetic over a listing of `total` items.
///
/// Pages are 1-indexed. The current page is clamped into `1..=total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginater {
    total: i64,
    paging_num: i64,
    current: i64,
}

impl Paginater {
    pub fn new(total: i64, paging_num: i64, current: i64) -> Self {
        let mut p = Self {
            total: total.max(0),
            paging_num: if paging_num <= 0 { 1 } else { paging_num },
            current: if current <= 0 { 1 } else { current },
        };
        if p.current > p.total_pages() {
            p.current = p.total_pages();
        }
        p
    }

    pub fn current(&self) -> i64 {
        self.current
    }

    pub fn paging_num(&self) -> i64 {
        self.paging_num
    }

    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            self.total / self.paging_num + i64::from(self.total % self.paging_num != 0)
        }
    }

    pub fn is_first(&self) -> bool {
        self.current == 1
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn previous(&self) -> i64 {
        if self.has_previous() {
            self.current - 1
        } else {
            self.current
        }
    }

    pub fn has_next(&self) -> bool {
        // `current` is clamped, so only this product can exceed i64
        self.current
            .checked_mul(self.paging_num)
            .map_or(false, |seen| self.total > seen)
    }

    pub fn next(&self) -> i64 {
        if self.has_next() {
            self.current + 1
        } else {
            self.current
        }
    }

    pub fn is_last(&self) -> bool {
        if self.total == 0 {
            return true;
        }
        self.total > (self.current - 1) * self.paging_num && !self.has_next()
    }

    /// Index of the first item on the current page
    pub fn offset(&self) -> usize {
        ((self.current - 1) * self.paging_num) as usize
    }

    /// Items of `all` that fall on the current page
    pub fn page_of<T>(&self, all: Vec<T>) -> Vec<T> {
        all.into_iter()
            .skip(self.offset())
            .take(self.paging_num as usize)
            .collect()
    }
}

/// Link relations for the page, in `next`, `last`, `first`, `prev` order.
///
/// `base` is the absolute URL of the listing without a query string.
pub fn link_relations(page: &Paginater, base: &str) -> Vec<String> {
    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(format!("<{}?page={}>; rel=\"next\"", base, page.next()));
    }
    if !page.is_last() {
        links.push(format!("<{}?page={}>; rel=\"last\"", base, page.total_pages()));
    }
    if !page.is_first() {
        links.push(format!("<{}?page=1>; rel=\"first\"", base));
    }
    if page.has_previous() {
        links.push(format!("<{}?page={}>; rel=\"prev\"", base, page.previous()));
    }
    links
}

impl ApiContext {
    /// Paginater for this request's `page` query parameter
    pub fn paginater(&self, total: i64, page_size: i64) -> Paginater {
        Paginater::new(total, page_size, self.query_int("page"))
    }

    /// Set the `Link` header for a listing of `total` items.
    ///
    /// Nothing is written when no relation applies.
    pub fn set_link_header(&self, headers: &mut HeaderMap, total: i64, page_size: i64) {
        let page = self.paginater(total, page_size);
        let path = self.path().strip_prefix('/').unwrap_or(self.path());
        let base = format!("{}{}", self.settings().app_url, path);

        let links = link_relations(&page, &base);
        if links.is_empty() {
            return;
        }

        match HeaderValue::from_str(&links.join(",")) {
            Ok(value) => {
                headers.insert(LINK, value);
            }
            Err(e) => {
                tracing::warn!(error = %e, base = %base, "unrepresentable Link header");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use axum::http::Uri;
    use repoapi_core::Settings;
    use std::sync::Arc;

    fn api_context(uri: &str) -> ApiContext {
        let mut settings = Settings::with_repo_root("/srv/git");
        settings.app_url = "https://git.example.com/".to_string();
        let base = Context::new(Arc::new(settings), &uri.parse::<Uri>().unwrap());
        ApiContext::new(Arc::new(base))
    }

    fn rels(headers: &HeaderMap) -> Vec<String> {
        let Some(value) = headers.get(LINK) else {
            return Vec::new();
        };
        value
            .to_str()
            .unwrap()
            .split(',')
            .map(|link| {
                let rel = link.split("rel=\"").nth(1).unwrap();
                rel.trim_end_matches('"').to_string()
            })
            .collect()
    }

    #[test]
    fn first_page_links() {
        let ctx = api_context("/api/v1/orgs/acme/repos?page=1");
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 100, 10);

        assert_eq!(rels(&headers), vec!["next", "last"]);
        assert_eq!(
            headers.get(LINK).unwrap().to_str().unwrap(),
            "<https://git.example.com/api/v1/orgs/acme/repos?page=2>; rel=\"next\",\
             <https://git.example.com/api/v1/orgs/acme/repos?page=10>; rel=\"last\""
        );
    }

    #[test]
    fn last_page_links() {
        let ctx = api_context("/api/v1/orgs/acme/repos?page=10");
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 100, 10);

        assert_eq!(rels(&headers), vec!["first", "prev"]);
        assert!(headers
            .get(LINK)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("repos?page=9>; rel=\"prev\""));
    }

    #[test]
    fn middle_page_has_all_four() {
        let ctx = api_context("/api/v1/orgs/acme/repos?page=5");
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 100, 10);

        assert_eq!(rels(&headers), vec!["next", "last", "first", "prev"]);
    }

    #[test]
    fn next_and_last_overlap_before_the_end() {
        let ctx = api_context("/api/v1/orgs/acme/repos?page=9");
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 100, 10);

        let value = headers.get(LINK).unwrap().to_str().unwrap().to_string();
        assert_eq!(rels(&headers), vec!["next", "last", "first", "prev"]);
        assert!(value.contains("page=10>; rel=\"next\""));
        assert!(value.contains("page=10>; rel=\"last\""));
    }

    #[test]
    fn single_page_writes_no_header() {
        let ctx = api_context("/api/v1/orgs/acme/repos");
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 5, 10);

        assert!(headers.get(LINK).is_none());
    }

    #[test]
    fn invalid_page_defaults_to_first() {
        let ctx = api_context("/api/v1/orgs/acme/repos?page=abc");
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 30, 10);

        assert_eq!(rels(&headers), vec!["next", "last"]);
    }

    #[test]
    fn paginater_clamps() {
        let p = Paginater::new(25, 10, 99);
        assert_eq!(p.current(), 3);
        assert_eq!(p.total_pages(), 3);
        assert!(p.is_last());

        let p = Paginater::new(25, 0, -4);
        assert_eq!(p.paging_num(), 1);
        assert_eq!(p.current(), 1);

        let p = Paginater::new(0, 10, 1);
        assert_eq!(p.total_pages(), 1);
        assert!(p.is_first() && p.is_last() && !p.has_next());
    }

    #[test]
    fn extreme_sizes_stay_in_range() {
        let p = Paginater::new(10, i64::MAX, 1);
        assert_eq!(p.total_pages(), 1);
        assert!(!p.has_next());
        assert!(p.is_last());
        assert_eq!(p.page_of((0..10).collect()).len(), 10);

        let p = Paginater::new(i64::MAX, 2, i64::MAX);
        assert_eq!(p.total_pages(), i64::MAX / 2 + 1);
        assert_eq!(p.current(), p.total_pages());
        assert!(!p.has_next());
        assert!(p.is_last());

        let p = Paginater::new(i64::MAX, i64::MAX - 1, 1);
        assert_eq!(p.total_pages(), 2);
        assert!(p.has_next());
    }

    #[test]
    fn huge_page_query_links_back_to_last_page() {
        let ctx = api_context(&format!("/api/v1/orgs/acme/repos?page={}", i64::MAX));
        let mut headers = HeaderMap::new();
        ctx.set_link_header(&mut headers, 25, 10);

        assert_eq!(rels(&headers), vec!["first", "prev"]);
        assert!(headers
            .get(LINK)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("repos?page=2>; rel=\"prev\""));
    }

    #[test]
    fn page_of_slices_current_page() {
        let p = Paginater::new(7, 3, 3);
        assert_eq!(p.offset(), 6);
        assert_eq!(p.page_of((0..7).collect()), vec![6]);
    }
}
