//! Page request and page envelope for paginated listings.

use serde::{Deserialize, Serialize};

pub const MAX_PER_PAGE: u32 = 100;

/// `?page=&per_page=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// A resolved page window: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Resolve a query against the configured default page size.
    pub fn from_query(query: PageQuery, default_per_page: u32) -> Self {
        Self {
            page: query.page.unwrap_or(1).max(1),
            per_page: query
                .per_page
                .unwrap_or(default_per_page)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// One page of results plus navigation links.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub links: PageLinks,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PageLinks {
    pub first: String,
    pub last: String,
    pub prev: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub last_page: u32,
    pub total: i64,
    /// 1-based position of the first item on this page, `None` when empty.
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub path: String,
}

impl<T> Page<T> {
    /// Build a page for the listing rooted at `path` (e.g. `/api/events`).
    pub fn new(data: Vec<T>, total: i64, request: PageRequest, path: &str) -> Self {
        let per_page = i64::from(request.per_page);
        let last_page = ((total + per_page - 1) / per_page).max(1) as u32;
        let url = |page: u32| format!("{}?page={}&per_page={}", path, page, request.per_page);

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let from = request.offset() + 1;
            (Some(from), Some(from + data.len() as i64 - 1))
        };

        Self {
            links: PageLinks {
                first: url(1),
                last: url(last_page),
                prev: (request.page > 1).then(|| url(request.page - 1)),
                next: (request.page < last_page).then(|| url(request.page + 1)),
            },
            meta: PageMeta {
                current_page: request.page,
                per_page: request.per_page,
                last_page,
                total,
                from,
                to,
                path: path.to_string(),
            },
            data,
        }
    }
}
