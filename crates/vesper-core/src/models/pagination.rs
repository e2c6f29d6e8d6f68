use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::AppError;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Raw `page`/`limit` query parameters as they arrive on the wire.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct PaginationParams {
    /// 1-indexed page number (default 1)
    pub page: Option<i64>,
    /// Page size (default 20, max 100)
    pub limit: Option<i64>,
}

/// Normalized page request. `page` is 1-indexed and `limit` is in `1..=MAX_PAGE_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamp policy: `page < 1` becomes 1, `limit` is clamped into `1..=100`.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(DEFAULT_PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Reject policy: same as [`PageRequest::from_query`] but a `limit` above the maximum is
    /// an input error instead of being clamped.
    pub fn strict(page: Option<i64>, limit: Option<i64>) -> Result<Self, AppError> {
        if let Some(l) = limit {
            if l > MAX_PAGE_LIMIT {
                return Err(AppError::InvalidInput(format!(
                    "limit must not exceed {}",
                    MAX_PAGE_LIMIT
                )));
            }
        }
        Ok(Self::from_query(page, limit))
    }

    /// Rows to skip. Saturates for absurd page numbers, which then yield an empty page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl From<&PaginationParams> for PageRequest {
    fn from(params: &PaginationParams) -> Self {
        PageRequest::from_query(params.page, params.limit)
    }
}

/// Number of pages needed to show `total` items `limit` at a time.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// One page of results plus the totals needed to render pagination controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            data,
            page: request.page,
            limit: request.limit,
            total,
            pages: page_count(total, request.limit),
        }
    }

    /// Slice an already-ordered in-memory result set.
    pub fn from_vec(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as i64;
        let data = items
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.limit as usize)
            .collect();
        Self::new(data, total, request)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            pages: self.pages,
        }
    }
}

/// Pagination block of the list envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> From<&Paginated<T>> for PaginationMeta {
    fn from(p: &Paginated<T>) -> Self {
        PaginationMeta {
            page: p.page,
            limit: p.limit,
            total: p.total,
            pages: p.pages,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parses "asc"/"desc" (any case). Anything else is descending.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
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
    fn page_below_one_is_normalized() {
        let req = PageRequest::from_query(Some(0), Some(10));
        assert_eq!(req.page, 1);
        let req = PageRequest::from_query(Some(-4), None);
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, DEFAULT_PAGE_LIMIT);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let req = PageRequest::from_query(Some(i64::MAX), Some(100));
        assert_eq!(req.offset(), i64::MAX);

        let page = Paginated::from_vec(vec![1, 2, 3], req);
        assert!(page.data.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PageRequest::from_query(None, Some(500)).limit, 100);
        assert_eq!(PageRequest::from_query(None, Some(0)).limit, 1);
    }

    #[test]
    fn strict_rejects_large_limit() {
        assert!(PageRequest::strict(Some(1), Some(101)).is_err());
        assert_eq!(PageRequest::strict(Some(2), Some(100)).unwrap().offset(), 100);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(1, 20), 1);
        assert_eq!(page_count(20, 20), 1);
        assert_eq!(page_count(21, 20), 2);
        assert_eq!(page_count(95, 10), 10);
    }

    #[test]
    fn from_vec_slices_requested_page() {
        let items: Vec<i32> = (1..=45).collect();
        let page = Paginated::from_vec(items, PageRequest::from_query(Some(3), Some(20)));
        assert_eq!(page.data, vec![41, 42, 43, 44, 45]);
        assert_eq!(page.total, 45);
        assert_eq!(page.pages, 3);
    }

    #[test]
    fn sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::parse(Some("ASC")), SortOrder::Asc);
        assert_eq!(SortOrder::parse(Some("sideways")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(None), SortOrder::Desc);
    }
}
