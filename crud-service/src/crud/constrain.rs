//! Resource-specific policy applied to normalized list requests
//!
//! Normalization only guarantees well-formed values. Which page sizes,
//! sort columns and filter columns a resource accepts is decided here, by
//! the resource implementer, before the request reaches the service.
//! Every operation mutates the request in place, never fails and is
//! idempotent.
//!
//! # Example
//!
//! ```rust
//! use crud_service::crud::DataSetRequest;
//!
//! let mut request = DataSetRequest::new()
//!     .with_page_size(500)
//!     .with_filter("owner", "alice")
//!     .with_filter("password", "hunter2");
//!
//! request.constrain_paging(1, 100);
//! request.constrain_sort_columns("id", &["id", "title"]);
//! request.constrain_filter_columns(&["owner", "title"]);
//!
//! assert_eq!(request.page_size, 100);
//! assert_eq!(request.filter("owner"), Some("alice"));
//! assert_eq!(request.filter("password"), None);
//! ```

use super::query::DataSetRequest;

impl DataSetRequest {
    /// Clip the page size into `[min_page_size, max_page_size]`
    ///
    /// The lower bound is applied first, so with `min > max` the result is `max`.
    pub fn constrain_paging(&mut self, min_page_size: u32, max_page_size: u32) {
        if self.page_size < min_page_size {
            self.page_size = min_page_size;
        }
        if self.page_size > max_page_size {
            self.page_size = max_page_size;
        }
    }

    /// Restrict sorting to the allowed columns, falling back to `default_column`
    pub fn constrain_sort_columns(&mut self, default_column: &str, allowed_columns: &[&str]) {
        if !allowed_columns.contains(&self.sort_column.as_str()) {
            self.sort_column = default_column.to_string();
        }
    }

    /// Drop filters on columns that aren't allowed, and filters with an empty value
    ///
    /// Absent filters stay absent; an empty filter set stays empty.
    pub fn constrain_filter_columns(&mut self, allowed_columns: &[&str]) {
        let Some(filters) = self.filters.as_mut() else {
            return;
        };
        filters.retain(|column, value| {
            !value.is_empty() && allowed_columns.contains(&column.as_str())
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn with_page_size(page_size: u32) -> DataSetRequest {
        DataSetRequest::new().with_page_size(page_size)
    }

    fn with_sort_column(column: &str) -> DataSetRequest {
        let mut request = DataSetRequest::new();
        request.sort_column = column.to_string();
        request
    }

    fn with_filters(pairs: &[(&str, &str)]) -> DataSetRequest {
        let mut request = DataSetRequest::new();
        request.filters = Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        request
    }

    #[test]
    fn test_constrain_paging_min() {
        let mut request = with_page_size(0);
        request.constrain_paging(1, 100);
        assert_eq!(request.page_size, 1);
    }

    #[test]
    fn test_constrain_paging_max() {
        let mut request = with_page_size(105);
        request.constrain_paging(1, 100);
        assert_eq!(request.page_size, 100);
    }

    #[test]
    fn test_constrain_paging_in_bounds() {
        let mut request = with_page_size(50);
        request.constrain_paging(1, 100);
        assert_eq!(request.page_size, 50);
    }

    #[test]
    fn test_constrain_paging_matches_clamp() {
        for size in 0..=130 {
            let mut request = with_page_size(size);
            request.constrain_paging(10, 120);
            assert_eq!(request.page_size, size.clamp(10, 120));
        }
    }

    #[test]
    fn test_constrain_paging_inverted_bounds() {
        let mut request = with_page_size(50);
        request.constrain_paging(80, 20);
        assert_eq!(request.page_size, 20);
    }

    #[test]
    fn test_constrain_paging_is_idempotent() {
        let mut request = with_page_size(500);
        request.constrain_paging(1, 100);
        let once = request.clone();
        request.constrain_paging(1, 100);
        assert_eq!(request, once);
    }

    #[test]
    fn test_constrain_sort_columns_empty_input() {
        let mut request = with_sort_column("");
        request.constrain_sort_columns("col1", &["col1", "col2"]);
        assert_eq!(request.sort_column, "col1");
    }

    #[test]
    fn test_constrain_sort_columns_incorrect_input() {
        let mut request = with_sort_column("not-allowed-col");
        request.constrain_sort_columns("col1", &["col1", "col2"]);
        assert_eq!(request.sort_column, "col1");
    }

    #[test]
    fn test_constrain_sort_columns_correct_input() {
        let mut request = with_sort_column("col2");
        request.constrain_sort_columns("col1", &["col1", "col2"]);
        assert_eq!(request.sort_column, "col2");
    }

    #[test]
    fn test_constrain_sort_columns_is_case_sensitive() {
        let mut request = with_sort_column("COL2");
        request.constrain_sort_columns("col1", &["col1", "col2"]);
        assert_eq!(request.sort_column, "col1");
    }

    #[test]
    fn test_constrain_filter_columns_none_stays_none() {
        let mut request = DataSetRequest::new();
        request.constrain_filter_columns(&["col1", "col2"]);
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_constrain_filter_columns_empty_stays_empty() {
        let mut request = DataSetRequest::new();
        request.filters = Some(BTreeMap::new());
        request.constrain_filter_columns(&["col1", "col2"]);
        assert_eq!(request.filters, Some(BTreeMap::new()));
    }

    #[test]
    fn test_constrain_filter_columns_disallowed() {
        let mut request = with_filters(&[("colnotallowed", "somefiltervalue")]);
        request.constrain_filter_columns(&["col1", "col2"]);
        assert_eq!(request.filters, Some(BTreeMap::new()));
    }

    #[test]
    fn test_constrain_filter_columns_allowed() {
        let mut request = with_filters(&[("col1", "somefiltervalue"), ("col2", "somefiltervalue")]);
        request.constrain_filter_columns(&["col1", "col2"]);
        assert_eq!(request.filters.as_ref().map(BTreeMap::len), Some(2));
    }

    #[test]
    fn test_constrain_filter_columns_empty_values() {
        let mut request = with_filters(&[("col1", "")]);
        request.constrain_filter_columns(&["col1", "col2"]);
        assert_eq!(request.filters, Some(BTreeMap::new()));
    }

    #[test]
    fn test_constrain_filter_columns_mixed() {
        let mut request = with_filters(&[("col1", "keep"), ("col2", ""), ("col3", "drop")]);
        request.constrain_filter_columns(&["col1", "col2"]);
        assert_eq!(request.filter("col1"), Some("keep"));
        assert_eq!(request.filters.as_ref().map(BTreeMap::len), Some(1));
    }
}
