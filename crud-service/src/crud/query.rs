//! List request parameters and their normalization from the request URI
//!
//! A [`DataSetRequest`] describes the page, sort order and filters a client
//! asked for. It is built from the query string with a permissive policy:
//! anything missing or malformed silently falls back to the defaults, so
//! extracting a request never fails.
//!
//! # Example
//!
//! ```rust
//! use crud_service::crud::{DataSetRequest, SortDirection};
//!
//! let uri = "/notes?pageSize=50&sortColumn=title&sortDirection=DESC"
//!     .parse()
//!     .unwrap();
//! let request = DataSetRequest::from_uri(&uri);
//!
//! assert_eq!(request.page_size, 50);
//! assert_eq!(request.page_number, 1);
//! assert_eq!(request.sort_column, "title");
//! assert_eq!(request.sort_direction, SortDirection::Desc);
//! assert!(request.filters.is_none());
//! ```

use std::collections::{BTreeMap, HashSet};
use std::convert::Infallible;
use std::fmt;

use axum::{
    extract::{FromRequestParts, Query},
    http::{request::Parts, Uri},
};
use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Default (one-based) page number
pub const DEFAULT_PAGE_NUMBER: u32 = 1;

/// Default sort column
pub const DEFAULT_SORT_COLUMN: &str = "id";

/// Sort direction for list requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending (A-Z, 0-9)
    #[default]
    Asc,
    /// Descending (Z-A, 9-0)
    Desc,
}

impl SortDirection {
    /// Parse a query string value; only `desc` (any casing) selects descending
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::crud::SortDirection;
    ///
    /// assert_eq!(SortDirection::from_query_value("Desc"), SortDirection::Desc);
    /// assert_eq!(SortDirection::from_query_value("descending"), SortDirection::Asc);
    /// ```
    #[must_use]
    pub fn from_query_value(value: &str) -> Self {
        if value.eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    /// SQL `ORDER BY` fragment
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "Asc"),
            Self::Desc => write!(f, "Desc"),
        }
    }
}

/// Parameters used to request a set of results
///
/// The data source replies with the paging it actually applied (see
/// [`PagingInfo`](super::PagingInfo)), which may differ from what was asked
/// for here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSetRequest {
    /// Requested number of items per page, at least 1
    pub page_size: u32,
    /// One-based page number
    pub page_number: u32,
    /// Column to sort by, `id` unless specified
    pub sort_column: String,
    /// Sort direction
    pub sort_direction: SortDirection,
    /// Column/value pairs to filter on
    ///
    /// How a filter is matched ("starts with", "contains", ...) is up to the
    /// data source, and unsupported columns are ignored by it. `None` means no
    /// filters were supplied (or they could not be parsed).
    pub filters: Option<BTreeMap<String, String>>,
}

impl Default for DataSetRequest {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_number: DEFAULT_PAGE_NUMBER,
            sort_column: DEFAULT_SORT_COLUMN.to_string(),
            sort_direction: SortDirection::Asc,
            filters: None,
        }
    }
}

impl DataSetRequest {
    /// Create a request with all defaults applied
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize the query string of a URI into a request
    ///
    /// A query string that cannot be decoded at all yields the defaults.
    #[must_use]
    pub fn from_uri(uri: &Uri) -> Self {
        match Query::<Vec<(String, String)>>::try_from_uri(uri) {
            Ok(Query(pairs)) => Self::from_query_pairs(pairs),
            Err(rejection) => {
                tracing::debug!(%rejection, "unreadable query string, using list defaults");
                Self::default()
            }
        }
    }

    /// Normalize decoded query parameters into a request
    ///
    /// Keys are matched case-insensitively. When a key occurs more than once
    /// only its first value is considered. Values that don't parse leave the
    /// corresponding default in place.
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::crud::DataSetRequest;
    ///
    /// let request = DataSetRequest::from_query_pairs([
    ///     ("PAGENUMBER", "3"),
    ///     ("pagesize", "-4"),
    ///     ("filters", r#"{"status":"open"}"#),
    /// ]);
    /// assert_eq!(request.page_number, 3);
    /// assert_eq!(request.page_size, 15);
    /// assert_eq!(request.filter("status"), Some("open"));
    /// ```
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = Self::default();
        let mut seen = HashSet::new();

        for (key, value) in pairs {
            let key = key.as_ref().to_ascii_lowercase();
            let value = value.as_ref();
            if !seen.insert(key.clone()) {
                continue;
            }

            match key.as_str() {
                "pagesize" => {
                    if let Some(size) = parse_positive(value) {
                        request.page_size = size;
                    }
                }
                "pagenumber" => {
                    if let Some(number) = parse_positive(value) {
                        request.page_number = number;
                    }
                }
                "sortcolumn" => request.sort_column = value.to_string(),
                "sortdirection" => request.sort_direction = SortDirection::from_query_value(value),
                // JSON-encoded object of column name to filter value
                "filters" => match serde_json::from_str::<BTreeMap<String, String>>(value) {
                    Ok(filters) => request.filters = Some(filters),
                    Err(error) => {
                        tracing::debug!(%error, "ignoring malformed filters parameter");
                    }
                },
                _ => {}
            }
        }

        request
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the page number
    #[must_use]
    pub fn with_page_number(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Set the sort column and direction
    #[must_use]
    pub fn with_sort(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = column.into();
        self.sort_direction = direction;
        self
    }

    /// Add a filter on a column
    #[must_use]
    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters
            .get_or_insert_with(BTreeMap::new)
            .insert(column.into(), value.into());
        self
    }

    /// Filter value for a column, if present
    #[must_use]
    pub fn filter(&self, column: &str) -> Option<&str> {
        self.filters
            .as_ref()
            .and_then(|filters| filters.get(column))
            .map(String::as_str)
    }

    /// Number of items to skip for offset-based data sources
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_service::crud::DataSetRequest;
    ///
    /// let request = DataSetRequest::new().with_page_size(20).with_page_number(3);
    /// assert_eq!(request.offset(), 40);
    /// ```
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }
}

impl fmt::Display for DataSetRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} (size {}), sort by {} {}",
            self.page_number, self.page_size, self.sort_column, self.sort_direction
        )?;
        if let Some(ref filters) = self.filters {
            write!(f, ", {} filter(s)", filters.len())?;
        }
        Ok(())
    }
}

/// Parse a strictly positive integer that fits the page fields
fn parse_positive(value: &str) -> Option<u32> {
    value
        .parse::<i64>()
        .ok()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

/// Never rejects: a request that can't be normalized falls back to defaults
impl<S> FromRequestParts<S> for DataSetRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_uri(&parts.uri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_for(uri: &str) -> DataSetRequest {
        DataSetRequest::from_uri(&uri.parse().unwrap())
    }

    #[test]
    fn test_defaults_without_parameters() {
        let request = request_for("/resource");
        assert_eq!(request, DataSetRequest::default());
        assert_eq!(request.page_size, 15);
        assert_eq!(request.page_number, 1);
        assert_eq!(request.sort_column, "id");
        assert_eq!(request.sort_direction, SortDirection::Asc);
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_all_parameters() {
        let request = request_for(
            "/resource?pageSize=25&pageNumber=4&sortColumn=name&sortDirection=desc&filters=%7B%22name%22%3A%22al%22%7D",
        );
        assert_eq!(request.page_size, 25);
        assert_eq!(request.page_number, 4);
        assert_eq!(request.sort_column, "name");
        assert_eq!(request.sort_direction, SortDirection::Desc);
        assert_eq!(request.filter("name"), Some("al"));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let request = request_for("/resource?PAGESIZE=30&PageNumber=2&SORTCOLUMN=title");
        assert_eq!(request.page_size, 30);
        assert_eq!(request.page_number, 2);
        assert_eq!(request.sort_column, "title");
    }

    #[test]
    fn test_zero_page_size_keeps_default() {
        let request = request_for("/resource?pageSize=0");
        assert_eq!(request.page_size, 15);
    }

    #[test]
    fn test_negative_and_garbage_numbers_keep_defaults() {
        let request = request_for("/resource?pageSize=-5&pageNumber=abc");
        assert_eq!(request.page_size, 15);
        assert_eq!(request.page_number, 1);

        let request = request_for("/resource?pageSize=99999999999");
        assert_eq!(request.page_size, 15);
    }

    #[test]
    fn test_first_value_wins() {
        let request = request_for("/resource?pageSize=10&pagesize=20&pageSize=30");
        assert_eq!(request.page_size, 10);
    }

    #[test]
    fn test_invalid_first_value_is_not_retried() {
        let request = request_for("/resource?pageSize=zero&pageSize=20");
        assert_eq!(request.page_size, 15);
    }

    #[test]
    fn test_sort_column_is_taken_verbatim() {
        let request = request_for("/resource?sortColumn=");
        assert_eq!(request.sort_column, "");

        let request = request_for("/resource?sortColumn=Not%20A%20Column");
        assert_eq!(request.sort_column, "Not A Column");
    }

    #[test]
    fn test_sort_direction_values() {
        assert_eq!(
            request_for("/resource?sortDirection=DESC").sort_direction,
            SortDirection::Desc
        );
        assert_eq!(
            request_for("/resource?sortDirection=asc").sort_direction,
            SortDirection::Asc
        );
        assert_eq!(
            request_for("/resource?sortDirection=sideways").sort_direction,
            SortDirection::Asc
        );
    }

    #[test]
    fn test_malformed_filters_stay_none() {
        let request = request_for("/resource?filters=%7Bnot-json");
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_filters_with_non_string_values_stay_none() {
        let request = DataSetRequest::from_query_pairs([("filters", r#"{"a":"x","b":3}"#)]);
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_filters_json_array_stays_none() {
        let request = DataSetRequest::from_query_pairs([("filters", r#"["a","b"]"#)]);
        assert!(request.filters.is_none());
    }

    #[test]
    fn test_empty_filters_object_is_some() {
        let request = DataSetRequest::from_query_pairs([("filters", "{}")]);
        assert_eq!(request.filters, Some(BTreeMap::new()));
    }

    #[test]
    fn test_unknown_parameters_are_ignored() {
        let request = request_for("/resource?foo=bar&pageNumber=2");
        assert_eq!(request.page_number, 2);
        assert_eq!(request.page_size, 15);
    }

    #[test]
    fn test_builder_and_offset() {
        let request = DataSetRequest::new()
            .with_page_size(10)
            .with_page_number(5)
            .with_sort("created", SortDirection::Desc)
            .with_filter("status", "open");
        assert_eq!(request.offset(), 40);
        assert_eq!(request.sort_column, "created");
        assert_eq!(request.filter("status"), Some("open"));
        assert_eq!(request.filter("missing"), None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let request = DataSetRequest::new().with_filter("name", "x");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["pageSize"], 15);
        assert_eq!(json["pageNumber"], 1);
        assert_eq!(json["sortColumn"], "id");
        assert_eq!(json["sortDirection"], "Asc");
        assert_eq!(json["filters"]["name"], "x");
    }

    #[test]
    fn test_sort_direction_sql() {
        assert_eq!(SortDirection::Asc.as_sql(), "ASC");
        assert_eq!(SortDirection::Desc.as_sql(), "DESC");
    }

    #[test]
    fn test_display() {
        let request = DataSetRequest::new().with_filter("a", "b");
        assert_eq!(request.to_string(), "page 1 (size 15), sort by id Asc, 1 filter(s)");
    }

    #[tokio::test]
    async fn test_extractor_never_rejects() {
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/resource?pageSize=abc&filters=%5B")
            .body(())
            .unwrap()
            .into_parts();

        let request = DataSetRequest::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(request, DataSetRequest::default());
    }
}
