//! Paginated query builder for server-side collections.
//!
//! Due to a limitation in the Billogram service it is only possible to
//! filter on a single field or special query at a time; setting a new
//! filter replaces the previous one. The exact fields and special queries
//! available for each object type vary, see the online documentation.
//!
//! Every page fetch is an independent, stateless list request. Changing
//! the filter between page fetches therefore shifts result offsets for the
//! pages that follow.

use std::collections::HashMap;

use crate::clients::{Connection, Envelope};
use crate::error::ApiError;
use crate::resources::RemoteObject;

/// Sort direction for [`Query::order`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the query parameter value for this direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The single active filter clause.
#[derive(Clone, Debug)]
struct Filter {
    filter_type: &'static str,
    field: String,
    value: String,
}

/// The single active ordering clause.
#[derive(Clone, Debug)]
struct Ordering {
    field: String,
    direction: OrderDirection,
}

/// Builds queries and fetches pages of remote objects.
///
/// Builder methods mutate the query in place and return it for chaining.
/// The total count reported by the server is cached across page fetches
/// and invalidated whenever the filter, ordering or page size changes.
///
/// # Example
///
/// ```rust,ignore
/// let mut query = api.billogram().query();
/// query
///     .filter_field("state", "Unattested")
///     .order("created_at", OrderDirection::Desc)
///     .page_size(50);
///
/// for page in 1..=query.total_pages().await? {
///     for billogram in query.get_page(page).await? {
///         // ...
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Query<'a> {
    conn: &'a Connection,
    url_name: &'static str,
    id_field: &'static str,
    filter: Option<Filter>,
    order: Option<Ordering>,
    page_size: u32,
    cached_count: Option<u64>,
}

/// Default number of objects per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

impl<'a> Query<'a> {
    /// Creates a query bound to a collection's URL segment and id field.
    #[must_use]
    pub(crate) const fn new(
        conn: &'a Connection,
        url_name: &'static str,
        id_field: &'static str,
    ) -> Self {
        Self {
            conn,
            url_name,
            id_field,
            filter: None,
            order: None,
            page_size: DEFAULT_PAGE_SIZE,
            cached_count: None,
        }
    }

    /// Returns the collection path this query lists.
    #[must_use]
    pub const fn url(&self) -> &'static str {
        self.url_name
    }

    /// Returns the current page size.
    #[must_use]
    pub const fn current_page_size(&self) -> u32 {
        self.page_size
    }

    /// Sets which field to order on and in which direction.
    pub fn order(&mut self, field: impl Into<String>, direction: OrderDirection) -> &mut Self {
        self.order = Some(Ordering {
            field: field.into(),
            direction,
        });
        self.cached_count = None;
        self
    }

    /// Sets the page size. Must be positive; zero is coerced to one.
    pub fn page_size(&mut self, page_size: u32) -> &mut Self {
        self.page_size = page_size.max(1);
        self.cached_count = None;
        self
    }

    /// Replaces the active filter, or clears it when `filter` is `None`.
    fn set_filter(&mut self, filter: Option<Filter>) -> &mut Self {
        self.filter = filter;
        self.cached_count = None;
        self
    }

    /// Filter by a specific field and an exact value.
    pub fn filter_field(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.set_filter(Some(Filter {
            filter_type: "field",
            field: field.into(),
            value: value.into(),
        }))
    }

    /// Filter by a specific field, matching value prefixes.
    pub fn filter_prefix(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.set_filter(Some(Filter {
            filter_type: "field-prefix",
            field: field.into(),
            value: value.into(),
        }))
    }

    /// Filter by a specific field, matching value substrings.
    pub fn filter_search(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.set_filter(Some(Filter {
            filter_type: "field-search",
            field: field.into(),
            value: value.into(),
        }))
    }

    /// Filter on a special query.
    pub fn filter_special(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.set_filter(Some(Filter {
            filter_type: "special",
            field: field.into(),
            value: value.into(),
        }))
    }

    /// Filter by a full data search; the exact meaning depends on the
    /// object type. Sugar for the `search` special query.
    pub fn search(&mut self, terms: impl Into<String>) -> &mut Self {
        self.filter_special("search", terms)
    }

    /// Removes any previous filtering rules.
    pub fn remove_filter(&mut self) -> &mut Self {
        self.set_filter(None)
    }

    /// Returns the list request parameters for the given page and size.
    fn request_params(&self, page: u32, page_size: u32) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("page_size".to_string(), page_size.to_string());
        params.insert("page".to_string(), page.to_string());
        if let Some(filter) = &self.filter {
            params.insert("filter_type".to_string(), filter.filter_type.to_string());
            params.insert("filter_field".to_string(), filter.field.clone());
            params.insert("filter_value".to_string(), filter.value.clone());
        }
        if let Some(order) = &self.order {
            params.insert("order_field".to_string(), order.field.clone());
            params.insert(
                "order_direction".to_string(),
                order.direction.as_str().to_string(),
            );
        }
        params
    }

    /// Issues the list request and caches the reported total count.
    async fn make_query(&mut self, page: u32, page_size: u32) -> Result<Envelope, ApiError> {
        let params = self.request_params(page, page_size);
        let envelope = self.conn.get(self.url_name, Some(&params)).await?;
        if let Some(total) = envelope.meta.as_ref().and_then(|meta| meta.total_count) {
            self.cached_count = Some(total);
        }
        Ok(envelope)
    }

    /// Fetches the objects of the one-based page number.
    ///
    /// Returns an empty vector when the server reports no data. As a side
    /// effect the server's total count is cached for [`count`](Self::count).
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the list request.
    pub async fn get_page(&mut self, page: u32) -> Result<Vec<RemoteObject<'a>>, ApiError> {
        let envelope = self.make_query(page, self.page_size).await?;
        let conn = self.conn;
        match envelope.data {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| RemoteObject::from_data(conn, self.url_name, self.id_field, item))
                .collect(),
            serde_json::Value::Null => Ok(Vec::new()),
            _ => Err(ApiError::ServiceMalfunctioning(
                "Response data is not a list".to_string(),
            )),
        }
    }

    /// Total number of objects matched by the current query.
    ///
    /// Served from the cached count when known; otherwise issues a
    /// page-size-1 list request purely to read the total-count metadata,
    /// leaving the configured page size untouched.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from the probe request, or
    /// [`ApiError::ServiceMalfunctioning`] if the response lacks the
    /// total-count metadata.
    pub async fn count(&mut self) -> Result<u64, ApiError> {
        if let Some(count) = self.cached_count {
            return Ok(count);
        }
        self.make_query(1, 1).await?;
        self.cached_count.ok_or_else(|| {
            ApiError::ServiceMalfunctioning("Response meta missing total_count".to_string())
        })
    }

    /// Total number of pages required for all matched objects at the
    /// current page size.
    ///
    /// # Errors
    ///
    /// Propagates any [`ApiError`] from [`count`](Self::count).
    pub async fn total_pages(&mut self) -> Result<u64, ApiError> {
        let count = self.count().await?;
        Ok(count.div_ceil(u64::from(self.page_size)))
    }
}
