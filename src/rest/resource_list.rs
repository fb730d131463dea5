//! Lazy, paginated resource lists.
//!
//! A [`ResourceList`] describes a (possibly filtered) collection; it holds no
//! data and makes no request when built. Iterating it through a
//! [`ResourceCursor`] fetches offset/limit pages one at a time, and only
//! when the caller asks for an item past the current page.
//!
//! # Pagination
//!
//! - The first page is requested with `offset=0` and the page limit.
//! - `total_count` from the first page is recorded on the list and never
//!   re-read, so every cursor and [`ResourceList::count`] see the same value.
//! - The offset advances by the page limit after every page, whatever the
//!   page actually held; iteration ends once it reaches `total_count`. A
//!   collection of `N` resources therefore takes exactly `ceil(N / limit)`
//!   requests, and short pages do not end iteration early.
//! - A failing page fetch is reported once and ends the cursor; resources
//!   already yielded stay valid.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut cursor = mailing.all().iter();
//! while let Some(resource) = cursor.next().await {
//!     let resource = resource?;
//!     println!("{}", resource.id());
//! }
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::rest::endpoint::EndpointProxy;
use crate::rest::filter::Filter;
use crate::rest::resource::Resource;
use crate::rest::ApiError;

/// Objects already delivered by the server for a list, served before any
/// page is requested.
#[derive(Debug)]
pub(crate) struct SeedPage {
    pub(crate) objects: Vec<serde_json::Value>,
    /// Offset the next page request starts at.
    pub(crate) next_offset: u64,
}

/// A lazy collection of resources on one endpoint.
///
/// Cloning is cheap; clones share the recorded `total_count`.
#[derive(Clone)]
pub struct ResourceList {
    endpoint: EndpointProxy,
    filter: Filter,
    page_limit: u64,
    seed: Option<Arc<SeedPage>>,
    total_count: Arc<OnceLock<u64>>,
}

impl ResourceList {
    pub(crate) fn new(endpoint: EndpointProxy, filter: Filter, page_limit: u64) -> Self {
        Self {
            endpoint,
            filter,
            page_limit: page_limit.max(1),
            seed: None,
            total_count: Arc::new(OnceLock::new()),
        }
    }

    /// Builds a list whose first objects are already known.
    pub(crate) fn seeded(
        endpoint: EndpointProxy,
        filter: Filter,
        page_limit: u64,
        seed: SeedPage,
        total_count: u64,
    ) -> Self {
        let list = Self {
            seed: Some(Arc::new(seed)),
            ..Self::new(endpoint, filter, page_limit)
        };
        let _ = list.total_count.set(total_count);
        list
    }

    /// Returns the endpoint this list belongs to.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointProxy {
        &self.endpoint
    }

    /// Returns the filter sent with every page request.
    #[must_use]
    pub const fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Returns the page size.
    #[must_use]
    pub const fn page_limit(&self) -> u64 {
        self.page_limit
    }

    /// Returns a copy of this list that fetches pages of `limit` resources
    /// (at least 1).
    ///
    /// Objects the server already embedded are kept; the new limit applies
    /// to the pages requested after them.
    #[must_use]
    pub fn with_page_limit(&self, limit: u64) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            filter: self.filter.clone(),
            page_limit: limit.max(1),
            seed: self.seed.clone(),
            total_count: Arc::clone(&self.total_count),
        }
    }

    /// Returns `total_count` if a page has already been fetched.
    #[must_use]
    pub fn total_count(&self) -> Option<u64> {
        self.total_count.get().copied()
    }

    /// Returns the number of resources in the collection.
    ///
    /// Free once any page has been fetched; otherwise fetches a one-item
    /// page to learn the total.
    ///
    /// # Errors
    ///
    /// Returns the error of the page request, if one was needed.
    pub async fn count(&self) -> Result<u64, ApiError> {
        if let Some(total) = self.total_count() {
            return Ok(total);
        }
        let envelope = self.endpoint.fetch_page(&self.filter, 0, 1).await?;
        Ok(*self
            .total_count
            .get_or_init(|| envelope.meta.total_count))
    }

    /// Starts a fresh iteration from the first resource.
    #[must_use]
    pub fn iter(&self) -> ResourceCursor {
        ResourceCursor::new(self.clone())
    }

    /// Fetches every resource, in server order.
    ///
    /// # Errors
    ///
    /// Returns the first error met while paginating.
    pub async fn collect(&self) -> Result<Vec<Resource>, ApiError> {
        let mut cursor = self.iter();
        let mut resources = Vec::new();
        while let Some(resource) = cursor.next().await {
            resources.push(resource?);
        }
        Ok(resources)
    }
}

impl fmt::Debug for ResourceList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceList")
            .field("endpoint", &self.endpoint.name())
            .field("filter", &self.filter)
            .field("page_limit", &self.page_limit)
            .field("total_count", &self.total_count.get())
            .field("seeded", &self.seed.is_some())
            .finish()
    }
}

/// Forward-only iteration over a [`ResourceList`].
///
/// Call [`ResourceCursor::next`] until it returns `None`.
pub struct ResourceCursor {
    list: ResourceList,
    buffer: VecDeque<serde_json::Value>,
    offset: u64,
    exhausted: bool,
}

impl ResourceCursor {
    fn new(list: ResourceList) -> Self {
        let (buffer, offset) = list.seed.as_ref().map_or_else(
            || (VecDeque::new(), 0),
            |seed| (seed.objects.iter().cloned().collect(), seed.next_offset),
        );
        Self {
            list,
            buffer,
            offset,
            exhausted: false,
        }
    }

    /// Returns the next resource, fetching the next page when the current
    /// one is used up.
    ///
    /// Returns `None` once the collection is exhausted, and after a page
    /// request has failed.
    pub async fn next(&mut self) -> Option<Result<Resource, ApiError>> {
        loop {
            if let Some(payload) = self.buffer.pop_front() {
                return Some(self.list.endpoint.resource_from_payload(payload));
            }
            if self.exhausted {
                return None;
            }
            if self
                .list
                .total_count
                .get()
                .is_some_and(|total| self.offset >= *total)
            {
                self.exhausted = true;
                return None;
            }

            let page = self
                .list
                .endpoint
                .fetch_page(&self.list.filter, self.offset, self.list.page_limit)
                .await;

            match page {
                Ok(envelope) => {
                    let total = *self
                        .list
                        .total_count
                        .get_or_init(|| envelope.meta.total_count);
                    self.offset = self.offset.saturating_add(self.list.page_limit);
                    self.exhausted = self.offset >= total;
                    self.buffer.extend(envelope.objects);
                }
                Err(e) => {
                    self.exhausted = true;
                    self.buffer.clear();
                    return Some(Err(e));
                }
            }
        }
    }

    /// Returns the offset the next page request will use.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns `true` once no further page will be requested.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl fmt::Debug for ResourceCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceCursor")
            .field("list", &self.list)
            .field("buffered", &self.buffer.len())
            .field("offset", &self.offset)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}
