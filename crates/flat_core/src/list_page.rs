//! List page controller: search text, filters, pagination and results
//!
//! Every fetch gets a sequence number; a response is applied only if it
//! answers the most recently issued fetch, so a slow stale response cannot
//! overwrite newer results.

use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

use crate::error::Result;
use crate::filter::{self, FilterController, FilterCriteria, FilterSlot, FilterValue};
use crate::models::{Card, ListingKind, Page};
use crate::AppError;

/// Field type of a collection without filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoField {}

impl fmt::Display for NoField {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl FromStr for NoField {
    type Err = AppError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Err(AppError::Validation(format!("this list has no filter '{}'", s)))
    }
}

/// Criteria for collections that only paginate (favorites)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unfiltered;

impl FilterCriteria for Unfiltered {
    type Field = NoField;

    const FIELDS: &'static [NoField] = &[];

    fn value(&self, field: NoField) -> FilterValue<'_> {
        match field {}
    }

    fn slot_mut(&mut self, field: NoField) -> FilterSlot<'_> {
        match field {}
    }
}

/// Handle for one issued fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: String,
}

/// Whether a response made it onto the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Fresh,
    Stale,
}

#[derive(Debug, Clone)]
pub struct ListPage<C: FilterCriteria, T> {
    filters: FilterController<C>,
    search: String,
    page: u32,
    kind: Option<ListingKind>,
    items: Vec<T>,
    total_pages: u32,
    loading: bool,
    error: Option<String>,
    last_issued: u64,
    dirty: bool,
}

impl<C: FilterCriteria, T> Default for ListPage<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FilterCriteria, T> ListPage<C, T> {
    /// Fresh page: empty filters, page 1, fetch pending
    pub fn new() -> Self {
        Self {
            filters: FilterController::new(),
            search: String::new(),
            page: 1,
            kind: None,
            items: Vec::new(),
            total_pages: 1,
            loading: false,
            error: None,
            last_issued: 0,
            dirty: true,
        }
    }

    /// Pin the collection to one listing type (rooms page, apartments page)
    pub fn with_kind(mut self, kind: ListingKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn kind(&self) -> Option<ListingKind> {
        self.kind
    }

    pub fn filters(&self) -> &C {
        self.filters.criteria()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Does the page need a refetch?
    pub fn needs_fetch(&self) -> bool {
        self.dirty
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.page = 1;
            self.dirty = true;
        }
    }

    /// Whole-object filter replace from the filter editor
    pub fn replace_filters(&mut self, criteria: C) {
        self.filters.replace(criteria);
        self.page = 1;
        self.dirty = true;
    }

    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.page = 1;
        self.dirty = true;
    }

    pub fn set_page(&mut self, page: u32) {
        let page = page.max(1);
        if page != self.page {
            self.page = page;
            self.dirty = true;
        }
    }

    pub fn next_page(&mut self) -> bool {
        if self.page < self.total_pages {
            self.set_page(self.page + 1);
            true
        } else {
            false
        }
    }

    /// Query string for the current state
    pub fn query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("page", &self.page.to_string());
        if let Some(kind) = self.kind {
            query.append_pair("type", kind.as_str());
        }
        if !self.search.is_empty() {
            query.append_pair("search", &self.search);
        }
        filter::append_criteria(&mut query, self.filters.criteria());
        query.finish()
    }

    /// Issue the next fetch
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.last_issued += 1;
        self.loading = true;
        self.dirty = false;

        let ticket = FetchTicket {
            seq: self.last_issued,
            query: self.query(),
        };
        tracing::debug!(seq = ticket.seq, query = %ticket.query, "List fetch issued");
        ticket
    }

    /// Apply a fetch result if it answers the latest ticket
    pub fn apply(&mut self, ticket: &FetchTicket, result: Result<Page<T>>) -> Applied {
        if ticket.seq != self.last_issued {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.last_issued,
                "Discarding stale list response"
            );
            return Applied::Stale;
        }

        self.loading = false;
        match result {
            Ok(page) => {
                self.items = page.results;
                self.total_pages = page.total_pages.max(1);
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("List loading failed: {}", e);
                self.error = Some(e.user_message());
            }
        }
        Applied::Fresh
    }

    /// Drop items matching `pred`; returns how many were removed
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !pred(item));
        before - self.items.len()
    }
}

impl<C: FilterCriteria> ListPage<C, Card> {
    /// Drop a card after a confirmed removal from favorites
    pub fn remove_item(&mut self, id: u64) -> bool {
        self.remove_where(|card| card.id == id) > 0
    }
}
