//! Per-session issue set with its derived filtered subset and current page.

use std::sync::Arc;

use crate::features::board::filter::{filter_issues, IssueFilter};
use crate::features::board::pagination::{paginate, Page};
use crate::features::issues::models::IssueRecord;

/// Identifies one postal-code load; only the latest ticket may apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    postal_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    /// A newer selection superseded this load
    Discarded,
}

#[derive(Debug)]
pub struct IssueStore {
    postal_code: Option<String>,
    all: Vec<Arc<IssueRecord>>,
    filtered: Vec<Arc<IssueRecord>>,
    filter: IssueFilter,
    current_page: usize,
    generation: u64,
    pending: Option<LoadTicket>,
}

impl IssueStore {
    pub fn new() -> Self {
        Self {
            postal_code: None,
            all: Vec::new(),
            filtered: Vec::new(),
            filter: IssueFilter::default(),
            current_page: 1,
            generation: 0,
            pending: None,
        }
    }

    /// Postal code whose issues are currently held
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }

    /// Postal code of the load in flight, if any
    pub fn pending_postal_code(&self) -> Option<&str> {
        self.pending.as_ref().map(|t| t.postal_code.as_str())
    }

    #[cfg(test)]
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn all(&self) -> &[Arc<IssueRecord>] {
        &self.all
    }

    pub fn filtered(&self) -> &[Arc<IssueRecord>] {
        &self.filtered
    }

    pub fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    #[cfg(test)]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Start a load for `postal_code`, superseding any load in flight
    pub fn begin_load(&mut self, postal_code: &str) -> LoadTicket {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            postal_code: postal_code.to_string(),
        };
        self.pending = Some(ticket.clone());
        ticket
    }

    /// Replace the store wholesale with `issues` if `ticket` is still the latest.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        issues: Vec<IssueRecord>,
        current_user: Option<&str>,
    ) -> LoadOutcome {
        if self.pending.as_ref() != Some(ticket) {
            return LoadOutcome::Discarded;
        }
        self.pending = None;

        self.postal_code = Some(ticket.postal_code.clone());
        self.all = issues.into_iter().map(Arc::new).collect();
        self.filtered = filter_issues(&self.all, &self.filter, current_user);
        self.current_page = 1;

        LoadOutcome::Applied {
            count: self.all.len(),
        }
    }

    /// Abandon a failed load; the held issues stay untouched
    pub fn fail_load(&mut self, ticket: &LoadTicket) {
        if self.pending.as_ref() == Some(ticket) {
            self.pending = None;
        }
    }

    /// Recompute the filtered subset from scratch and go back to page 1
    pub fn apply_filter(&mut self, filter: IssueFilter, current_user: Option<&str>) {
        self.filter = filter;
        self.filtered = filter_issues(&self.all, &self.filter, current_user);
        self.current_page = 1;
    }

    /// Move to `page` without re-filtering
    pub fn set_page(&mut self, page: usize) {
        self.current_page = page;
    }

    pub fn page(&self, page_size: usize) -> Page<'_, Arc<IssueRecord>> {
        paginate(&self.filtered, page_size, self.current_page)
    }
}

impl Default for IssueStore {
    fn default() -> Self {
        Self::new()
    }
}
