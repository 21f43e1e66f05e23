use std::ops::RangeInclusive;

use shared::{
    domain::{FilterField, SortField, SortOrder},
    protocol::BillListQuery,
};

/// Page size for every list request.
pub const PER_PAGE: u32 = 20;

/// The filter/sort/page state driving the next list request. Owned by a
/// single controller instance; never ambient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    /// Derived from the most recent successful response.
    pub total_pages: u32,
    pub month: Option<String>,
    pub search: Option<String>,
    pub pass_gubn: Option<String>,
    pub proc_stage: Option<String>,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
            month: None,
            search: None,
            pass_gubn: None,
            proc_stage: None,
            sort_by: SortField::default(),
            order: SortOrder::default(),
        }
    }
}

/// One chip in the active-filter strip, rebuilt from scratch on every
/// snapshot. Removal goes through `remove_filter(field)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFilter {
    pub field: FilterField,
    pub value: String,
}

impl QueryState {
    pub fn filter(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Month => self.month.as_deref(),
            FilterField::Search => self.search.as_deref(),
            FilterField::PassGubn => self.pass_gubn.as_deref(),
            FilterField::ProcStage => self.proc_stage.as_deref(),
        }
    }

    /// Sets one filter (empty clears it) and rewinds to the first page.
    /// Values are forwarded to the server verbatim, unvalidated.
    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            FilterField::Month => &mut self.month,
            FilterField::Search => &mut self.search,
            FilterField::PassGubn => &mut self.pass_gubn,
            FilterField::ProcStage => &mut self.proc_stage,
        };
        *slot = if value.is_empty() { None } else { Some(value) };
        self.page = 1;
    }

    pub fn set_sort(&mut self, sort_by: SortField, order: SortOrder) {
        self.sort_by = sort_by;
        self.order = order;
        self.page = 1;
    }

    /// Back to defaults. The page count survives until the next response
    /// replaces it.
    pub fn clear_all(&mut self) {
        *self = Self {
            total_pages: self.total_pages,
            ..Self::default()
        };
    }

    pub fn active_filters(&self) -> Vec<ActiveFilter> {
        FilterField::ALL
            .into_iter()
            .filter_map(|field| {
                self.filter(field).map(|value| ActiveFilter {
                    field,
                    value: value.to_string(),
                })
            })
            .collect()
    }

    pub fn to_query(&self) -> BillListQuery {
        BillListQuery {
            page: self.page,
            per_page: PER_PAGE,
            sort_by: self.sort_by,
            order: self.order,
            month: self.month.clone(),
            search: self.search.clone(),
            pass_gubn: self.pass_gubn.clone(),
            proc_stage: self.proc_stage.clone(),
        }
    }

    pub fn can_go_prev(&self) -> bool {
        self.page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Page numbers to offer around the current one, at most two each way.
    pub fn page_window(&self) -> RangeInclusive<u32> {
        let start = self.page.saturating_sub(2).max(1);
        let end = (self.page + 2).min(self.total_pages);
        start..=end
    }
}
