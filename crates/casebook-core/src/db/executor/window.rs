use crate::db::plan::ViewQueryPlan;

///
/// PageWindow
///
/// Canonical pagination window in usize-domain: skip `(page - 1) * per_page`
/// entries, keep at most `per_page`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageWindow {
    pub skip: usize,
    pub limit: usize,
}

impl PageWindow {
    #[must_use]
    pub fn for_plan(plan: &ViewQueryPlan) -> Self {
        compute_page_window(plan.page(), plan.per_page())
    }

    /// True when the window starts at or past `total` entries.
    #[must_use]
    pub fn is_past(&self, total: u64) -> bool {
        u64::try_from(self.skip).unwrap_or(u64::MAX) >= total
    }
}

/// Compute the window from a 1-based page and page size.
#[must_use]
pub fn compute_page_window(page: u32, per_page: u32) -> PageWindow {
    let page_index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
    let limit = usize::try_from(per_page).unwrap_or(usize::MAX);

    PageWindow {
        skip: page_index.saturating_mul(limit),
        limit,
    }
}
