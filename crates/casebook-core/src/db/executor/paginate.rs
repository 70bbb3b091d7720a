use crate::{
    db::{
        executor::PageWindow,
        index::{OrderedIndex, ScanRequest},
        plan::ViewQueryPlan,
    },
    error::InternalError,
    obs::sink::{MetricsEvent, record as record_metric},
    record::Record,
};

///
/// Page
///
/// One realised listing page plus the size of the whole range.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page {
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub records: Vec<Record>,
}

impl Page {
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.per_page.max(1)))
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

///
/// Paginator
///
/// Executes a `ViewQueryPlan` against an `OrderedIndex`. The count and the
/// window are two separate reads; a write landing between them may skew the
/// total slightly, which listings tolerate.
///

pub struct Paginator<'a, I: ?Sized> {
    index: &'a I,
}

impl<'a, I> Paginator<'a, I>
where
    I: OrderedIndex + ?Sized,
{
    #[must_use]
    pub const fn new(index: &'a I) -> Self {
        Self { index }
    }

    /// Run the plan. Pages past the end come back empty, never as errors.
    pub fn fetch(&self, plan: &ViewQueryPlan) -> Result<Page, InternalError> {
        let index = plan.index();
        if !self.index.declares(index) {
            return Err(InternalError::planner_invariant(format!(
                "listing plan targets undeclared index '{index}'"
            )));
        }

        let range = plan.range();
        let total = self.index.count(index, &range)?;
        let window = PageWindow::for_plan(plan);

        let records = if window.is_past(total) {
            Vec::new()
        } else {
            self.index.scan(&ScanRequest {
                index,
                range,
                skip: window.skip,
                limit: window.limit,
            })?
        };

        record_metric(MetricsEvent::RowsScanned {
            index,
            rows: records.len() as u64,
        });
        tracing::debug!(%index, total, page = plan.page(), rows = records.len(), "listing fetched");

        Ok(Page {
            total,
            page: plan.page(),
            per_page: plan.per_page(),
            records,
        })
    }
}
