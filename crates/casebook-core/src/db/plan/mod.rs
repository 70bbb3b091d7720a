//! Module: plan
//! Responsibility: compile listing intent (scope, status, sort, page) into
//! one concrete ordered-index scan.
//! Does not own: execution; `executor::Paginator` consumes the plan.

mod planner;


pub use planner::{AccessScope, SortField, ViewQueryPlan, ViewQueryPlanner};
