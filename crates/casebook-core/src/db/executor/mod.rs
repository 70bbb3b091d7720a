//! Module: executor
//! Responsibility: run compiled listing plans against the ordered index.

mod paginate;
mod window;


pub use paginate::{Page, Paginator};
pub use window::{PageWindow, compute_page_window};
