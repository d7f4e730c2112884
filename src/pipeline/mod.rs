//! Pipeline entry points for collector operations.
//!
//! - `run_collect`: Fetch, parse and store job ads for the search terms
//! - `run_export`: Write stored ads to an HTML or CSV file
//! - `run_tag`: Record a manual relevance tag

pub mod collect;
pub mod export;
pub mod tag;

pub use collect::run_collect;
pub use export::{ExportFormat, render_csv, render_html, run_export};
pub use tag::run_tag;
