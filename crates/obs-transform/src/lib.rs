//! Attendance record transformation.
//!
//! Turns the ingested raw table into report data:
//!
//! - **normalization**: header trimming, date and age parsing, age bands
//! - **filter**: conjunctive filter criteria over a record set
//! - **aggregate**: value counts and padded top-N rankings
//! - **report**: filter choices, summary metrics and ranking sections
//! - **frame**: polars frames and CSV export

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod frame;
pub mod normalization;
pub mod report;

pub use aggregate::{age_band_distribution, rank, rank_by_name, universe, value_counts};
pub use error::{Result, TransformError};
pub use filter::{Predicate, apply_filter, apply_predicates, predicates};
pub use frame::{raw_frame, to_frame, write_csv};
pub use normalization::{DateOrder, NormalizeOptions, normalize};
pub use report::{DrillDown, FilterOptions, Report, ReportOptions, Section, SummaryMetrics, drill_down};
