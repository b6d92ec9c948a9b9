//! Attendance record data model.
//!
//! Types shared by every stage of the pipeline:
//!
//! - **table**: untyped [`RawTable`] produced by ingestion
//! - **record**: typed [`Record`] and immutable [`RecordSet`] views
//! - **age_band**: the fixed [`AgeBand`] taxonomy
//! - **field**: logical [`Field`]s and their configurable source columns
//! - **criteria**: operator [`FilterCriteria`] with "match all" sentinels
//! - **ranking**: [`Ranking`] results and top-N [`Limit`]s

pub mod age_band;
pub mod criteria;
pub mod error;
pub mod field;
pub mod ranking;
pub mod record;
pub mod table;

pub use age_band::AgeBand;
pub use criteria::{DateRange, FilterCriteria, Selection};
pub use error::{ModelError, Result};
pub use field::{ColumnMap, Field};
pub use ranking::{Limit, RankEntry, Ranking};
pub use record::{Record, RecordSet, Schema, format_age};
pub use table::RawTable;
