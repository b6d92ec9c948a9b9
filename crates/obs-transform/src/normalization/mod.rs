//! Normalization of raw attendance tables.
//!
//! - **schema**: header trimming, field location and record typing
//! - **datetime**: attendance date parsing
//! - **numeric**: age parsing

pub mod datetime;
pub mod numeric;
pub mod schema;

pub use datetime::{DateOrder, parse_date, parse_datetime};
pub use numeric::parse_f64;
pub use schema::{NormalizeOptions, normalize, normalize_header};
