//! Fixed age band taxonomy.
//!
//! Seven ordered bands partition the non-negative ages. Each band is closed on
//! the right, so `5` is in `0-5` and `5.5` is in `6-12`. The last band is open
//! ended.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One labeled age range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "0-5")]
    Age0To5,
    #[serde(rename = "6-12")]
    Age6To12,
    #[serde(rename = "13-18")]
    Age13To18,
    #[serde(rename = "19-30")]
    Age19To30,
    #[serde(rename = "31-45")]
    Age31To45,
    #[serde(rename = "46-60")]
    Age46To60,
    #[serde(rename = "60+")]
    Over60,
}

impl AgeBand {
    /// All bands in taxonomy order.
    pub const ALL: [AgeBand; 7] = [
        AgeBand::Age0To5,
        AgeBand::Age6To12,
        AgeBand::Age13To18,
        AgeBand::Age19To30,
        AgeBand::Age31To45,
        AgeBand::Age46To60,
        AgeBand::Over60,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            AgeBand::Age0To5 => "0-5",
            AgeBand::Age6To12 => "6-12",
            AgeBand::Age13To18 => "13-18",
            AgeBand::Age19To30 => "19-30",
            AgeBand::Age31To45 => "31-45",
            AgeBand::Age46To60 => "46-60",
            AgeBand::Over60 => "60+",
        }
    }

    /// Inclusive upper bound, `None` for the open-ended band.
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            AgeBand::Age0To5 => Some(5.0),
            AgeBand::Age6To12 => Some(12.0),
            AgeBand::Age13To18 => Some(18.0),
            AgeBand::Age19To30 => Some(30.0),
            AgeBand::Age31To45 => Some(45.0),
            AgeBand::Age46To60 => Some(60.0),
            AgeBand::Over60 => None,
        }
    }

    /// Position in taxonomy order.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Buckets an age. Negative and non-finite ages have no band.
    pub fn from_age(age: f64) -> Option<Self> {
        if !age.is_finite() || age < 0.0 {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|band| band.upper_bound().is_none_or(|upper| age <= upper))
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::ALL.into_iter().find(|band| band.label() == trimmed)
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AgeBand {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| ModelError::InvalidAgeBand {
            value: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_boundaries() {
        assert_eq!(AgeBand::from_age(0.0), Some(AgeBand::Age0To5));
        assert_eq!(AgeBand::from_age(5.0), Some(AgeBand::Age0To5));
        assert_eq!(AgeBand::from_age(5.5), Some(AgeBand::Age6To12));
        assert_eq!(AgeBand::from_age(6.0), Some(AgeBand::Age6To12));
        assert_eq!(AgeBand::from_age(18.0), Some(AgeBand::Age13To18));
        assert_eq!(AgeBand::from_age(60.0), Some(AgeBand::Age46To60));
        assert_eq!(AgeBand::from_age(61.0), Some(AgeBand::Over60));
        assert_eq!(AgeBand::from_age(150.0), Some(AgeBand::Over60));
    }

    #[test]
    fn test_no_band() {
        assert_eq!(AgeBand::from_age(-1.0), None);
        assert_eq!(AgeBand::from_age(f64::NAN), None);
        assert_eq!(AgeBand::from_age(f64::INFINITY), None);
    }

    #[test]
    fn test_labels_round_trip() {
        for band in AgeBand::ALL {
            assert_eq!(band.label().parse::<AgeBand>(), Ok(band));
        }
        assert!("70+".parse::<AgeBand>().is_err());
    }

    #[test]
    fn test_index_matches_order() {
        for (position, band) in AgeBand::ALL.into_iter().enumerate() {
            assert_eq!(band.index(), position);
        }
    }
}
