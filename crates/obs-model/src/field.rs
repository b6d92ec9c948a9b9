//! Logical fields of an attendance record and their source column names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A logical column of the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Age,
    Unit,
    Sex,
    Procedure,
    Professional,
    /// Derived from `Age`.
    AgeBand,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Date,
        Field::Age,
        Field::Unit,
        Field::Sex,
        Field::Procedure,
        Field::Professional,
        Field::AgeBand,
    ];

    /// Fields read from a source column (everything except derived ones).
    pub const SOURCE: [Field; 6] = [
        Field::Date,
        Field::Age,
        Field::Unit,
        Field::Sex,
        Field::Procedure,
        Field::Professional,
    ];

    /// Free-text categorical fields.
    pub const TEXT: [Field; 4] = [Field::Unit, Field::Sex, Field::Procedure, Field::Professional];

    /// Canonical key used on the command line and in settings.
    pub const fn key(self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Age => "age",
            Field::Unit => "unit",
            Field::Sex => "sex",
            Field::Procedure => "procedure",
            Field::Professional => "professional",
            Field::AgeBand => "age_band",
        }
    }

    /// Human-readable label for report headings.
    pub const fn label(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Age => "Age",
            Field::Unit => "Unit",
            Field::Sex => "Sex",
            Field::Procedure => "Procedure",
            Field::Professional => "Professional",
            Field::AgeBand => "Age band",
        }
    }

    pub const fn is_derived(self) -> bool {
        matches!(self, Field::AgeBand)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Field::ALL
            .into_iter()
            .find(|field| field.key() == key)
            .ok_or_else(|| ModelError::unknown_field(s.trim()))
    }
}

/// Source column names for each field.
///
/// Names are compared after trimming surrounding whitespace; case and inner
/// spacing must match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub date: String,
    pub age: String,
    pub unit: String,
    pub sex: String,
    pub procedure: String,
    pub professional: String,
    /// Name given to the derived age band column on export.
    pub age_band: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "Data Atendimento".to_string(),
            age: "Idade".to_string(),
            unit: "Unidade".to_string(),
            sex: "Sexo".to_string(),
            procedure: "Procedimento".to_string(),
            professional: "Profissional".to_string(),
            age_band: "Faixa Etária".to_string(),
        }
    }
}

impl ColumnMap {
    /// Returns the configured column name for a field.
    pub fn column(&self, field: Field) -> &str {
        match field {
            Field::Date => &self.date,
            Field::Age => &self.age,
            Field::Unit => &self.unit,
            Field::Sex => &self.sex,
            Field::Procedure => &self.procedure,
            Field::Professional => &self.professional,
            Field::AgeBand => &self.age_band,
        }
    }

    /// Resolves a canonical key or a configured column name to a field.
    pub fn resolve(&self, name: &str) -> Option<Field> {
        if let Ok(field) = name.parse::<Field>() {
            return Some(field);
        }
        let trimmed = name.trim();
        Field::ALL
            .into_iter()
            .find(|field| self.column(*field).trim() == trimmed)
    }
}
