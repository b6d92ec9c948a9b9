//! Category counts and top-N rankings.

use std::collections::{HashMap, HashSet};

use obs_model::{AgeBand, ColumnMap, Field, Limit, ModelError, RankEntry, Ranking, RecordSet, Result};

/// Counts the non-null values of a field.
///
/// Entries are sorted by descending count; ties keep first-seen order.
pub fn value_counts(records: &RecordSet, field: Field) -> Result<Vec<RankEntry>> {
    records.require_field(field)?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<RankEntry> = Vec::new();
    for record in records {
        let Some(key) = record.key(field) else {
            continue;
        };
        match index.get(key.as_ref()) {
            Some(&idx) => entries[idx].count += 1,
            None => {
                index.insert(key.to_string(), entries.len());
                entries.push(RankEntry::new(key, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(entries)
}

/// Distinct values of a field in ranking order.
///
/// Computed on the unfiltered set, this is the padding source for [`rank`].
pub fn universe(records: &RecordSet, field: Field) -> Result<Vec<String>> {
    Ok(value_counts(records, field)?
        .into_iter()
        .map(|entry| entry.value)
        .collect())
}

/// Ranks the categories of a field.
///
/// With `Limit::Top(n)` the ranking is cut to `n` entries and, when a
/// universe is given, padded with zero-count values from it (in universe
/// order, skipping values already present) until it has `n` entries or the
/// universe runs out. `Limit::All` keeps every category and never pads.
pub fn rank(
    records: &RecordSet,
    field: Field,
    limit: Limit,
    universe: Option<&[String]>,
) -> Result<Ranking> {
    let mut entries = value_counts(records, field)?;

    if let Some(cap) = limit.cap() {
        entries.truncate(cap);
        if let Some(universe) = universe {
            let mut present: HashSet<String> =
                entries.iter().map(|entry| entry.value.clone()).collect();
            for value in universe {
                if entries.len() >= cap {
                    break;
                }
                if present.insert(value.clone()) {
                    entries.push(RankEntry::new(value.clone(), 0));
                }
            }
        }
    }

    Ok(Ranking::new(field, entries))
}

/// Like [`rank`], resolving the field from a canonical key or column name.
pub fn rank_by_name(
    records: &RecordSet,
    name: &str,
    columns: &ColumnMap,
    limit: Limit,
    universe: Option<&[String]>,
) -> Result<Ranking> {
    let field = columns
        .resolve(name)
        .ok_or_else(|| ModelError::unknown_field(name.trim()))?;
    rank(records, field, limit, universe)
}

/// Count of every age band in taxonomy order, including empty bands.
pub fn age_band_distribution(records: &RecordSet) -> Result<Vec<RankEntry>> {
    records.require_field(Field::AgeBand)?;

    let mut counts = [0usize; AgeBand::ALL.len()];
    for band in records.iter().filter_map(|record| record.age_band) {
        counts[band.index()] += 1;
    }
    Ok(AgeBand::ALL
        .into_iter()
        .zip(counts)
        .map(|(band, count)| RankEntry::new(band.label(), count))
        .collect())
}

#[cfg(test)]
mod tests {
    use obs_model::{Record, Schema};

    use super::*;

    fn units(values: &[Option<&str>]) -> RecordSet {
        let schema = Schema {
            fields: [Field::Unit].into_iter().collect(),
            ..Schema::default()
        };
        let records = values
            .iter()
            .map(|value| Record {
                unit: value.map(str::to_string),
                ..Record::default()
            })
            .collect();
        RecordSet::new(schema, records)
    }

    #[test]
    fn test_value_counts_skip_nulls() {
        let set = units(&[Some("B"), None, Some("A"), Some("A")]);
        let counts = value_counts(&set, Field::Unit).unwrap();
        assert_eq!(counts, vec![RankEntry::new("A", 2), RankEntry::new("B", 1)]);
    }

    #[test]
    fn test_rank_all_never_pads() {
        let set = units(&[Some("A")]);
        let universe = vec!["A".to_string(), "B".to_string()];
        let ranking = rank(&set, Field::Unit, Limit::All, Some(universe.as_slice())).unwrap();
        assert_eq!(ranking.values(), vec!["A"]);
    }

    #[test]
    fn test_rank_by_name() {
        let set = units(&[Some("A")]);
        let columns = ColumnMap::default();
        assert!(rank_by_name(&set, "Unidade", &columns, Limit::default(), None).is_ok());
        assert!(rank_by_name(&set, "unit", &columns, Limit::default(), None).is_ok());
        assert_eq!(
            rank_by_name(&set, "Bairro", &columns, Limit::default(), None),
            Err(ModelError::unknown_field("Bairro"))
        );
        assert_eq!(
            rank_by_name(&set, "Sexo", &columns, Limit::default(), None),
            Err(ModelError::unknown_field("sex"))
        );
    }

    #[test]
    fn test_age_band_distribution_includes_empty_bands() {
        let schema = Schema {
            fields: [Field::Age, Field::AgeBand].into_iter().collect(),
            ..Schema::default()
        };
        let records = [3.0, 70.0, 80.0]
            .into_iter()
            .map(|age| Record {
                age: Some(age),
                age_band: AgeBand::from_age(age),
                ..Record::default()
            })
            .collect();
        let set = RecordSet::new(schema, records);

        let distribution = age_band_distribution(&set).unwrap();
        assert_eq!(distribution.len(), 7);
        assert_eq!(distribution[0], RankEntry::new("0-5", 1));
        assert_eq!(distribution[1].count, 0);
        assert_eq!(distribution[6], RankEntry::new("60+", 2));
    }
}
