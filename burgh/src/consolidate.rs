//! Consolidation des séquences par source en un seul ensemble ordonné

use crate::types::{AnnotatedRecord, ConsolidatedSet};

/// Concatène les séquences dans l'ordre des sources, puis l'ordre des lignes.
///
/// Pas de dédoublonnage: deux listes historiques citant le même burgh
/// produisent deux enregistrements.
pub fn merge<I>(sequences: I) -> ConsolidatedSet
where
    I: IntoIterator<Item = Vec<AnnotatedRecord>>,
{
    let mut records = Vec::new();
    for sequence in sequences {
        records.extend(sequence);
    }
    ConsolidatedSet { records }
}

impl FromIterator<AnnotatedRecord> for ConsolidatedSet {
    fn from_iter<T: IntoIterator<Item = AnnotatedRecord>>(iter: T) -> Self {
        ConsolidatedSet {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DerivedColumns, GeocodeResult, RawRecord, Scalar};
    use std::path::PathBuf;
    use std::sync::Arc;

    fn record(source: &str, name: &str) -> AnnotatedRecord {
        AnnotatedRecord {
            source: Arc::new(PathBuf::from(source)),
            raw: RawRecord::new([("Burgh", Scalar::Text(name.to_string()))]),
            cleaned_name: name.to_string(),
            geocode: GeocodeResult::Unresolved,
            derived: DerivedColumns::default(),
        }
    }

    #[test]
    fn test_merge_preserves_order_without_dedup() {
        let set = merge(vec![
            vec![record("a.csv", "Perth"), record("a.csv", "Ayr")],
            vec![],
            vec![record("b.csv", "Perth")],
        ]);

        let names: Vec<_> = set.iter().map(|r| r.cleaned_name.as_str()).collect();
        assert_eq!(names, vec!["Perth", "Ayr", "Perth"]);
        assert_eq!(set.records()[2].source.as_path(), std::path::Path::new("b.csv"));
    }

    #[test]
    fn test_columns_union() {
        let mut with_extra = record("b.csv", "Elgin");
        with_extra.raw = RawRecord::new([
            ("Burgh", Scalar::Text("Elgin".into())),
            ("County", Scalar::Text("Moray".into())),
        ]);
        let set = merge(vec![vec![record("a.csv", "Ayr")], vec![with_extra]]);

        assert_eq!(
            set.columns(),
            vec!["Burgh", "Burgh_Cleaned", "lat", "long", "County"]
        );
        let (_, rows) = set.rows();
        assert_eq!(rows[0][4], Scalar::Missing);
        assert_eq!(rows[1][4], Scalar::Text("Moray".into()));
    }
}
