use std::fmt;

use thiserror::Error;

use super::model::{Dataset, Row};

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// How the per-column checks are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

/// What each check column must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullMode {
    #[default]
    RequireNull,
    RequireNonNull,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
        }
    }
}

impl fmt::Display for NullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullMode::RequireNull => write!(f, "null"),
            NullMode::RequireNonNull => write!(f, "non-null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("Please enter the primary column.")]
    MissingPrimaryColumn,
    #[error("Please enter at least one column to check.")]
    NoCheckColumns,
}

/// A complete filter predicate.
///
/// A row passes when its primary column is null and the checks over
/// `check_columns` hold under `combinator`. An empty `check_columns` list
/// never matches anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub primary_column: String,
    pub check_columns: Vec<String>,
    pub combinator: Combinator,
    pub null_mode: NullMode,
}

impl FilterSpec {
    /// Validate raw control values. `check_columns` is a comma-separated list;
    /// blank entries are dropped.
    pub fn from_inputs(
        primary_column: &str,
        check_columns: &str,
        combinator: Combinator,
        null_mode: NullMode,
    ) -> Result<Self, FilterError> {
        let primary_column = primary_column.trim();
        if primary_column.is_empty() {
            return Err(FilterError::MissingPrimaryColumn);
        }
        let check_columns: Vec<String> = check_columns
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if check_columns.is_empty() {
            return Err(FilterError::NoCheckColumns);
        }
        Ok(FilterSpec {
            primary_column: primary_column.to_string(),
            check_columns,
            combinator,
            null_mode,
        })
    }

    pub fn matches(&self, row: &Row) -> bool {
        if self.check_columns.is_empty() || !row.is_null_at(&self.primary_column) {
            return false;
        }
        let check = |col: &String| match self.null_mode {
            NullMode::RequireNull => row.is_null_at(col),
            NullMode::RequireNonNull => !row.is_null_at(col),
        };
        match self.combinator {
            Combinator::And => self.check_columns.iter().all(check),
            Combinator::Or => self.check_columns.iter().any(check),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// An order-preserving selection of dataset rows, stored as row indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilteredView {
    indices: Vec<usize>,
}

impl FilteredView {
    /// Every row of the dataset.
    pub fn all(dataset: &Dataset) -> Self {
        FilteredView {
            indices: (0..dataset.len()).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Rows of `dataset` selected by this view, in dataset order.
    pub fn rows<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Row> + 'a {
        self.indices.iter().filter_map(move |&i| dataset.row(i))
    }

    /// Apply `spec` to the rows already in this view.
    pub fn refine(&self, dataset: &Dataset, spec: &FilterSpec) -> Self {
        FilteredView {
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| dataset.row(i).is_some_and(|row| spec.matches(row)))
                .collect(),
        }
    }
}

/// Recompute the view of `dataset` that satisfies `spec`.
pub fn filter(dataset: &Dataset, spec: &FilterSpec) -> FilteredView {
    FilteredView {
        indices: dataset
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| spec.matches(row))
            .map(|(i, _)| i)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::model::CellValue;

    fn sample() -> Dataset {
        Dataset::from_rows(vec![
            vec![("A".into(), CellValue::Null), ("B".into(), CellValue::Number(1.0))],
            vec![("A".into(), CellValue::Null), ("B".into(), CellValue::Null)],
            vec![("A".into(), CellValue::Number(2.0)), ("B".into(), CellValue::Null)],
        ])
    }

    fn spec(checks: &[&str], combinator: Combinator, null_mode: NullMode) -> FilterSpec {
        FilterSpec {
            primary_column: "A".into(),
            check_columns: checks.iter().map(|c| c.to_string()).collect(),
            combinator,
            null_mode,
        }
    }

    #[test]
    fn and_non_null_keeps_first_row() {
        let ds = sample();
        let view = filter(&ds, &spec(&["B"], Combinator::And, NullMode::RequireNonNull));
        assert_eq!(view.indices(), &[0]);
    }

    #[test]
    fn and_null_keeps_second_row() {
        let ds = sample();
        let view = filter(&ds, &spec(&["B"], Combinator::And, NullMode::RequireNull));
        assert_eq!(view.indices(), &[1]);
    }

    #[test]
    fn empty_check_list_matches_nothing() {
        let ds = sample();
        for combinator in [Combinator::And, Combinator::Or] {
            for mode in [NullMode::RequireNull, NullMode::RequireNonNull] {
                assert!(filter(&ds, &spec(&[], combinator, mode)).is_empty());
            }
        }
    }

    #[test]
    fn unknown_columns_read_as_null() {
        let ds = sample();
        let view = filter(&ds, &spec(&["nope"], Combinator::And, NullMode::RequireNull));
        assert_eq!(view.indices(), &[0, 1]);

        let mut unknown_primary = spec(&["B"], Combinator::And, NullMode::RequireNull);
        unknown_primary.primary_column = "missing".into();
        assert_eq!(filter(&ds, &unknown_primary).indices(), &[1, 2]);
    }

    #[test]
    fn or_needs_one_passing_check() {
        let ds = Dataset::from_rows(vec![
            vec![
                ("A".into(), CellValue::Null),
                ("B".into(), CellValue::Null),
                ("C".into(), CellValue::Text("x".into())),
            ],
            vec![
                ("A".into(), CellValue::Null),
                ("B".into(), CellValue::Null),
                ("C".into(), CellValue::Null),
            ],
        ]);
        let or = filter(&ds, &spec(&["B", "C"], Combinator::Or, NullMode::RequireNonNull));
        assert_eq!(or.indices(), &[0]);
        let and = filter(&ds, &spec(&["B", "C"], Combinator::And, NullMode::RequireNonNull));
        assert!(and.is_empty());
    }

    #[test]
    fn from_inputs_validates_and_trims() {
        let spec = FilterSpec::from_inputs(" A ", "B, C,,", Combinator::Or, NullMode::RequireNull)
            .unwrap();
        assert_eq!(spec.primary_column, "A");
        assert_eq!(spec.check_columns, vec!["B", "C"]);

        assert_eq!(
            FilterSpec::from_inputs("  ", "B", Combinator::And, NullMode::RequireNull),
            Err(FilterError::MissingPrimaryColumn)
        );
        assert_eq!(
            FilterSpec::from_inputs("A", " , ", Combinator::And, NullMode::RequireNull),
            Err(FilterError::NoCheckColumns)
        );
    }

    #[test]
    fn all_view_covers_dataset_in_order() {
        let ds = sample();
        let view = FilteredView::all(&ds);
        assert_eq!(view.indices(), &[0, 1, 2]);
        assert_eq!(view.rows(&ds).count(), 3);
    }

    // -- property tests --

    const COLUMNS: [&str; 4] = ["A", "B", "C", "D"];

    fn cell_strategy() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Null),
            (-100i32..100).prop_map(|n| CellValue::Number(n as f64)),
            "[a-z]{1,4}".prop_map(CellValue::Text),
        ]
    }

    fn dataset_strategy() -> impl Strategy<Value = Dataset> {
        prop::collection::vec(prop::collection::vec(cell_strategy(), 4), 0..30).prop_map(
            |rows| {
                Dataset::from_rows(
                    rows.into_iter()
                        .map(|cells| {
                            COLUMNS.iter().map(|c| c.to_string()).zip(cells).collect()
                        })
                        .collect(),
                )
            },
        )
    }

    fn spec_strategy() -> impl Strategy<Value = FilterSpec> {
        (
            prop::sample::select(COLUMNS.to_vec()),
            prop::sample::subsequence(COLUMNS.to_vec(), 0..=4),
            prop_oneof![Just(Combinator::And), Just(Combinator::Or)],
            prop_oneof![Just(NullMode::RequireNull), Just(NullMode::RequireNonNull)],
        )
            .prop_map(|(primary, checks, combinator, null_mode)| FilterSpec {
                primary_column: primary.to_string(),
                check_columns: checks.into_iter().map(str::to_string).collect(),
                combinator,
                null_mode,
            })
    }

    proptest! {
        #[test]
        fn prop_result_rows_satisfy_predicate(ds in dataset_strategy(), spec in spec_strategy()) {
            let view = filter(&ds, &spec);
            prop_assert!(view.indices().windows(2).all(|w| w[0] < w[1]));
            for row in view.rows(&ds) {
                prop_assert!(row.is_null_at(&spec.primary_column));
                let passing = spec
                    .check_columns
                    .iter()
                    .filter(|c| row.is_null_at(c) == (spec.null_mode == NullMode::RequireNull))
                    .count();
                match spec.combinator {
                    Combinator::And => prop_assert_eq!(passing, spec.check_columns.len()),
                    Combinator::Or => prop_assert!(passing >= 1),
                }
            }
        }

        #[test]
        fn prop_empty_checks_yield_nothing(ds in dataset_strategy(), mut spec in spec_strategy()) {
            spec.check_columns.clear();
            prop_assert!(filter(&ds, &spec).is_empty());
        }

        #[test]
        fn prop_filter_is_idempotent(ds in dataset_strategy(), spec in spec_strategy()) {
            let first = filter(&ds, &spec);
            prop_assert_eq!(&filter(&ds, &spec), &first);
            prop_assert_eq!(first.refine(&ds, &spec), first);
        }
    }
}
