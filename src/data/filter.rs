use super::model::{Dataset, Transaction};

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Inclusive age bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeRange {
    pub lo: i64,
    pub hi: i64,
}

impl AgeRange {
    /// Build a range, ordering the bounds if they arrive swapped.
    pub fn new(lo: i64, hi: i64) -> Self {
        AgeRange {
            lo: lo.min(hi),
            hi: lo.max(hi),
        }
    }

    pub fn contains(&self, age: i64) -> bool {
        self.lo <= age && age <= self.hi
    }

    /// The default window intersected with the observed `bounds`. When the
    /// two do not overlap, the whole observed range is used.
    pub fn default_within(bounds: (i64, i64), window: (i64, i64)) -> Self {
        let (min, max) = bounds;
        let window = AgeRange::new(window.0, window.1);
        let lo = window.lo.max(min);
        let hi = window.hi.min(max);
        if lo > hi {
            log::warn!(
                "default age window {}..={} lies outside observed ages {min}..={max}",
                window.lo,
                window.hi
            );
            AgeRange::new(min, max)
        } else {
            AgeRange { lo, hi }
        }
    }
}

/// The sidebar selection: one size, one gender, an age range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterParams {
    pub size: String,
    pub gender: String,
    pub age: AgeRange,
}

impl FilterParams {
    /// First observed size and gender with the default age window.
    ///
    /// `None` when the dataset offers no size, no gender or no age to pick.
    pub fn defaults_for(dataset: &Dataset, window: (i64, i64)) -> Option<Self> {
        Some(FilterParams {
            size: dataset.sizes.first()?.clone(),
            gender: dataset.genders.first()?.clone(),
            age: AgeRange::default_within(dataset.age_bounds?, window),
        })
    }

    /// Whether a transaction satisfies all three predicates.
    pub fn matches(&self, t: &Transaction) -> bool {
        t.size.as_deref() == Some(self.size.as_str())
            && t.gender.as_deref() == Some(self.gender.as_str())
            && t.age.is_some_and(|age| self.age.contains(age))
    }
}

// ---------------------------------------------------------------------------
// Subset – the rows passing the current filter
// ---------------------------------------------------------------------------

/// A read-only view of the rows passing a filter, in original order.
#[derive(Debug, Clone)]
pub struct Subset<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> Subset<'a> {
    /// View over the given row indices.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        Subset { dataset, indices }
    }

    /// View over every row of the dataset.
    #[cfg(test)]
    pub fn all(dataset: &'a Dataset) -> Self {
        Subset::from_indices(dataset, (0..dataset.len()).collect())
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
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

    pub fn rows(&self) -> impl Iterator<Item = &'a Transaction> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.transactions[i])
    }
}

/// Rows with the selected size and gender whose age lies within the range.
pub fn filter<'a>(dataset: &'a Dataset, params: &FilterParams) -> Subset<'a> {
    let indices = dataset
        .transactions
        .iter()
        .enumerate()
        .filter(|(_, t)| params.matches(t))
        .map(|(i, _)| i)
        .collect();
    Subset::from_indices(dataset, indices)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::data::fixtures::{dataset, row, three_rows};

    fn params(size: &str, gender: &str, lo: i64, hi: i64) -> FilterParams {
        FilterParams {
            size: size.into(),
            gender: gender.into(),
            age: AgeRange::new(lo, hi),
        }
    }

    #[test]
    fn three_row_scenario_keeps_first_two() {
        let ds = three_rows();
        let subset = filter(&ds, &params("M", "F", 20, 40));
        assert_eq!(subset.indices(), &[0, 1]);
        let prices: Vec<f64> = subset.rows().map(|t| t.total_price).collect();
        assert_eq!(prices, vec![10.0, 20.0]);
    }

    #[test]
    fn age_bounds_are_inclusive() {
        let ds = three_rows();
        assert_eq!(filter(&ds, &params("M", "F", 25, 25)).indices(), &[0]);
        assert_eq!(filter(&ds, &params("M", "F", 30, 30)).indices(), &[1]);
        assert!(filter(&ds, &params("M", "F", 26, 29)).is_empty());
    }

    #[test]
    fn unmatched_combination_is_empty() {
        let ds = three_rows();
        let subset = filter(&ds, &params("L", "M", 0, 100));
        assert!(subset.is_empty());
        assert_eq!(subset.rows().count(), 0);
    }

    #[test]
    fn rows_without_age_never_match() {
        let mut t = row("M", "F", 0, "shirt", 1.0);
        t.age = None;
        let ds = dataset(vec![t]);
        assert!(filter(&ds, &params("M", "F", i64::MIN, i64::MAX)).is_empty());
    }

    #[test]
    fn default_window_is_clamped_to_observed_ages() {
        assert_eq!(AgeRange::default_within((18, 70), (20, 40)), AgeRange::new(20, 40));
        assert_eq!(AgeRange::default_within((25, 35), (20, 40)), AgeRange::new(25, 35));
        assert_eq!(AgeRange::default_within((30, 70), (20, 40)), AgeRange::new(30, 40));
        assert_eq!(AgeRange::default_within((45, 60), (20, 40)), AgeRange::new(45, 60));
    }

    #[test]
    fn defaults_pick_first_observed_options() {
        let ds = dataset(vec![
            row("L", "M", 55, "shirt", 1.0),
            row("M", "F", 22, "shirt", 1.0),
        ]);
        let p = FilterParams::defaults_for(&ds, (20, 40)).unwrap();
        assert_eq!(p, params("L", "M", 22, 40));
        assert!(FilterParams::defaults_for(&dataset(vec![]), (20, 40)).is_none());
    }

    #[test]
    fn swapped_bounds_are_ordered() {
        assert_eq!(AgeRange::new(40, 20), AgeRange { lo: 20, hi: 40 });
    }

    const SIZES: [&str; 3] = ["S", "M", "L"];
    const GENDERS: [&str; 2] = ["F", "M"];

    proptest! {
        #[test]
        fn filter_is_sound_and_complete(
            rows in prop::collection::vec((0usize..3, 0usize..2, 15i64..70), 0..60),
            size in 0usize..3,
            gender in 0usize..2,
            lo in 15i64..70,
            span in 0i64..30,
        ) {
            let ds = dataset(
                rows.iter()
                    .map(|&(s, g, a)| row(SIZES[s], GENDERS[g], a, "shirt", 1.0))
                    .collect(),
            );
            let p = params(SIZES[size], GENDERS[gender], lo, lo + span);
            let subset = filter(&ds, &p);

            for t in subset.rows() {
                prop_assert!(p.matches(t));
            }
            let expected: Vec<usize> = rows
                .iter()
                .enumerate()
                .filter(|(_, r)| {
                    let (s, g, a) = **r;
                    s == size && g == gender && lo <= a && a <= lo + span
                })
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(subset.indices(), expected.as_slice());
        }
    }
}
