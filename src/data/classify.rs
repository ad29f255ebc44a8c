use super::model::{AqiCategory, AqiDataset};

// ---------------------------------------------------------------------------
// Category filter: which observations fall in a severity band
// ---------------------------------------------------------------------------

/// Return indices of observations whose AQI falls inside the band's
/// inclusive bounds, in canonical (date-ascending) order.
///
/// Observations with an absent AQI belong to no band. An empty result is
/// valid: the band simply never occurred.
pub fn filter_by_category(dataset: &AqiDataset, category: AqiCategory) -> Vec<usize> {
    dataset
        .observations
        .iter()
        .enumerate()
        .filter(|(_, obs)| obs.aqi.map_or(false, |v| category.contains(v)))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Counting table: occurrences per (location, year)
// ---------------------------------------------------------------------------

/// Occurrence counts for a filtered observation list, over every
/// `(location, year)` pair of the canonical dataset. Pairs with no match
/// count zero rather than being dropped.
///
/// Rows follow the dataset's location order, columns its ascending years;
/// both are stable for the life of the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts {
    pub locations: Vec<String>,
    pub years: Vec<i32>,
    /// `counts[location_idx][year_idx]`
    counts: Vec<Vec<u32>>,
}

impl CategoryCounts {
    pub fn get(&self, location_idx: usize, year_idx: usize) -> u32 {
        self.counts[location_idx][year_idx]
    }

    /// Sum over all cells; equals the filtered list's length.
    pub fn total(&self) -> u32 {
        self.counts.iter().flatten().sum()
    }
}

/// Build the counting table for a filtered index list produced by
/// [`filter_by_category`] on the same dataset.
pub fn category_counts(dataset: &AqiDataset, filtered: &[usize]) -> CategoryCounts {
    let mut counts = vec![vec![0u32; dataset.years.len()]; dataset.locations.len()];

    for &idx in filtered {
        let obs = &dataset.observations[idx];
        let location_idx = dataset
            .locations
            .iter()
            .position(|l| *l == obs.location);
        let year_idx = dataset.years.iter().position(|y| *y == obs.year);
        if let (Some(li), Some(yi)) = (location_idx, year_idx) {
            counts[li][yi] += 1;
        }
    }

    CategoryCounts {
        locations: dataset.locations.clone(),
        years: dataset.years.clone(),
        counts,
    }
}
