use chrono::NaiveDate;

use super::model::{AqiDataset, Month};

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Arithmetic mean; `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Five-number summary backing a box-plot element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Five-number summary of a sample; `None` for an empty slice.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(BoxStats {
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Linear-interpolated percentile over an already sorted, non-empty slice.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let weight = rank - lo as f64;
        sorted[lo] * (1.0 - weight) + sorted[hi] * weight
    }
}

// ---------------------------------------------------------------------------
// Groupings for the distribution views
// ---------------------------------------------------------------------------

/// Present AQI values grouped per year, years ascending.
pub fn values_by_year(dataset: &AqiDataset) -> Vec<(i32, Vec<f64>)> {
    dataset
        .years
        .iter()
        .map(|&year| {
            let values = dataset
                .observations
                .iter()
                .filter(|o| o.year == year)
                .filter_map(|o| o.aqi)
                .collect();
            (year, values)
        })
        .collect()
}

/// Present AQI values grouped per location, dataset order.
pub fn values_by_location(dataset: &AqiDataset) -> Vec<(String, Vec<f64>)> {
    dataset
        .locations
        .iter()
        .map(|location| {
            let values = dataset
                .observations
                .iter()
                .filter(|o| o.location == *location)
                .filter_map(|o| o.aqi)
                .collect();
            (location.clone(), values)
        })
        .collect()
}

/// Present AQI values per `(year, month)` cell, for the seasonal view.
pub fn values_by_year_month(dataset: &AqiDataset) -> Vec<(i32, Vec<(Month, Vec<f64>)>)> {
    dataset
        .years
        .iter()
        .map(|&year| {
            let per_month = Month::ALL
                .iter()
                .map(|&month| {
                    let values = dataset
                        .observations
                        .iter()
                        .filter(|o| o.year == year && o.month == month)
                        .filter_map(|o| o.aqi)
                        .collect();
                    (month, values)
                })
                .collect();
            (year, per_month)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Time-ordered aggregates
// ---------------------------------------------------------------------------

/// Mean AQI across locations for each date, grouped per year. Dates with no
/// present reading are skipped. Relies on the dataset's date ordering.
pub fn monthly_mean_by_year(dataset: &AqiDataset) -> Vec<(i32, Vec<(NaiveDate, f64)>)> {
    dataset
        .years
        .iter()
        .map(|&year| {
            let mut series = Vec::new();
            for month in Month::ALL {
                let values: Vec<f64> = dataset
                    .observations
                    .iter()
                    .filter(|o| o.year == year && o.month == month)
                    .filter_map(|o| o.aqi)
                    .collect();
                if let (Some(avg), Some(date)) = (mean(&values), month.first_day(year)) {
                    series.push((date, avg));
                }
            }
            (year, series)
        })
        .collect()
}

/// Mean AQI per year, for the overall trend line.
pub fn yearly_mean(dataset: &AqiDataset) -> Vec<(i32, f64)> {
    values_by_year(dataset)
        .into_iter()
        .filter_map(|(year, values)| mean(&values).map(|avg| (year, avg)))
        .collect()
}

/// Per-location time series of present readings, date order.
pub fn location_series(dataset: &AqiDataset) -> Vec<(String, Vec<(NaiveDate, f64)>)> {
    dataset
        .locations
        .iter()
        .map(|location| {
            let series = dataset
                .observations
                .iter()
                .filter(|o| o.location == *location)
                .filter_map(|o| o.aqi.map(|v| (o.date, v)))
                .collect();
            (location.clone(), series)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Location × Year pivot (hotspots heatmap)
// ---------------------------------------------------------------------------

/// Mean AQI pivoted by location (rows) and year (columns). `None` cells had
/// no present reading.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub locations: Vec<String>,
    pub years: Vec<i32>,
    /// `values[location_idx][year_idx]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    /// Min and max over the present cells, for color normalization.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut range: Option<(f64, f64)> = None;
        for value in self.values.iter().flatten().flatten() {
            range = Some(match range {
                Some((lo, hi)) => (lo.min(*value), hi.max(*value)),
                None => (*value, *value),
            });
        }
        range
    }
}

pub fn mean_by_location_year(dataset: &AqiDataset) -> PivotTable {
    let values = dataset
        .locations
        .iter()
        .map(|location| {
            dataset
                .years
                .iter()
                .map(|&year| {
                    let cell: Vec<f64> = dataset
                        .observations
                        .iter()
                        .filter(|o| o.location == *location && o.year == year)
                        .filter_map(|o| o.aqi)
                        .collect();
                    mean(&cell)
                })
                .collect()
        })
        .collect();

    PivotTable {
        locations: dataset.locations.clone(),
        years: dataset.years.clone(),
        values,
    }
}

// ---------------------------------------------------------------------------
// Pairwise correlation (correlation heatmap)
// ---------------------------------------------------------------------------

/// Pearson correlation of AQI between every pair of locations, computed over
/// the dates where both have a present reading. `None` when fewer than two
/// paired readings exist or either side has zero variance.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub locations: Vec<String>,
    /// `values[i][j]`, symmetric with unit diagonal where defined.
    pub values: Vec<Vec<Option<f64>>>,
}

pub fn correlation_matrix(dataset: &AqiDataset) -> CorrelationMatrix {
    // Location × Date pivot; the canonical order makes columns align.
    let series: Vec<Vec<Option<f64>>> = dataset
        .locations
        .iter()
        .map(|location| {
            dataset
                .observations
                .iter()
                .filter(|o| o.location == *location)
                .map(|o| o.aqi)
                .collect()
        })
        .collect();

    let n = series.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        locations: dataset.locations.clone(),
        values,
    }
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let paired: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if paired.len() < 2 {
        return None;
    }

    let n = paired.len() as f64;
    let mean_x = paired.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = paired.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in &paired {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

// ---------------------------------------------------------------------------
// Histogram (distribution view)
// ---------------------------------------------------------------------------

/// Fixed-width histogram of present AQI values, one count row per location
/// over shared bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bin_width: f64,
    /// Left edge of the first bin.
    pub start: f64,
    /// Per-location counts, parallel to shared bins.
    pub counts: Vec<(String, Vec<u32>)>,
}

impl Histogram {
    /// Center of bin `i`, for bar placement.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }

    pub fn n_bins(&self) -> usize {
        self.counts.first().map_or(0, |(_, c)| c.len())
    }
}

/// Bin all present readings into shared `bin_width`-wide bins spanning the
/// observed value range. Values on a bin edge go to the higher bin, except
/// the maximum which stays in the last.
pub fn histogram_by_location(dataset: &AqiDataset, bin_width: f64) -> Histogram {
    let present: Vec<f64> = dataset.observations.iter().filter_map(|o| o.aqi).collect();
    if present.is_empty() {
        return Histogram {
            bin_width,
            start: 0.0,
            counts: Vec::new(),
        };
    }
    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let start = (min / bin_width).floor() * bin_width;
    let n_bins = (((max - start) / bin_width).floor() as usize) + 1;

    let counts = dataset
        .locations
        .iter()
        .map(|location| {
            let mut bins = vec![0u32; n_bins];
            for obs in &dataset.observations {
                if obs.location != *location {
                    continue;
                }
                if let Some(value) = obs.aqi {
                    let bin = (((value - start) / bin_width).floor() as usize).min(n_bins - 1);
                    bins[bin] += 1;
                }
            }
            (location.clone(), bins)
        })
        .collect();

    Histogram {
        bin_width,
        start,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Observation;

    fn observation(location: &str, month: Month, year: i32, aqi: Option<f64>) -> Observation {
        Observation {
            location: location.to_string(),
            month,
            year,
            aqi,
            date: month.first_day(year).unwrap(),
        }
    }

    fn two_location_dataset() -> AqiDataset {
        AqiDataset::from_observations(vec![
            observation("A", Month::Jan, 2016, Some(40.0)),
            observation("B", Month::Jan, 2016, Some(80.0)),
            observation("A", Month::Feb, 2016, Some(60.0)),
            observation("B", Month::Feb, 2016, Some(120.0)),
            observation("A", Month::Jan, 2017, Some(20.0)),
            observation("B", Month::Jan, 2017, None),
        ])
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[10.0, 20.0]), Some(15.0));
    }

    #[test]
    fn box_stats_five_number_summary() {
        let stats = box_stats(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(box_stats(&[]), None);
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.5), 2.5);
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 1.0), 4.0);
    }

    #[test]
    fn yearly_mean_skips_absent_readings() {
        let dataset = two_location_dataset();
        let means = yearly_mean(&dataset);
        assert_eq!(means, vec![(2016, 75.0), (2017, 20.0)]);
    }

    #[test]
    fn monthly_mean_averages_across_locations() {
        let dataset = two_location_dataset();
        let by_year = monthly_mean_by_year(&dataset);
        assert_eq!(by_year.len(), 2);
        let (year, series) = &by_year[0];
        assert_eq!(*year, 2016);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].1, 60.0); // Jan 2016: (40 + 80) / 2
        assert_eq!(series[1].1, 90.0); // Feb 2016: (60 + 120) / 2
    }

    #[test]
    fn pivot_cells_are_none_when_all_readings_absent() {
        let dataset = two_location_dataset();
        let pivot = mean_by_location_year(&dataset);
        assert_eq!(pivot.locations, vec!["A", "B"]);
        assert_eq!(pivot.years, vec![2016, 2017]);
        assert_eq!(pivot.values[0][0], Some(50.0)); // A/2016
        assert_eq!(pivot.values[1][1], None); // B/2017: only a null reading
        assert_eq!(pivot.value_range(), Some((20.0, 100.0)));
    }

    #[test]
    fn correlation_of_linearly_related_series() {
        // B = 2 * A across the same dates: perfectly correlated.
        let dataset = AqiDataset::from_observations(vec![
            observation("A", Month::Jan, 2016, Some(10.0)),
            observation("B", Month::Jan, 2016, Some(20.0)),
            observation("A", Month::Feb, 2016, Some(20.0)),
            observation("B", Month::Feb, 2016, Some(40.0)),
            observation("A", Month::Mar, 2016, Some(30.0)),
            observation("B", Month::Mar, 2016, Some(60.0)),
        ]);
        let matrix = correlation_matrix(&dataset);
        let r = matrix.values[0][1].unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!((matrix.values[0][0].unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.values[0][1], matrix.values[1][0]);
    }

    #[test]
    fn correlation_is_none_without_enough_paired_readings() {
        let dataset = AqiDataset::from_observations(vec![
            observation("A", Month::Jan, 2016, Some(10.0)),
            observation("B", Month::Jan, 2016, None),
            observation("A", Month::Feb, 2016, Some(20.0)),
            observation("B", Month::Feb, 2016, Some(40.0)),
        ]);
        let matrix = correlation_matrix(&dataset);
        assert_eq!(matrix.values[0][1], None);
    }

    #[test]
    fn histogram_bins_share_edges_across_locations() {
        let dataset = AqiDataset::from_observations(vec![
            observation("A", Month::Jan, 2016, Some(10.0)),
            observation("B", Month::Jan, 2016, Some(60.0)),
            observation("A", Month::Feb, 2016, Some(40.0)),
            observation("B", Month::Feb, 2016, Some(110.0)),
        ]);
        let hist = histogram_by_location(&dataset, 50.0);
        assert_eq!(hist.start, 0.0);
        assert_eq!(hist.n_bins(), 3);
        assert_eq!(hist.counts[0], ("A".to_string(), vec![2, 0, 0]));
        assert_eq!(hist.counts[1], ("B".to_string(), vec![0, 1, 1]));
        assert_eq!(hist.bin_center(0), 25.0);
    }

    #[test]
    fn histogram_of_empty_dataset_is_empty() {
        let dataset = AqiDataset::from_observations(vec![observation(
            "A",
            Month::Jan,
            2016,
            None,
        )]);
        let hist = histogram_by_location(&dataset, 50.0);
        assert_eq!(hist.n_bins(), 0);
        assert!(hist.counts.is_empty());
    }
}
