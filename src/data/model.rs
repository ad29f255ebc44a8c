use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Month – the time axis of the yearly source tables
// ---------------------------------------------------------------------------

/// A calendar month, parsed from the 3-letter abbreviations used in the
/// yearly source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// Parse a 3-letter abbreviation (case-insensitive). Anything else,
    /// including full month names, is rejected.
    pub fn parse(s: &str) -> Option<Month> {
        Month::ALL
            .iter()
            .copied()
            .find(|m| m.abbrev().eq_ignore_ascii_case(s.trim()))
    }

    pub fn abbrev(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }

    /// Month number, 1..=12.
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// First calendar day of this month in the given year.
    pub fn first_day(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.number(), 1)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of the long-format dataset
// ---------------------------------------------------------------------------

/// A single monthly reading for one monitoring location.
///
/// `aqi` is `None` when the location column was absent or empty in the
/// source table for that month.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub location: String,
    pub month: Month,
    pub year: i32,
    pub aqi: Option<f64>,
    /// First day of `(year, month)`, the sort key of the dataset.
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// AqiDataset – the canonical long-format dataset
// ---------------------------------------------------------------------------

/// The complete reshaped dataset, sorted ascending by date.
///
/// Built once per loaded data folder and read-only afterwards; every view
/// and the category classifier borrow it.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiDataset {
    /// All observations in date-ascending order.
    pub observations: Vec<Observation>,
    /// Monitoring locations in first-seen order.
    pub locations: Vec<String>,
    /// Years covered, ascending.
    pub years: Vec<i32>,
}

impl AqiDataset {
    /// Build the location/year indices from an observation list.
    /// The list must already be in canonical (date-ascending) order.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut locations: Vec<String> = Vec::new();
        let mut years: Vec<i32> = Vec::new();

        for obs in &observations {
            if !locations.contains(&obs.location) {
                locations.push(obs.location.clone());
            }
            if !years.contains(&obs.year) {
                years.push(obs.year);
            }
        }
        years.sort_unstable();

        AqiDataset {
            observations,
            locations,
            years,
        }
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AqiCategory – the fixed severity bands
// ---------------------------------------------------------------------------

/// The six AQI severity bands. Bounds are inclusive on both ends; SEVERE is
/// open-ended above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiCategory {
    Good,
    Satisfactory,
    Moderate,
    Poor,
    VeryPoor,
    Severe,
}

/// Raised when a band is selected by a name outside the fixed enumeration.
#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "unknown AQI category '{name}'; expected one of GOOD, SATISFACTORY, \
     MODERATE, POOR, VERY POOR, SEVERE"
)]
pub struct InvalidCategory {
    pub name: String,
}

impl AqiCategory {
    pub const ALL: [AqiCategory; 6] = [
        AqiCategory::Good,
        AqiCategory::Satisfactory,
        AqiCategory::Moderate,
        AqiCategory::Poor,
        AqiCategory::VeryPoor,
        AqiCategory::Severe,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AqiCategory::Good => "GOOD",
            AqiCategory::Satisfactory => "SATISFACTORY",
            AqiCategory::Moderate => "MODERATE",
            AqiCategory::Poor => "POOR",
            AqiCategory::VeryPoor => "VERY POOR",
            AqiCategory::Severe => "SEVERE",
        }
    }

    /// Inclusive `(lower, upper)` bounds; `None` means unbounded above.
    pub fn bounds(self) -> (f64, Option<f64>) {
        match self {
            AqiCategory::Good => (0.0, Some(50.0)),
            AqiCategory::Satisfactory => (51.0, Some(100.0)),
            AqiCategory::Moderate => (101.0, Some(200.0)),
            AqiCategory::Poor => (201.0, Some(300.0)),
            AqiCategory::VeryPoor => (301.0, Some(400.0)),
            AqiCategory::Severe => (401.0, None),
        }
    }

    /// Whether `aqi` falls inside this band's inclusive bounds.
    pub fn contains(self, aqi: f64) -> bool {
        let (lower, upper) = self.bounds();
        aqi >= lower && upper.map_or(true, |u| aqi <= u)
    }

    /// Classify a value by ascending upper-bound thresholds. Agrees with
    /// [`contains`](Self::contains) on every integer AQI value, which is the
    /// domain of the source data.
    pub fn of(aqi: f64) -> AqiCategory {
        AqiCategory::ALL
            .iter()
            .copied()
            .find(|c| c.bounds().1.map_or(true, |u| aqi <= u))
            .unwrap_or(AqiCategory::Severe)
    }

    /// Resolve a band by its display label, e.g. from a UI selection.
    pub fn from_label(name: &str) -> Result<AqiCategory, InvalidCategory> {
        AqiCategory::ALL
            .iter()
            .copied()
            .find(|c| c.label() == name)
            .ok_or_else(|| InvalidCategory {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parse_accepts_abbreviations() {
        assert_eq!(Month::parse("Jan"), Some(Month::Jan));
        assert_eq!(Month::parse("dec"), Some(Month::Dec));
        assert_eq!(Month::parse(" Sep "), Some(Month::Sep));
    }

    #[test]
    fn month_parse_rejects_everything_else() {
        assert_eq!(Month::parse("Jann"), None);
        assert_eq!(Month::parse("January"), None);
        assert_eq!(Month::parse(""), None);
    }

    #[test]
    fn month_numbers_cover_the_year() {
        let numbers: Vec<u32> = Month::ALL.iter().map(|m| m.number()).collect();
        assert_eq!(numbers, (1..=12).collect::<Vec<u32>>());
    }

    #[test]
    fn first_day_derives_from_year_and_month() {
        let date = Month::Feb.first_day(2016).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
    }

    #[test]
    fn category_bounds_are_inclusive() {
        assert!(AqiCategory::Good.contains(0.0));
        assert!(AqiCategory::Good.contains(50.0));
        assert!(!AqiCategory::Good.contains(51.0));
        assert!(AqiCategory::Satisfactory.contains(51.0));
        assert!(AqiCategory::Severe.contains(401.0));
        assert!(AqiCategory::Severe.contains(1200.0));
    }

    #[test]
    fn integer_values_fall_in_exactly_one_band() {
        for aqi in 0..=600 {
            let matching: Vec<AqiCategory> = AqiCategory::ALL
                .iter()
                .copied()
                .filter(|c| c.contains(aqi as f64))
                .collect();
            assert_eq!(matching.len(), 1, "AQI {aqi} matched {matching:?}");
            assert_eq!(matching[0], AqiCategory::of(aqi as f64));
        }
    }

    #[test]
    fn from_label_round_trips_all_bands() {
        for category in AqiCategory::ALL {
            assert_eq!(AqiCategory::from_label(category.label()), Ok(category));
        }
    }

    #[test]
    fn from_label_rejects_unknown_names() {
        let err = AqiCategory::from_label("TERRIBLE").unwrap_err();
        assert_eq!(err.name, "TERRIBLE");
        assert!(err.to_string().contains("SATISFACTORY"));
    }

    #[test]
    fn dataset_indices_from_observations() {
        let observations = vec![
            Observation {
                location: "Abids".to_string(),
                month: Month::Jan,
                year: 2016,
                aqi: Some(80.0),
                date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            },
            Observation {
                location: "Charminar".to_string(),
                month: Month::Jan,
                year: 2016,
                aqi: None,
                date: NaiveDate::from_ymd_opt(2016, 1, 1).unwrap(),
            },
            Observation {
                location: "Abids".to_string(),
                month: Month::Jan,
                year: 2017,
                aqi: Some(95.0),
                date: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            },
        ];
        let dataset = AqiDataset::from_observations(observations);
        assert_eq!(dataset.locations, vec!["Abids", "Charminar"]);
        assert_eq!(dataset.years, vec![2016, 2017]);
        assert_eq!(dataset.len(), 3);
    }
}
