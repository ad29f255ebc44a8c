use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{AqiDataset, Month, Observation};

/// File stem of the per-year sources, completed as
/// `<dir>/hyd_air_quality_<year>.<ext>`.
const SOURCE_STEM: &str = "hyd_air_quality";

/// Candidate extensions for a year's source, tried in order.
const EXTENSIONS: [&str; 3] = ["csv", "parquet", "json"];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Where the yearly tables live and which years to load.
///
/// Fixed at construction time; loading fails outright if any year in the
/// range has no source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Directory containing the per-year source files.
    pub dir: PathBuf,
    /// Inclusive range of years to load.
    pub years: std::ops::RangeInclusive<i32>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Data"),
            years: 2016..=2023,
        }
    }
}

impl LoaderConfig {
    /// Config for the default year range rooted at `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Candidate source paths for one year, in precedence order.
    fn candidates(&self, year: i32) -> impl Iterator<Item = PathBuf> + '_ {
        EXTENSIONS
            .iter()
            .map(move |ext| self.dir.join(format!("{SOURCE_STEM}_{year}.{ext}")))
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why building the canonical dataset failed. Every variant is fatal to the
/// whole load; there is no partial dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no AQI source for year {year} in {} (looked for hyd_air_quality_{year}.csv/.parquet/.json)", dir.display())]
    MissingSource { year: i32, dir: PathBuf },

    #[error("failed to read {} (year {year})", path.display())]
    Read {
        year: i32,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} (year {year}) is not a valid AQI table: {detail}", path.display())]
    Parse {
        year: i32,
        path: PathBuf,
        detail: String,
    },

    #[error("year {year}, row {row}: unrecognized month '{value}'")]
    DateParse {
        year: i32,
        row: usize,
        value: String,
    },
}

// ---------------------------------------------------------------------------
// Wide per-year tables (pre-melt)
// ---------------------------------------------------------------------------

/// One year's table as found on disk: a month token per row, one value
/// column per location. The year itself comes from the file name, not the
/// file contents.
struct RawYearTable {
    year: i32,
    /// Location columns in file order.
    locations: Vec<String>,
    rows: Vec<RawRow>,
}

struct RawRow {
    /// Unvalidated month token; parsed when dates are derived.
    month: String,
    /// One cell per location column; `None` for empty cells.
    values: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Build the canonical long-format dataset from the configured year range.
///
/// Pipeline: load each year's wide table (ascending), concatenate over the
/// union of location columns, melt row-major to one observation per
/// (location, month, year), derive the date, stable-sort by date.
///
/// Pure apart from reading the sources; identical inputs yield an identical
/// dataset in identical order.
pub fn load_dataset(config: &LoaderConfig) -> Result<AqiDataset, LoadError> {
    let mut tables = Vec::new();
    for year in config.years.clone() {
        tables.push(load_year_table(config, year)?);
    }

    // Union of location columns across all years, first-seen order.
    let mut union: Vec<String> = Vec::new();
    for table in &tables {
        for location in &table.locations {
            if !union.contains(location) {
                union.push(location.clone());
            }
        }
    }

    let mut observations = Vec::new();
    for table in &tables {
        // union index → column index in this year's table
        let column_of: Vec<Option<usize>> = union
            .iter()
            .map(|loc| table.locations.iter().position(|l| l == loc))
            .collect();

        for (row_no, row) in table.rows.iter().enumerate() {
            let month = parse_row_month(&row.month, table.year, row_no)?;
            let date = month
                .first_day(table.year)
                .ok_or_else(|| LoadError::DateParse {
                    year: table.year,
                    row: row_no,
                    value: row.month.clone(),
                })?;

            for (location, column) in union.iter().zip(&column_of) {
                observations.push(Observation {
                    location: location.clone(),
                    month,
                    year: table.year,
                    aqi: column.and_then(|c| row.values[c]),
                    date,
                });
            }
        }
    }

    // Stable, so same-date observations keep their melt order.
    observations.sort_by_key(|obs| obs.date);

    Ok(AqiDataset::from_observations(observations))
}

fn parse_row_month(token: &str, year: i32, row: usize) -> Result<Month, LoadError> {
    Month::parse(token).ok_or_else(|| LoadError::DateParse {
        year,
        row,
        value: token.to_string(),
    })
}

fn load_year_table(config: &LoaderConfig, year: i32) -> Result<RawYearTable, LoadError> {
    for path in config.candidates(year) {
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        return match ext.as_str() {
            "csv" => read_csv_table(&path, year),
            "parquet" => read_parquet_table(&path, year),
            _ => read_json_table(&path, year),
        };
    }
    Err(LoadError::MissingSource {
        year,
        dir: config.dir.clone(),
    })
}

// ---------------------------------------------------------------------------
// Session cache
// ---------------------------------------------------------------------------

/// Owns the one canonical dataset of a session, keyed on the configuration
/// that produced it. A lookup with a different configuration reloads;
/// otherwise the cached dataset is returned without touching the sources.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(LoaderConfig, AqiDataset)>,
}

impl DatasetCache {
    pub fn get_or_load(&mut self, config: &LoaderConfig) -> Result<&AqiDataset, LoadError> {
        if !matches!(&self.entry, Some((cached, _)) if cached == config) {
            self.entry = Some((config.clone(), load_dataset(config)?));
        }
        let (_, dataset) = self.entry.as_ref().expect("cache entry populated above");
        Ok(dataset)
    }

    /// The cached dataset, if any, regardless of configuration.
    pub fn cached(&self) -> Option<&AqiDataset> {
        self.entry.as_ref().map(|(_, dataset)| dataset)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: header row `Month,<loc>,<loc>,...`; one row per calendar
/// month; empty cells mean "no reading".
fn read_csv_table(path: &Path, year: i32) -> Result<RawYearTable, LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(e, year, path))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(e, year, path))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let month_idx = headers
        .iter()
        .position(|h| h == "Month")
        .ok_or_else(|| parse_error(year, path, "missing 'Month' column"))?;

    let locations: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != month_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| csv_error(e, year, path))?;

        let month = record.get(month_idx).unwrap_or("").to_string();
        let mut values = Vec::with_capacity(locations.len());
        for (col_idx, cell) in record.iter().enumerate() {
            if col_idx == month_idx {
                continue;
            }
            values.push(parse_aqi_cell(cell).map_err(|detail| {
                parse_error(
                    year,
                    path,
                    format!("row {row_no}, column '{}': {detail}", headers[col_idx]),
                )
            })?);
        }
        rows.push(RawRow { month, values });
    }

    Ok(RawYearTable {
        year,
        locations,
        rows,
    })
}

/// Empty cells are absent readings; everything else must parse as a number.
fn parse_aqi_cell(cell: &str) -> Result<Option<f64>, String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("'{cell}' is not a number"))
}

fn csv_error(e: csv::Error, year: i32, path: &Path) -> LoadError {
    let detail = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Read {
            year,
            path: path.to_path_buf(),
            source,
        },
        _ => parse_error(year, path, detail),
    }
}

fn parse_error(year: i32, path: &Path, detail: impl Into<String>) -> LoadError {
    LoadError::Parse {
        year,
        path: path.to_path_buf(),
        detail: detail.into(),
    }
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Month": "Jan", "Abids": 92.0, "Charminar": 101.0 },
///   ...
/// ]
/// ```
fn read_json_table(path: &Path, year: i32) -> Result<RawYearTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        year,
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue =
        serde_json::from_str(&text).map_err(|e| parse_error(year, path, e.to_string()))?;

    let records = root
        .as_array()
        .ok_or_else(|| parse_error(year, path, "expected a top-level JSON array"))?;

    // Location columns: every key other than Month, first-seen across records.
    let mut locations: Vec<String> = Vec::new();
    for record in records {
        let Some(obj) = record.as_object() else {
            continue;
        };
        for key in obj.keys() {
            if key != "Month" && !locations.contains(key) {
                locations.push(key.clone());
            }
        }
    }

    let mut rows = Vec::new();
    for (row_no, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| parse_error(year, path, format!("row {row_no} is not a JSON object")))?;

        let month = obj
            .get("Month")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                parse_error(year, path, format!("row {row_no}: missing 'Month' string"))
            })?
            .to_string();

        let mut values = Vec::with_capacity(locations.len());
        for location in &locations {
            let value = match obj.get(location) {
                None | Some(JsonValue::Null) => None,
                Some(JsonValue::Number(n)) => n.as_f64(),
                Some(other) => {
                    return Err(parse_error(
                        year,
                        path,
                        format!("row {row_no}, column '{location}': {other} is not a number"),
                    ));
                }
            };
            values.push(value);
        }
        rows.push(RawRow { month, values });
    }

    Ok(RawYearTable {
        year,
        locations,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Parquet schema: `Month` Utf8 column plus one numeric column per location
/// (Float64/Float32/Int64/Int32, nullable). Works with files written by both
/// Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn read_parquet_table(path: &Path, year: i32) -> Result<RawYearTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Read {
        year,
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parse_error(year, path, e.to_string()))?;
    let reader = builder
        .build()
        .map_err(|e| parse_error(year, path, e.to_string()))?;

    let mut locations: Vec<String> = Vec::new();
    let mut rows: Vec<RawRow> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.map_err(|e| parse_error(year, path, e.to_string()))?;
        let schema = batch.schema();

        let month_idx = schema
            .index_of("Month")
            .map_err(|_| parse_error(year, path, "missing 'Month' column"))?;
        let month_col = batch.column(month_idx);

        let value_cols: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != month_idx)
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        if locations.is_empty() {
            locations = value_cols.iter().map(|(_, name)| name.clone()).collect();
        }

        for row in 0..batch.num_rows() {
            let month = extract_month(month_col, row)
                .ok_or_else(|| parse_error(year, path, format!("row {row}: 'Month' is not a string")))?;

            let mut values = Vec::with_capacity(value_cols.len());
            for (col_idx, col_name) in &value_cols {
                let value = numeric_cell(batch.column(*col_idx), row).map_err(|detail| {
                    parse_error(year, path, format!("row {row}, column '{col_name}': {detail}"))
                })?;
                values.push(value);
            }
            rows.push(RawRow { month, values });
        }
    }

    Ok(RawYearTable {
        year,
        locations,
        rows,
    })
}

// -- Parquet / Arrow helpers --

fn extract_month(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|arr| arr.value(row).to_string()),
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            Some(arr.value(row).to_string())
        }
        _ => None,
    }
}

/// Extract a nullable numeric cell as `f64`.
fn numeric_cell(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>, String> {
    if col.is_null(row) {
        return Ok(None);
    }
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(Some(arr.value(row)))
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(Some(arr.value(row) as f64))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int64Array>() {
        Ok(Some(arr.value(row) as f64))
    } else if let Some(arr) = col.as_any().downcast_ref::<Int32Array>() {
        Ok(Some(arr.value(row) as f64))
    } else {
        Err(format!("unsupported column type {:?}", col.data_type()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(dir: &Path, year: i32, ext: &str, contents: &str) {
        fs::write(dir.join(format!("{SOURCE_STEM}_{year}.{ext}")), contents).unwrap();
    }

    fn full_year_csv(values: impl Fn(Month) -> String) -> String {
        let mut out = String::from("Month,Abids,Charminar\n");
        for month in Month::ALL {
            out.push_str(&format!("{},{}\n", month.abbrev(), values(month)));
        }
        out
    }

    #[test]
    fn single_year_melts_row_major() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A\nJan,40\nFeb,120\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        let dataset = load_dataset(&config).unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.observations[0];
        assert_eq!(first.location, "A");
        assert_eq!(first.month, Month::Jan);
        assert_eq!(first.year, 2016);
        assert_eq!(first.aqi, Some(40.0));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
        assert_eq!(dataset.observations[1].aqi, Some(120.0));
    }

    #[test]
    fn completeness_twelve_observations_per_location_year() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", &full_year_csv(|m| format!("{},{}", m.number() * 10, m.number() * 11)));
        write_source(tmp.path(), 2017, "csv", &full_year_csv(|m| format!("{},{}", m.number() * 12, m.number() * 13)));

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2017,
        };
        let dataset = load_dataset(&config).unwrap();

        for year in [2016, 2017] {
            for location in ["Abids", "Charminar"] {
                let n = dataset
                    .observations
                    .iter()
                    .filter(|o| o.year == year && o.location == location)
                    .count();
                assert_eq!(n, 12, "{location}/{year}");
            }
        }
    }

    #[test]
    fn union_of_columns_fills_absent_years_with_null() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,Abids,Jeedimetla\nJan,90,70\n");
        write_source(tmp.path(), 2017, "csv", "Month,Abids\nJan,95\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2017,
        };
        let dataset = load_dataset(&config).unwrap();

        assert_eq!(dataset.locations, vec!["Abids", "Jeedimetla"]);
        let ghost: Vec<&Observation> = dataset
            .observations
            .iter()
            .filter(|o| o.location == "Jeedimetla" && o.year == 2017)
            .collect();
        assert_eq!(ghost.len(), 1);
        assert_eq!(ghost[0].aqi, None);
    }

    #[test]
    fn sorted_ascending_by_date_with_stable_ties() {
        let tmp = TempDir::new().unwrap();
        // Rows intentionally out of calendar order.
        write_source(tmp.path(), 2016, "csv", "Month,A,B\nMar,3,30\nJan,1,10\nFeb,2,20\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        let dataset = load_dataset(&config).unwrap();

        for pair in dataset.observations.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
        // Same-date observations keep melt (column) order.
        assert_eq!(dataset.observations[0].location, "A");
        assert_eq!(dataset.observations[1].location, "B");
        assert_eq!(dataset.observations[0].month, Month::Jan);
    }

    #[test]
    fn loading_twice_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", &full_year_csv(|m| format!("{},", m.number() * 10)));

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        let first = load_dataset(&config).unwrap();
        let second = load_dataset(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_year_aborts_the_whole_load() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A\nJan,40\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2017,
        };
        match load_dataset(&config) {
            Err(LoadError::MissingSource { year, .. }) => assert_eq!(year, 2017),
            other => panic!("expected MissingSource, got {other:?}"),
        }
    }

    #[test]
    fn bad_month_token_names_the_row_and_aborts() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A\nJan,40\nJann,50\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        match load_dataset(&config) {
            Err(LoadError::DateParse { year, row, value }) => {
                assert_eq!(year, 2016);
                assert_eq!(row, 1);
                assert_eq!(value, "Jann");
            }
            other => panic!("expected DateParse, got {other:?}"),
        }
    }

    #[test]
    fn missing_month_column_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Mon,A\nJan,40\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        match load_dataset(&config) {
            Err(LoadError::Parse { detail, .. }) => assert!(detail.contains("Month")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A\nJan,forty\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        match load_dataset(&config) {
            Err(LoadError::Parse { detail, .. }) => assert!(detail.contains("forty")),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn empty_cells_are_preserved_as_absent() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A,B\nJan,40,\nFeb,,55\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        let dataset = load_dataset(&config).unwrap();
        let aqis: Vec<Option<f64>> = dataset.observations.iter().map(|o| o.aqi).collect();
        assert_eq!(aqis, vec![Some(40.0), None, None, Some(55.0)]);
    }

    #[test]
    fn json_source_matches_csv_source() {
        let tmp = TempDir::new().unwrap();
        let csv_dir = tmp.path().join("csv");
        let json_dir = tmp.path().join("json");
        fs::create_dir_all(&csv_dir).unwrap();
        fs::create_dir_all(&json_dir).unwrap();

        write_source(&csv_dir, 2016, "csv", "Month,A,B\nJan,40,90\nFeb,120,\n");
        write_source(
            &json_dir,
            2016,
            "json",
            r#"[{"Month":"Jan","A":40.0,"B":90.0},{"Month":"Feb","A":120.0,"B":null}]"#,
        );

        let from_csv = load_dataset(&LoaderConfig {
            dir: csv_dir,
            years: 2016..=2016,
        })
        .unwrap();
        let from_json = load_dataset(&LoaderConfig {
            dir: json_dir,
            years: 2016..=2016,
        })
        .unwrap();

        assert_eq!(from_csv, from_json);
    }

    #[test]
    fn parquet_source_matches_csv_source() {
        use arrow::array::{Float64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let tmp = TempDir::new().unwrap();
        let csv_dir = tmp.path().join("csv");
        let pq_dir = tmp.path().join("pq");
        fs::create_dir_all(&csv_dir).unwrap();
        fs::create_dir_all(&pq_dir).unwrap();

        write_source(&csv_dir, 2016, "csv", "Month,A,B\nJan,40,90\nFeb,120,\n");

        let schema = Arc::new(Schema::new(vec![
            Field::new("Month", DataType::Utf8, false),
            Field::new("A", DataType::Float64, true),
            Field::new("B", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Jan", "Feb"])),
                Arc::new(Float64Array::from(vec![Some(40.0), Some(120.0)])),
                Arc::new(Float64Array::from(vec![Some(90.0), None])),
            ],
        )
        .unwrap();
        let file = fs::File::create(pq_dir.join(format!("{SOURCE_STEM}_2016.parquet"))).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let from_csv = load_dataset(&LoaderConfig {
            dir: csv_dir,
            years: 2016..=2016,
        })
        .unwrap();
        let from_parquet = load_dataset(&LoaderConfig {
            dir: pq_dir,
            years: 2016..=2016,
        })
        .unwrap();

        assert_eq!(from_csv, from_parquet);
    }

    #[test]
    fn csv_takes_precedence_over_other_extensions() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A\nJan,40\n");
        write_source(tmp.path(), 2016, "json", r#"[{"Month":"Jan","A":999.0}]"#);

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        let dataset = load_dataset(&config).unwrap();
        assert_eq!(dataset.observations[0].aqi, Some(40.0));
    }

    #[test]
    fn cache_serves_repeat_lookups_without_rereading() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), 2016, "csv", "Month,A\nJan,40\n");

        let config = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2016,
        };
        let mut cache = DatasetCache::default();
        let first = cache.get_or_load(&config).unwrap().clone();

        // Remove the source; a cache hit must not notice.
        fs::remove_file(tmp.path().join(format!("{SOURCE_STEM}_2016.csv"))).unwrap();
        let second = cache.get_or_load(&config).unwrap();
        assert_eq!(&first, second);

        // A different configuration misses and fails against the empty dir.
        let other = LoaderConfig {
            dir: tmp.path().to_path_buf(),
            years: 2016..=2017,
        };
        assert!(cache.get_or_load(&other).is_err());
    }
}
