use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints};
use egui_extras::{Column, TableBuilder};

use crate::color::{diverging_color, heat_color, ColorMap};
use crate::data::aggregate;
use crate::data::classify;
use crate::data::model::{AqiCategory, AqiDataset, Month};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// View – the fixed menu of chart pages
// ---------------------------------------------------------------------------

/// One page of the dashboard. The set is closed: every page is a pure
/// function of the canonical dataset plus the user's band selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    AnnualTrends,
    SeasonalPatterns,
    MonthToMonth,
    LocationComparison,
    PollutionHotspots,
    TimeSeries,
    CorrelationAnalysis,
    AqiDistribution,
    YearlyAverageTrend,
    CategoryAnalysis,
}

impl View {
    pub const ALL: [View; 11] = [
        View::Overview,
        View::AnnualTrends,
        View::SeasonalPatterns,
        View::MonthToMonth,
        View::LocationComparison,
        View::PollutionHotspots,
        View::TimeSeries,
        View::CorrelationAnalysis,
        View::AqiDistribution,
        View::YearlyAverageTrend,
        View::CategoryAnalysis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::AnnualTrends => "Annual Trends",
            View::SeasonalPatterns => "Seasonal Patterns",
            View::MonthToMonth => "Month-to-month Variations",
            View::LocationComparison => "Location Comparison",
            View::PollutionHotspots => "Pollution Hotspots",
            View::TimeSeries => "Time Series",
            View::CorrelationAnalysis => "Correlation Analysis",
            View::AqiDistribution => "AQI Distribution",
            View::YearlyAverageTrend => "Yearly Average Trend",
            View::CategoryAnalysis => "AQI Category Analysis",
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel dispatch
// ---------------------------------------------------------------------------

/// Render the selected page. Every page below borrows the dataset
/// read-only; only the category page mutates state (its band selection).
pub fn render(ui: &mut Ui, state: &mut AppState) {
    let view = state.selected_view;
    ui.heading(view.label());
    ui.add_space(4.0);

    if view == View::Overview {
        overview(ui);
        return;
    }

    if state.cache.cached().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Load a data folder to explore AQI  (File → Open Data Folder…)");
        });
        return;
    }

    if view == View::CategoryAnalysis {
        category_analysis(ui, state);
        return;
    }

    let Some(dataset) = state.cache.cached() else {
        return;
    };
    match view {
        View::AnnualTrends => annual_trends(ui, dataset),
        View::SeasonalPatterns => seasonal_patterns(ui, dataset, &state.year_colors),
        View::MonthToMonth => month_to_month(ui, dataset, &state.year_colors),
        View::LocationComparison => location_comparison(ui, dataset),
        View::PollutionHotspots => pollution_hotspots(ui, dataset),
        View::TimeSeries => time_series(ui, dataset, &state.location_colors),
        View::CorrelationAnalysis => correlation_analysis(ui, dataset),
        View::AqiDistribution => aqi_distribution(ui, dataset, &state.location_colors),
        View::YearlyAverageTrend => yearly_average_trend(ui, dataset),
        View::Overview | View::CategoryAnalysis => {}
    }
}

fn caption(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).italics().weak());
    ui.add_space(4.0);
}

// ---------------------------------------------------------------------------
// Static pages
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui) {
    ui.label(
        "Insights into air quality trends in Hyderabad from 2016 to 2023. \
         Use the navigation panel to move between the analysis pages; every \
         page is computed from the same loaded dataset.",
    );
}

// ---------------------------------------------------------------------------
// Distribution pages (box plots)
// ---------------------------------------------------------------------------

fn annual_trends(ui: &mut Ui, dataset: &AqiDataset) {
    caption(
        ui,
        "Distribution of AQI values for each year: median, quartiles and \
         extremes show how air quality changed over the years.",
    );

    let mut elems = Vec::new();
    for (year, values) in aggregate::values_by_year(dataset) {
        if let Some(stats) = aggregate::box_stats(&values) {
            elems.push(
                BoxElem::new(
                    year as f64,
                    BoxSpread::new(stats.min, stats.q1, stats.median, stats.q3, stats.max),
                )
                .name(year.to_string())
                .box_width(0.5),
            );
        }
    }

    Plot::new("annual_trends")
        .x_axis_label("Year")
        .y_axis_label("AQI")
        .x_axis_formatter(|mark, _range| integer_tick(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).name("AQI").color(Color32::LIGHT_BLUE));
        });
}

fn seasonal_patterns(ui: &mut Ui, dataset: &AqiDataset, year_colors: &ColorMap) {
    caption(
        ui,
        "AQI spread across months, one colour per year. Recurring shapes \
         indicate seasonal influences on air quality.",
    );

    let groups = aggregate::values_by_year_month(dataset);
    let n_years = groups.len().max(1);
    let slot = 0.8 / n_years as f64;

    let mut box_plots = Vec::new();
    for (yi, (year, per_month)) in groups.iter().enumerate() {
        let color = year_colors.color_for(&year.to_string());
        let mut elems = Vec::new();
        for (month, values) in per_month {
            if let Some(stats) = aggregate::box_stats(values) {
                let x = month.number() as f64
                    + (yi as f64 - (n_years as f64 - 1.0) / 2.0) * slot;
                elems.push(
                    BoxElem::new(
                        x,
                        BoxSpread::new(stats.min, stats.q1, stats.median, stats.q3, stats.max),
                    )
                    .name(format!("{month} {year}"))
                    .box_width(slot * 0.9)
                    .fill(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.0, color)),
                );
            }
        }
        box_plots.push(BoxPlot::new(elems).name(year.to_string()).color(color));
    }

    Plot::new("seasonal_patterns")
        .legend(Legend::default())
        .x_axis_label("Month")
        .y_axis_label("AQI")
        .x_axis_formatter(|mark, _range| month_tick(mark.value))
        .show(ui, |plot_ui| {
            for box_plot in box_plots {
                plot_ui.box_plot(box_plot);
            }
        });
}

fn location_comparison(ui: &mut Ui, dataset: &AqiDataset) {
    caption(
        ui,
        "AQI distribution per monitoring location. Compare medians and \
         spread to spot consistently better or worse areas.",
    );

    let mut elems = Vec::new();
    for (idx, (location, values)) in aggregate::values_by_location(dataset).into_iter().enumerate()
    {
        if let Some(stats) = aggregate::box_stats(&values) {
            elems.push(
                BoxElem::new(
                    idx as f64,
                    BoxSpread::new(stats.min, stats.q1, stats.median, stats.q3, stats.max),
                )
                .name(location)
                .box_width(0.5),
            );
        }
    }

    let labels = dataset.locations.clone();
    Plot::new("location_comparison")
        .y_axis_label("AQI")
        .x_axis_formatter(move |mark, _range| label_tick(mark.value, &labels))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(elems).name("AQI").color(Color32::LIGHT_BLUE));
        });
}

// ---------------------------------------------------------------------------
// Line pages
// ---------------------------------------------------------------------------

fn month_to_month(ui: &mut Ui, dataset: &AqiDataset, year_colors: &ColorMap) {
    caption(
        ui,
        "Monthly mean AQI over time, one line per year. Peaks mark periods \
         of elevated pollution.",
    );

    let series = aggregate::monthly_mean_by_year(dataset);
    Plot::new("month_to_month")
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("AQI")
        .x_axis_formatter(|mark, _range| date_tick(mark.value))
        .show(ui, |plot_ui| {
            for (year, points) in series {
                let plot_points: PlotPoints = points
                    .iter()
                    .map(|(date, avg)| [date_to_x(*date), *avg])
                    .collect();
                plot_ui.line(
                    Line::new(plot_points)
                        .name(year.to_string())
                        .color(year_colors.color_for(&year.to_string()))
                        .width(1.5),
                );
            }
        });
}

fn time_series(ui: &mut Ui, dataset: &AqiDataset, location_colors: &ColorMap) {
    caption(
        ui,
        "AQI readings for each location over the full period. Use the \
         legend to isolate individual locations.",
    );

    let series = aggregate::location_series(dataset);
    Plot::new("time_series")
        .legend(Legend::default())
        .x_axis_label("Date")
        .y_axis_label("AQI")
        .x_axis_formatter(|mark, _range| date_tick(mark.value))
        .show(ui, |plot_ui| {
            for (location, points) in series {
                let plot_points: PlotPoints = points
                    .iter()
                    .map(|(date, value)| [date_to_x(*date), *value])
                    .collect();
                plot_ui.line(
                    Line::new(plot_points)
                        .name(&location)
                        .color(location_colors.color_for(&location))
                        .width(1.5),
                );
            }
        });
}

fn yearly_average_trend(ui: &mut Ui, dataset: &AqiDataset) {
    caption(
        ui,
        "Mean AQI per year: the long-term direction of air quality.",
    );

    let means = aggregate::yearly_mean(dataset);
    let plot_points: PlotPoints = means
        .iter()
        .map(|(year, avg)| [*year as f64, *avg])
        .collect();

    Plot::new("yearly_average_trend")
        .x_axis_label("Year")
        .y_axis_label("AQI")
        .x_axis_formatter(|mark, _range| integer_tick(mark.value))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(plot_points)
                    .name("Yearly mean")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Heatmap pages
// ---------------------------------------------------------------------------

fn pollution_hotspots(ui: &mut Ui, dataset: &AqiDataset) {
    caption(
        ui,
        "Mean AQI per location and year. Darker red cells are pollution \
         hotspots; blank cells had no readings.",
    );

    let pivot = aggregate::mean_by_location_year(dataset);
    let Some((lo, hi)) = pivot.value_range() else {
        ui.label("No readings to aggregate.");
        return;
    };
    let span = (hi - lo).max(f64::EPSILON);

    let mut cells = Vec::new();
    for (li, row) in pivot.values.iter().enumerate() {
        for (yi, cell) in row.iter().enumerate() {
            if let Some(value) = cell {
                cells.push(
                    Bar::new(yi as f64, 1.0)
                        .base_offset(li as f64 - 0.5)
                        .width(0.96)
                        .name(format!("{} {}: {:.0}", pivot.locations[li], pivot.years[yi], value))
                        .fill(heat_color((value - lo) / span)),
                );
            }
        }
    }

    let year_labels: Vec<String> = pivot.years.iter().map(|y| y.to_string()).collect();
    let location_labels = pivot.locations.clone();
    Plot::new("pollution_hotspots")
        .x_axis_label("Year")
        .y_axis_label("Location")
        .x_axis_formatter(move |mark, _range| label_tick(mark.value, &year_labels))
        .y_axis_formatter(move |mark, _range| label_tick(mark.value, &location_labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(cells));
        });
}

fn correlation_analysis(ui: &mut Ui, dataset: &AqiDataset) {
    caption(
        ui,
        "Pairwise correlation of AQI between locations. Red cells move \
         together; green cells move inversely.",
    );

    let matrix = aggregate::correlation_matrix(dataset);
    let mut cells = Vec::new();
    for (i, row) in matrix.values.iter().enumerate() {
        for (j, cell) in row.iter().enumerate() {
            if let Some(r) = cell {
                cells.push(
                    Bar::new(j as f64, 1.0)
                        .base_offset(i as f64 - 0.5)
                        .width(0.96)
                        .name(format!(
                            "{} × {}: {:.2}",
                            matrix.locations[i], matrix.locations[j], r
                        ))
                        .fill(diverging_color(*r)),
                );
            }
        }
    }

    let x_labels = matrix.locations.clone();
    let y_labels = matrix.locations.clone();
    Plot::new("correlation_analysis")
        .x_axis_formatter(move |mark, _range| label_tick(mark.value, &x_labels))
        .y_axis_formatter(move |mark, _range| label_tick(mark.value, &y_labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(cells));
        });
}

// ---------------------------------------------------------------------------
// Histogram page
// ---------------------------------------------------------------------------

const HISTOGRAM_BIN_WIDTH: f64 = 25.0;

fn aqi_distribution(ui: &mut Ui, dataset: &AqiDataset, location_colors: &ColorMap) {
    caption(
        ui,
        "Frequency of AQI readings in fixed-width bins, stacked per \
         location.",
    );

    let hist = aggregate::histogram_by_location(dataset, HISTOGRAM_BIN_WIDTH);
    let mut charts: Vec<BarChart> = Vec::new();
    for (location, bins) in &hist.counts {
        let bars: Vec<Bar> = bins
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                Bar::new(hist.bin_center(i), count as f64).width(hist.bin_width)
            })
            .collect();
        let mut chart = BarChart::new(bars)
            .name(location)
            .color(location_colors.color_for(location));
        {
            let below: Vec<&BarChart> = charts.iter().collect();
            chart = chart.stack_on(&below);
        }
        charts.push(chart);
    }

    Plot::new("aqi_distribution")
        .legend(Legend::default())
        .x_axis_label("AQI")
        .y_axis_label("Count")
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Category analysis page
// ---------------------------------------------------------------------------

fn category_analysis(ui: &mut Ui, state: &mut AppState) {
    caption(
        ui,
        "Pick a severity band to list when and where it was observed, and \
         how often per location and year.",
    );

    // Band picker; selections resolve by label so unknown names surface
    // the valid enumeration instead of silently defaulting.
    let mut chosen: Option<&'static str> = None;
    egui::ComboBox::from_id_salt("aqi_category")
        .selected_text(state.selected_category.label())
        .show_ui(ui, |ui: &mut Ui| {
            for category in AqiCategory::ALL {
                if ui
                    .selectable_label(state.selected_category == category, category.label())
                    .clicked()
                {
                    chosen = Some(category.label());
                }
            }
        });
    if let Some(label) = chosen {
        state.select_category_label(label);
    }
    ui.add_space(4.0);

    let Some(dataset) = state.cache.cached() else {
        return;
    };
    let category = state.selected_category;
    let filtered = classify::filter_by_category(dataset, category);
    let counts = classify::category_counts(dataset, &filtered);

    ui.label(format!(
        "{} observations in band {} ({})",
        filtered.len(),
        category.label(),
        bounds_text(category)
    ));
    ui.add_space(4.0);

    filtered_table(ui, dataset, &filtered);
    ui.add_space(8.0);
    counts_chart(ui, &counts, &state.year_colors);
}

fn bounds_text(category: AqiCategory) -> String {
    match category.bounds() {
        (lower, Some(upper)) => format!("{lower:.0}–{upper:.0}"),
        (lower, None) => format!("{lower:.0}+"),
    }
}

fn filtered_table(ui: &mut Ui, dataset: &AqiDataset, filtered: &[usize]) {
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(120.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::remainder())
        .max_scroll_height(220.0)
        .header(20.0, |mut header| {
            for title in ["Location", "Month", "Year", "AQI", "Date"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, filtered.len(), |mut row| {
                let obs = &dataset.observations[filtered[row.index()]];
                row.col(|ui| {
                    ui.label(&obs.location);
                });
                row.col(|ui| {
                    ui.label(obs.month.abbrev());
                });
                row.col(|ui| {
                    ui.label(obs.year.to_string());
                });
                row.col(|ui| {
                    ui.label(
                        obs.aqi
                            .map(|v| format!("{v:.0}"))
                            .unwrap_or_else(|| "–".to_string()),
                    );
                });
                row.col(|ui| {
                    ui.label(obs.date.format("%Y-%m-%d").to_string());
                });
            });
        });
}

fn counts_chart(ui: &mut Ui, counts: &classify::CategoryCounts, year_colors: &ColorMap) {
    let n_years = counts.years.len().max(1);
    let slot = 0.8 / n_years as f64;

    let mut charts = Vec::new();
    for (yi, year) in counts.years.iter().enumerate() {
        let bars: Vec<Bar> = counts
            .locations
            .iter()
            .enumerate()
            .map(|(li, _)| {
                let x = li as f64 + (yi as f64 - (n_years as f64 - 1.0) / 2.0) * slot;
                Bar::new(x, counts.get(li, yi) as f64).width(slot * 0.9)
            })
            .collect();
        charts.push(
            BarChart::new(bars)
                .name(year.to_string())
                .color(year_colors.color_for(&year.to_string())),
        );
    }

    let labels = counts.locations.clone();
    Plot::new("category_counts")
        .legend(Legend::default())
        .y_axis_label("Occurrences")
        .x_axis_formatter(move |mark, _range| label_tick(mark.value, &labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn date_tick(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

/// Tick label for integer positions, blank elsewhere.
fn integer_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-6 {
        format!("{}", value.round() as i64)
    } else {
        String::new()
    }
}

/// Tick label naming a category axis: index `i` maps to `labels[i]`.
fn label_tick(value: f64, labels: &[String]) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels
        .get(rounded as usize)
        .cloned()
        .unwrap_or_default()
}

fn month_tick(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 {
        return String::new();
    }
    Month::ALL
        .get((rounded as usize).wrapping_sub(1))
        .map(|m| m.abbrev().to_string())
        .unwrap_or_default()
}
