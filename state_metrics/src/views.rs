//! The data behind each chart of the dashboard.
//!
//! Nothing here draws anything: each view holds the values, labels and order a
//! plotting library needs.

use log::debug;
use std::collections::{BTreeSet, HashSet};

use crate::{rank_by, select, DerivedRegion, MetricField, Ratio, RegionRecord, Table};

/// How many regions are picked when no selection is given.
pub const DEFAULT_SELECTION_SIZE: usize = 5;

/// A named list of values, one per category.
#[derive(PartialEq, Debug, Clone)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Side-by-side bars of the poverty and millionaire counts of some regions.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupedBars {
    pub title: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct MapEntry {
    pub region_id: String,
    pub population: f64,
    pub millionaire_count: f64,
    pub millionaire_density: Ratio,
}

/// A map of the states colored by millionaire density.
///
/// Regions with an undefined density are still listed so that their raw counts can
/// be displayed, but they do not contribute to the color range.
#[derive(PartialEq, Debug, Clone)]
pub struct DensityMap {
    pub title: String,
    pub location_mode: String,
    pub colorbar_title: String,
    /// Smallest and largest defined densities, if any.
    pub color_range: Option<(f64, f64)>,
    pub entries: Vec<MapEntry>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RankedBar {
    pub region_id: String,
    pub percent: f64,
}

/// Horizontal bars of poverty rates, highest first (drawn top to bottom).
#[derive(PartialEq, Debug, Clone)]
pub struct RankedBars {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<RankedBar>,
    /// Regions that have no poverty rate, in table order.
    pub undefined: Vec<String>,
}

/// Everything the dashboard shows for one table and one selection.
#[derive(PartialEq, Debug, Clone)]
pub struct Dashboard {
    pub region_options: Vec<String>,
    pub selection: Vec<String>,
    /// `None` when no region of the selection is in the table.
    pub comparison: Option<GroupedBars>,
    pub density_map: DensityMap,
    pub poverty_ranking: RankedBars,
}

/// The region codes to choose from: sorted and without duplicates.
pub fn region_options<R: RegionRecord>(table: &Table<R>) -> Vec<String> {
    let options: BTreeSet<&str> = table.iter().map(|r| r.region_id()).collect();
    options.into_iter().map(|s| s.to_string()).collect()
}

/// The first `size` options, or all of them if there are fewer.
pub fn default_selection(options: &[String], size: usize) -> Vec<String> {
    options.iter().take(size).cloned().collect()
}

/// Builds the grouped bar chart for rows that were already selected.
///
/// Returns `None` for an empty table: there is nothing to draw.
pub fn grouped_bars<R: RegionRecord>(selected: &Table<R>) -> Option<GroupedBars> {
    if selected.is_empty() {
        debug!("grouped_bars: the selection is empty, skipping the comparison chart");
        return None;
    }
    let regions: Vec<_> = selected.iter().map(|r| r.region()).collect();
    Some(GroupedBars {
        title: "Poverty vs Millionaire Population by State".to_string(),
        y_label: "Number of People".to_string(),
        categories: regions.iter().map(|r| r.region_id.clone()).collect(),
        series: vec![
            Series {
                label: "Number in Poverty".to_string(),
                values: regions.iter().map(|r| r.poverty_count).collect(),
            },
            Series {
                label: "Number of Millionaires".to_string(),
                values: regions.iter().map(|r| r.millionaire_count).collect(),
            },
        ],
    })
}

pub fn density_map(table: &Table<DerivedRegion>) -> DensityMap {
    let entries: Vec<MapEntry> = table
        .iter()
        .map(|dr| MapEntry {
            region_id: dr.region.region_id.clone(),
            population: dr.region.population,
            millionaire_count: dr.region.millionaire_count,
            millionaire_density: dr.millionaire_density,
        })
        .collect();

    let color_range = entries
        .iter()
        .filter_map(|e| e.millionaire_density.value())
        .fold(None, |acc: Option<(f64, f64)>, x| match acc {
            None => Some((x, x)),
            Some((lo, hi)) => Some((lo.min(x), hi.max(x))),
        });
    debug!("density_map: color range: {:?}", color_range);

    DensityMap {
        title: "Millionaire Density by U.S. State".to_string(),
        location_mode: "USA-states".to_string(),
        colorbar_title: "Millionaires / Population".to_string(),
        color_range,
        entries,
    }
}

pub fn poverty_ranking(table: &Table<DerivedRegion>) -> RankedBars {
    let mut bars: Vec<RankedBar> = Vec::new();
    let mut undefined: Vec<String> = Vec::new();
    for dr in rank_by(table, MetricField::PovertyRate, true) {
        match dr.poverty_rate {
            Ratio::Defined(rate) => bars.push(RankedBar {
                region_id: dr.region.region_id.clone(),
                percent: rate * 100.0,
            }),
            Ratio::Undefined => undefined.push(dr.region.region_id.clone()),
        }
    }
    if !undefined.is_empty() {
        debug!(
            "poverty_ranking: leaving out regions without a poverty rate: {:?}",
            undefined
        );
    }
    RankedBars {
        title: "Poverty Rate by State (Highest to Lowest)".to_string(),
        x_label: "Poverty Rate (%)".to_string(),
        y_label: "State".to_string(),
        bars,
        undefined,
    }
}

/// Builds all the views.
///
/// Arguments:
/// * `table` the derived table
/// * `selection` the regions to compare. If not provided, the first
/// `default_size` region options are used.
pub fn build_dashboard(
    table: &Table<DerivedRegion>,
    selection: Option<&[String]>,
    default_size: usize,
) -> Dashboard {
    let options = region_options(table);
    let selection: Vec<String> = match selection {
        Some(s) => s.to_vec(),
        None => default_selection(&options, default_size),
    };
    debug!("build_dashboard: selection: {:?}", selection);

    let selected_ids: HashSet<String> = selection.iter().cloned().collect();
    let comparison = grouped_bars(&select(table, &selected_ids));

    Dashboard {
        region_options: options,
        selection,
        comparison,
        density_map: density_map(table),
        poverty_ranking: poverty_ranking(table),
    }
}
