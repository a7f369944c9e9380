use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use state_metrics::views::*;
use state_metrics::*;

use std::fs;
use std::path::Path;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;

pub mod config_reader;
mod io_common;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path} as an Excel workbook: {source}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} does not contain any worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Could not find the worksheet {worksheet_name:?} in {path}"))]
    MissingWorksheet {
        path: String,
        worksheet_name: String,
    },
    #[snafu(display("The worksheet in {path} is empty: a header row is required"))]
    MissingHeader { path: String },
    #[snafu(display("Cannot read {path}: {source}"))]
    ReadingTable { source: TableError, path: String },
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a positive integer for {field}, found {value}"))]
    ParsingJsonNumber { field: String, value: String },
    #[snafu(display("Error writing file {path}: {source}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No input file: use --input or set inputFile in the configuration"))]
    MissingInput {},
    #[snafu(display("Cannot rank the states: {source}"))]
    UnknownRankField { source: UnknownMetricField },
    #[snafu(display("Difference detected between the computed report and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

type DResult<T> = Result<T, DashboardError>;

/// Everything needed to run the dashboard, after merging the configuration file and the
/// command line.
#[derive(PartialEq, Debug, Clone)]
pub struct LoadSettings {
    pub input_path: String,
    pub worksheet_name: Option<String>,
    pub columns: ColumnMapping,
    pub selection: Option<Vec<String>>,
    pub default_selection_size: usize,
    pub rank_field: MetricField,
    pub descending: bool,
}

fn ratio_to_json(r: Ratio) -> JSValue {
    match r {
        Ratio::Defined(x) => json!(x),
        Ratio::Undefined => JSValue::Null,
    }
}

fn grouped_bars_to_json(gb: &GroupedBars) -> JSValue {
    let series: Vec<JSValue> = gb
        .series
        .iter()
        .map(|s| json!({"label": s.label, "values": s.values}))
        .collect();
    json!({
        "title": gb.title,
        "yLabel": gb.y_label,
        "categories": gb.categories,
        "series": series,
    })
}

fn density_map_to_json(dm: &DensityMap) -> JSValue {
    let entries: Vec<JSValue> = dm
        .entries
        .iter()
        .map(|e| {
            json!({
                "region": e.region_id,
                "population": e.population,
                "millionaires": e.millionaire_count,
                "density": ratio_to_json(e.millionaire_density),
            })
        })
        .collect();
    let (min, max) = match dm.color_range {
        Some((lo, hi)) => (json!(lo), json!(hi)),
        None => (JSValue::Null, JSValue::Null),
    };
    json!({
        "title": dm.title,
        "locationMode": dm.location_mode,
        "colorbarTitle": dm.colorbar_title,
        "min": min,
        "max": max,
        "entries": entries,
    })
}

fn ranked_bars_to_json(rb: &RankedBars) -> JSValue {
    let bars: Vec<JSValue> = rb
        .bars
        .iter()
        .map(|b| json!({"region": b.region_id, "percent": b.percent}))
        .collect();
    json!({
        "title": rb.title,
        "xLabel": rb.x_label,
        "yLabel": rb.y_label,
        "bars": bars,
        "undefined": rb.undefined,
    })
}

fn ranking_to_json(ranked: &[&DerivedRegion], field: MetricField, descending: bool) -> JSValue {
    let order: Vec<JSValue> = ranked
        .iter()
        .map(|dr| {
            json!({
                "region": dr.region_id(),
                "value": ratio_to_json(field.value_of(dr)),
            })
        })
        .collect();
    json!({
        "field": field.name(),
        "descending": descending,
        "order": order,
    })
}

/// Runs the whole pipeline on a loaded table and assembles the JSON report.
pub fn build_report(source: &str, table: &Table<Region>, settings: &LoadSettings) -> JSValue {
    let derived = derive(table);
    let dashboard = build_dashboard(
        &derived,
        settings.selection.as_deref(),
        settings.default_selection_size,
    );
    if dashboard.comparison.is_none() {
        warn!(
            "None of the selected states {:?} is in {}",
            dashboard.selection, source
        );
    }
    let ranked = rank_by(&derived, settings.rank_field, settings.descending);

    json!({
        "source": source,
        "regionCount": derived.len(),
        "regionOptions": dashboard.region_options,
        "selection": dashboard.selection,
        "comparison": dashboard.comparison.as_ref().map(grouped_bars_to_json),
        "densityMap": density_map_to_json(&dashboard.density_map),
        "povertyRanking": ranked_bars_to_json(&dashboard.poverty_ranking),
        "ranking": ranking_to_json(&ranked, settings.rank_field, settings.descending),
    })
}

fn split_selection(xs: &[String]) -> Vec<String> {
    xs.iter()
        .flat_map(|x| x.split(','))
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Merges the command line on top of the configuration file.
///
/// `config_dir` is the directory of the configuration file, against which a relative
/// `inputFile` is resolved.
pub fn merge_settings(
    args: &Args,
    config: &DashboardConfig,
    config_dir: Option<&Path>,
) -> DResult<LoadSettings> {
    let input_path: String = match (&args.input, &config.input_file) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => match config_dir {
            Some(dir) => dir.join(p).display().to_string(),
            None => p.clone(),
        },
        (None, None) => return MissingInputSnafu {}.fail(),
    };

    let cc = config.columns.clone().unwrap_or_default();
    let defaults = ColumnMapping::default();
    let pick = |arg: &Option<String>, conf: Option<String>, default: String| -> String {
        arg.clone().or(conf).unwrap_or(default)
    };
    let columns = ColumnMapping {
        region_column: pick(&args.region_column, cc.region_column, defaults.region_column),
        population_column: pick(
            &args.population_column,
            cc.population_column,
            defaults.population_column,
        ),
        poverty_column: pick(&args.poverty_column, cc.poverty_column, defaults.poverty_column),
        millionaire_column: pick(
            &args.millionaire_column,
            cc.millionaire_column,
            defaults.millionaire_column,
        ),
    };

    let selection: Option<Vec<String>> = args
        .select
        .as_deref()
        .or(config.selection.as_deref())
        .map(split_selection);

    let default_selection_size = config
        .default_selection_size()?
        .unwrap_or(DEFAULT_SELECTION_SIZE);
    if default_selection_size == 0 {
        whatever!("defaultSelectionSize must be at least 1");
    }

    let rank_field: MetricField = match &args.rank_field {
        Some(s) => s.parse::<MetricField>().context(UnknownRankFieldSnafu {})?,
        None => MetricField::PovertyRate,
    };

    Ok(LoadSettings {
        input_path,
        worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.worksheet_name.clone()),
        columns,
        selection,
        default_selection_size,
        rank_field,
        descending: !args.ascending,
    })
}

fn resolve_settings(args: &Args) -> DResult<LoadSettings> {
    match &args.config {
        Some(config_path) => {
            let config = read_config(config_path)?;
            info!("config: {:?}", config);
            merge_settings(args, &config, Path::new(config_path).parent())
        }
        None => merge_settings(args, &DashboardConfig::default(), None),
    }
}

fn write_output(out: Option<&str>, contents: &str) -> DResult<()> {
    match out {
        None | Some("stdout") | Some("") => {
            println!("{}", contents);
        }
        Some(path) => {
            info!("Writing report to {:?}", path);
            fs::write(path, contents).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

/// Compares a report with a reference report. The differences, if any, are printed.
pub fn check_reference(reference_path: &str, report: &JSValue) -> DResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    let pretty_report = serde_json::to_string_pretty(report).context(ParsingJsonSnafu {})?;
    if pretty_reference != pretty_report {
        warn!("Found differences with the reference report");
        print_diff(pretty_reference.as_str(), pretty_report.as_str(), "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("The report matches the reference {}", reference_path);
    Ok(())
}

pub fn run_dashboard(args: &Args) -> DResult<()> {
    let settings = resolve_settings(args)?;
    debug!("run_dashboard: settings: {:?}", settings);

    info!("Attempting to read {:?}", settings.input_path);
    let table = io_excel::read_excel_file(&settings.input_path, &settings)?;

    let source = io_common::simplify_file_name(&settings.input_path);
    let report = build_report(&source, &table, &settings);

    let pretty_report = serde_json::to_string_pretty(&report).context(ParsingJsonSnafu {})?;
    write_output(args.out.as_deref(), &pretty_report)?;

    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &report)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use state_metrics::builder::TableBuilder;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario() -> Table<Region> {
        let mut builder = TableBuilder::new();
        builder.add_region("MD", 100.0, 10.0, 2.0).unwrap();
        builder.add_region("VA", 200.0, 20.0, 1.0).unwrap();
        builder.add_region("CA", 0.0, 0.0, 0.0).unwrap();
        builder.build()
    }

    fn settings() -> LoadSettings {
        let args = Args {
            input: Some("poverty.xlsx".to_string()),
            ..Args::default()
        };
        merge_settings(&args, &DashboardConfig::default(), None).unwrap()
    }

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("povdash-{}-{}", std::process::id(), name))
            .display()
            .to_string()
    }

    #[test]
    fn default_settings() {
        init();
        let s = settings();
        assert_eq!(s.input_path, "poverty.xlsx");
        assert_eq!(s.columns, ColumnMapping::default());
        assert_eq!(s.selection, None);
        assert_eq!(s.default_selection_size, DEFAULT_SELECTION_SIZE);
        assert_eq!(s.rank_field, MetricField::PovertyRate);
        assert!(s.descending);
        assert_eq!(s.worksheet_name, None);
    }

    #[test]
    fn missing_input() {
        init();
        let res = merge_settings(&Args::default(), &DashboardConfig::default(), None);
        assert!(matches!(res, Err(DashboardError::MissingInput {})));
    }

    #[test]
    fn command_line_overrides_config() {
        init();
        let config = parse_config(
            r#"{
                "inputFile": "data/poverty.xlsx",
                "worksheetName": "Sheet1",
                "columns": {"regionColumn": "Code", "povertyColumn": "Poor"},
                "selection": ["NY"],
                "defaultSelectionSize": "3"
            }"#,
        )
        .unwrap();
        let args = Args {
            poverty_column: Some("In Poverty".to_string()),
            select: Some(vec!["MD,VA".to_string(), " CA ".to_string()]),
            rank_field: Some("millionaire_density".to_string()),
            ascending: true,
            ..Args::default()
        };
        let s = merge_settings(&args, &config, Some(Path::new("/srv/dash"))).unwrap();
        assert_eq!(
            s.input_path,
            Path::new("/srv/dash")
                .join("data/poverty.xlsx")
                .display()
                .to_string()
        );
        assert_eq!(s.worksheet_name, Some("Sheet1".to_string()));
        assert_eq!(s.columns.region_column, "Code");
        assert_eq!(s.columns.poverty_column, "In Poverty");
        assert_eq!(s.columns.population_column, "State Popiulation");
        assert_eq!(
            s.selection,
            Some(vec!["MD".to_string(), "VA".to_string(), "CA".to_string()])
        );
        assert_eq!(s.default_selection_size, 3);
        assert_eq!(s.rank_field, MetricField::MillionaireDensity);
        assert!(!s.descending);
    }

    #[test]
    fn config_selection_used_without_flag() {
        init();
        let config = parse_config(r#"{"inputFile": "p.xlsx", "selection": ["NY", "TX"]}"#).unwrap();
        let s = merge_settings(&Args::default(), &config, None).unwrap();
        assert_eq!(s.input_path, "p.xlsx");
        assert_eq!(s.selection, Some(vec!["NY".to_string(), "TX".to_string()]));
    }

    #[test]
    fn bad_rank_field() {
        init();
        let args = Args {
            input: Some("p.xlsx".to_string()),
            rank_field: Some("wealth".to_string()),
            ..Args::default()
        };
        let res = merge_settings(&args, &DashboardConfig::default(), None);
        assert!(matches!(res, Err(DashboardError::UnknownRankField { .. })));
    }

    #[test]
    fn zero_selection_size() {
        init();
        let config = parse_config(r#"{"inputFile": "p.xlsx", "defaultSelectionSize": 0}"#).unwrap();
        let res = merge_settings(&Args::default(), &config, None);
        assert!(matches!(res, Err(DashboardError::Whatever { .. })));
    }

    #[test]
    fn report_scenario() {
        init();
        let report = build_report("poverty.xlsx", &scenario(), &settings());
        assert_eq!(report["source"], json!("poverty.xlsx"));
        assert_eq!(report["regionCount"], json!(3));
        assert_eq!(report["regionOptions"], json!(["CA", "MD", "VA"]));
        assert_eq!(report["selection"], json!(["CA", "MD", "VA"]));
        assert_eq!(report["comparison"]["categories"], json!(["MD", "VA", "CA"]));
        assert_eq!(
            report["comparison"]["series"][1]["label"],
            json!("Number of Millionaires")
        );

        let entries = report["densityMap"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["density"], json!(0.02));
        assert_eq!(entries[2]["density"], JSValue::Null);
        assert_eq!(entries[2]["population"], json!(0.0));
        assert_eq!(report["densityMap"]["locationMode"], json!("USA-states"));

        let bars = report["povertyRanking"]["bars"].as_array().unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0]["region"], json!("MD"));
        assert_eq!(bars[1]["region"], json!("VA"));
        assert_eq!(report["povertyRanking"]["undefined"], json!(["CA"]));

        let order = report["ranking"]["order"].as_array().unwrap();
        let names: Vec<&str> = order.iter().filter_map(|o| o["region"].as_str()).collect();
        assert_eq!(names, vec!["MD", "VA", "CA"]);
        assert_eq!(order[2]["value"], JSValue::Null);
        assert_eq!(report["ranking"]["field"], json!("poverty_rate"));
    }

    #[test]
    fn report_empty_selection() {
        init();
        let mut s = settings();
        s.selection = Some(vec!["TX".to_string()]);
        let report = build_report("poverty.xlsx", &scenario(), &s);
        assert_eq!(report["comparison"], JSValue::Null);
        assert_eq!(report["selection"], json!(["TX"]));
        assert_eq!(report["regionCount"], json!(3));
    }

    #[test]
    fn reference_comparison() {
        init();
        let report = build_report("poverty.xlsx", &scenario(), &settings());
        let path = temp_path("reference.json");
        fs::write(&path, serde_json::to_string(&report).unwrap()).unwrap();
        assert!(check_reference(&path, &report).is_ok());

        let mut other = settings();
        other.selection = Some(vec!["MD".to_string()]);
        let other_report = build_report("poverty.xlsx", &scenario(), &other);
        let res = check_reference(&path, &other_report);
        assert!(matches!(res, Err(DashboardError::ReferenceMismatch { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_reference_file() {
        init();
        let report = json!({});
        let res = check_reference(&temp_path("does-not-exist.json"), &report);
        assert!(matches!(res, Err(DashboardError::OpeningJson { .. })));
    }

    #[test]
    fn write_report_to_file() {
        init();
        let path = temp_path("out.json");
        write_output(Some(path.as_str()), "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn run_on_missing_file() {
        init();
        let args = Args {
            input: Some(temp_path("missing.xlsx")),
            ..Args::default()
        };
        let res = run_dashboard(&args);
        assert!(matches!(res, Err(DashboardError::OpeningFile { .. })));
    }

    #[test]
    #[ignore = "requires the poverty dataset, set POVDASH_TEST_DATA"]
    fn full_dataset() {
        init();
        let path = option_env!("POVDASH_TEST_DATA").unwrap_or("poverty_millionaires.xlsx");
        let args = Args {
            input: Some(path.to_string()),
            out: Some(temp_path("full.json")),
            ..Args::default()
        };
        run_dashboard(&args).unwrap();
    }
}
