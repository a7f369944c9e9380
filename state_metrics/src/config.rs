// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// A cell, as read from a spreadsheet.
///
/// The readers convert their own cell representation into this one before handing
/// the rows to [`crate::Table::from_cells`].
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    /// Any other content (booleans, dates, formula errors). Kept for error reporting.
    Other(String),
}

/// One geographic region (a U.S. state) with its raw counts.
#[derive(PartialEq, Debug, Clone)]
pub struct Region {
    pub region_id: String,
    pub population: f64,
    pub poverty_count: f64,
    pub millionaire_count: f64,
}

/// The ratio of a count over the population of a region.
///
/// A ratio is undefined when the population is zero. It is distinct from a ratio of 0.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Ratio {
    Defined(f64),
    Undefined,
}

impl Ratio {
    pub fn of(count: f64, population: f64) -> Ratio {
        if population == 0.0 {
            Ratio::Undefined
        } else {
            Ratio::Defined(count / population)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined(x) => Some(*x),
            Ratio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Ratio::Undefined)
    }
}

/// A region with its two derived metrics.
#[derive(PartialEq, Debug, Clone)]
pub struct DerivedRegion {
    pub region: Region,
    pub millionaire_density: Ratio,
    pub poverty_rate: Ratio,
}

/// A row of a table: anything that carries the raw counts of a region.
pub trait RegionRecord {
    fn region(&self) -> &Region;

    fn region_id(&self) -> &str {
        self.region().region_id.as_str()
    }
}

impl RegionRecord for Region {
    fn region(&self) -> &Region {
        self
    }
}

impl RegionRecord for DerivedRegion {
    fn region(&self) -> &Region {
        &self.region
    }
}

// ******** Errors *********

/// Errors that prevent a table from being loaded.
#[derive(PartialEq, Debug, Clone)]
pub enum TableError {
    /// The content cannot be read as a table.
    /// `lineno` is the 1-based line in the spreadsheet, when it is known.
    MalformedInput {
        lineno: Option<u64>,
        column: Option<String>,
        message: String,
    },
    /// Some of the configured columns are not in the header.
    MissingColumns { columns: Vec<String> },
}

impl Error for TableError {}

impl Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::MalformedInput {
                lineno: Some(l),
                column: Some(c),
                message,
            } => write!(f, "Malformed input at line {} column {:?}: {}", l, c, message),
            TableError::MalformedInput {
                lineno: Some(l),
                message,
                ..
            } => write!(f, "Malformed input at line {}: {}", l, message),
            TableError::MalformedInput { message, .. } => {
                write!(f, "Malformed input: {}", message)
            }
            TableError::MissingColumns { columns } => {
                write!(f, "Missing column(s) in the header: ")?;
                let quoted: Vec<String> = columns.iter().map(|c| format!("{:?}", c)).collect();
                write!(f, "{}", quoted.join(", "))
            }
        }
    }
}

// ********* Configuration **********

/// The names of the four columns to read in the header row of the input.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnMapping {
    pub region_column: String,
    pub population_column: String,
    pub poverty_column: String,
    pub millionaire_column: String,
}

impl ColumnMapping {
    pub const DEFAULT_REGION_COLUMN: &'static str = "State";
    // The misspelling is in the published dataset.
    pub const DEFAULT_POPULATION_COLUMN: &'static str = "State Popiulation";
    pub const DEFAULT_POVERTY_COLUMN: &'static str = "Number in Poverty";
    pub const DEFAULT_MILLIONAIRE_COLUMN: &'static str = "Number of Millionaires";

    /// The columns in the order they are reported when missing.
    pub fn required_columns(&self) -> [&str; 4] {
        [
            self.region_column.as_str(),
            self.population_column.as_str(),
            self.poverty_column.as_str(),
            self.millionaire_column.as_str(),
        ]
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            region_column: ColumnMapping::DEFAULT_REGION_COLUMN.to_string(),
            population_column: ColumnMapping::DEFAULT_POPULATION_COLUMN.to_string(),
            poverty_column: ColumnMapping::DEFAULT_POVERTY_COLUMN.to_string(),
            millionaire_column: ColumnMapping::DEFAULT_MILLIONAIRE_COLUMN.to_string(),
        }
    }
}

/// The numeric fields a table can be ranked by.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum MetricField {
    Population,
    PovertyCount,
    MillionaireCount,
    MillionaireDensity,
    PovertyRate,
}

impl MetricField {
    pub const ALL: [MetricField; 5] = [
        MetricField::Population,
        MetricField::PovertyCount,
        MetricField::MillionaireCount,
        MetricField::MillionaireDensity,
        MetricField::PovertyRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricField::Population => "population",
            MetricField::PovertyCount => "poverty_count",
            MetricField::MillionaireCount => "millionaire_count",
            MetricField::MillionaireDensity => "millionaire_density",
            MetricField::PovertyRate => "poverty_rate",
        }
    }

    /// The value of this field for a region. Raw counts are always defined.
    pub fn value_of(&self, dr: &DerivedRegion) -> Ratio {
        match self {
            MetricField::Population => Ratio::Defined(dr.region.population),
            MetricField::PovertyCount => Ratio::Defined(dr.region.poverty_count),
            MetricField::MillionaireCount => Ratio::Defined(dr.region.millionaire_count),
            MetricField::MillionaireDensity => dr.millionaire_density,
            MetricField::PovertyRate => dr.poverty_rate,
        }
    }
}

impl Display for MetricField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct UnknownMetricField(pub String);

impl Error for UnknownMetricField {}

impl Display for UnknownMetricField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown metric field {:?}", self.0)
    }
}

impl FromStr for MetricField {
    type Err = UnknownMetricField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricField::ALL
            .iter()
            .find(|f| f.name() == s.trim())
            .cloned()
            .ok_or_else(|| UnknownMetricField(s.to_string()))
    }
}
