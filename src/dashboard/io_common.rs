use std::path::Path;

use calamine::DataType;
use state_metrics::Cell;

/// The file name without its directories, used to label the report.
pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Converts a calamine cell. Blank strings count as empty cells.
pub fn to_cell(dt: &DataType) -> Cell {
    match dt {
        DataType::Empty => Cell::Empty,
        DataType::String(s) if s.trim().is_empty() => Cell::Empty,
        DataType::String(s) => Cell::String(s.clone()),
        DataType::Int(i) => Cell::Int(*i),
        DataType::Float(f) => Cell::Float(*f),
        x => Cell::Other(format!("{:?}", x)),
    }
}

pub fn to_cells(row: &[DataType]) -> Vec<Cell> {
    row.iter().map(to_cell).collect()
}
