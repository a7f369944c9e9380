mod config;
pub mod builder;
pub mod manual;
pub mod views;

use log::{debug, info, warn};

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

pub use crate::config::*;

/// An ordered table of regions, in the order of the input.
///
/// A table is never modified after it is built: deriving, selecting and ranking
/// all produce new values.
#[derive(PartialEq, Debug, Clone)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(rows: Vec<R>) -> Table<R> {
        Table { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl Table<Region> {
    /// Builds a table out of the header row and the data rows of a sheet.
    ///
    /// Arguments:
    /// * `header` the first row of the sheet
    /// * `rows` all the following rows, in order
    /// * `mapping` the names of the columns to read
    ///
    /// Line numbers in errors count the header as line 1.
    pub fn from_cells<I>(
        header: &[Cell],
        rows: I,
        mapping: &ColumnMapping,
    ) -> Result<Table<Region>, TableError>
    where
        I: IntoIterator<Item = Vec<Cell>>,
    {
        let cols = resolve_columns(header, mapping)?;
        debug!("from_cells: column indexes: {:?}", cols);

        let mut res: Vec<Region> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let empty = Cell::Empty;
        for (idx, row) in rows.into_iter().enumerate() {
            let lineno = (idx + 2) as u64;
            if row.iter().all(|c| *c == Cell::Empty) {
                debug!("from_cells: line {}: skipping blank row", lineno);
                continue;
            }
            let cell_at = |col_idx: usize| row.get(col_idx).unwrap_or(&empty);

            let region_id = read_region_id(cell_at(cols.region))
                .map_err(|message| malformed(lineno, &mapping.region_column, message))?;
            let population = read_count(cell_at(cols.population))
                .map_err(|message| malformed(lineno, &mapping.population_column, message))?;
            let poverty_count = read_count(cell_at(cols.poverty))
                .map_err(|message| malformed(lineno, &mapping.poverty_column, message))?;
            let millionaire_count = read_count(cell_at(cols.millionaire))
                .map_err(|message| malformed(lineno, &mapping.millionaire_column, message))?;

            if !seen.insert(region_id.clone()) {
                warn!(
                    "from_cells: line {}: region {:?} appears more than once",
                    lineno, region_id
                );
            }

            let region = Region {
                region_id,
                population,
                poverty_count,
                millionaire_count,
            };
            debug!("from_cells: line {}: {:?}", lineno, region);
            res.push(region);
        }
        info!("Loaded {} regions", res.len());
        Ok(Table::new(res))
    }
}

impl Table<DerivedRegion> {
    /// The raw table this one was derived from.
    pub fn base(&self) -> Table<Region> {
        Table::new(self.rows.iter().map(|dr| dr.region.clone()).collect())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
struct ColumnIndexes {
    region: usize,
    population: usize,
    poverty: usize,
    millionaire: usize,
}

/// Finds the position of each configured column in the header.
/// All the missing columns are reported at once.
fn resolve_columns(header: &[Cell], mapping: &ColumnMapping) -> Result<ColumnIndexes, TableError> {
    let mut col_names: HashMap<String, usize> = HashMap::new();
    for (idx, cell) in header.iter().enumerate() {
        if let Cell::String(s) = cell {
            // The first column with a given name wins.
            col_names.entry(s.trim().to_string()).or_insert(idx);
        }
    }
    debug!("resolve_columns: header: {:?}", col_names);

    let mut found: Vec<usize> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for cname in mapping.required_columns() {
        match col_names.get(cname.trim()) {
            Some(idx) => found.push(*idx),
            None => missing.push(cname.to_string()),
        }
    }
    match found.as_slice() {
        [region, population, poverty, millionaire] => Ok(ColumnIndexes {
            region: *region,
            population: *population,
            poverty: *poverty,
            millionaire: *millionaire,
        }),
        _ => Err(TableError::MissingColumns { columns: missing }),
    }
}

fn malformed(lineno: u64, column: &str, message: String) -> TableError {
    TableError::MalformedInput {
        lineno: Some(lineno),
        column: Some(column.to_string()),
        message,
    }
}

fn read_region_id(cell: &Cell) -> Result<String, String> {
    match cell {
        Cell::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Cell::Int(i) => Ok(i.to_string()),
        // Codes typed as numbers in Excel come back as floats.
        Cell::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        Cell::String(_) | Cell::Empty => Err("missing region code".to_string()),
        c => Err(format!("expected a region code, found {:?}", c)),
    }
}

fn read_count(cell: &Cell) -> Result<f64, String> {
    let x = match cell {
        Cell::Int(i) => *i as f64,
        Cell::Float(f) => *f,
        Cell::String(s) => {
            // Spreadsheets exported as text often keep the thousands separators.
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned
                .parse::<f64>()
                .map_err(|_| format!("expected a number, found {:?}", s))?
        }
        Cell::Empty => return Err("missing number".to_string()),
        Cell::Other(c) => return Err(format!("expected a number, found {}", c)),
    };
    if x.is_finite() {
        Ok(x)
    } else {
        Err(format!("expected a finite number, found {}", x))
    }
}

/// Adds the millionaire density and the poverty rate to every region.
///
/// Regions with a population of zero get undefined ratios. This is not an error:
/// such regions still carry their raw counts.
pub fn derive(table: &Table<Region>) -> Table<DerivedRegion> {
    let rows: Vec<DerivedRegion> = table
        .iter()
        .map(|region| {
            let millionaire_density = Ratio::of(region.millionaire_count, region.population);
            let poverty_rate = Ratio::of(region.poverty_count, region.population);
            if region.population == 0.0 {
                warn!(
                    "derive: region {:?} has a population of zero, its ratios are undefined",
                    region.region_id
                );
            }
            DerivedRegion {
                region: region.clone(),
                millionaire_density,
                poverty_rate,
            }
        })
        .collect();
    debug!("derive: {} regions", rows.len());
    Table::new(rows)
}

/// Keeps the regions whose code is in `region_ids`, in the order of the table.
///
/// Codes that are not in the table are ignored. An empty set gives an empty table.
pub fn select<R>(table: &Table<R>, region_ids: &HashSet<String>) -> Table<R>
where
    R: RegionRecord + Clone,
{
    let rows: Vec<R> = table
        .iter()
        .filter(|r| region_ids.contains(r.region_id()))
        .cloned()
        .collect();

    let present: HashSet<&str> = table.iter().map(|r| r.region_id()).collect();
    let mut unknown: Vec<&String> = region_ids
        .iter()
        .filter(|id| !present.contains(id.as_str()))
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        debug!("select: ignoring unknown regions {:?}", unknown);
    }
    debug!(
        "select: {} regions requested, {} selected",
        region_ids.len(),
        rows.len()
    );
    Table::new(rows)
}

/// Orders the regions by the given field.
///
/// The sort is stable: regions with equal values keep the order of the table.
/// Regions for which the field is undefined always come last, whatever the direction.
pub fn rank_by(
    table: &Table<DerivedRegion>,
    field: MetricField,
    descending: bool,
) -> Vec<&DerivedRegion> {
    let mut defined: Vec<(f64, &DerivedRegion)> = Vec::new();
    let mut undefined: Vec<&DerivedRegion> = Vec::new();
    for dr in table.iter() {
        match field.value_of(dr) {
            Ratio::Defined(x) => defined.push((x, dr)),
            Ratio::Undefined => undefined.push(dr),
        }
    }

    defined.sort_by(|(x1, _), (x2, _)| {
        // Values are finite, and -0.0 must tie with 0.0.
        let o: Ordering = x1.partial_cmp(x2).unwrap_or(Ordering::Equal);
        if descending {
            o.reverse()
        } else {
            o
        }
    });
    debug!(
        "rank_by: field: {} descending: {} defined: {} undefined: {}",
        field,
        descending,
        defined.len(),
        undefined.len()
    );

    let mut res: Vec<&DerivedRegion> = defined.into_iter().map(|(_, dr)| dr).collect();
    res.extend(undefined);
    res
}
