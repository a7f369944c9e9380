pub use crate::config::*;
use crate::Table;

/// A builder for assembling a table by hand, without going through a spreadsheet.
///
/// ```
/// pub use state_metrics::builder::TableBuilder;
/// pub use state_metrics::{derive, Ratio};
/// # use state_metrics::TableError;
///
/// let mut builder = TableBuilder::new();
/// builder.add_region("MD", 100.0, 10.0, 2.0)?;
/// builder.add_region("CA", 0.0, 0.0, 0.0)?;
///
/// let derived = derive(&builder.build());
/// assert_eq!(derived.rows()[0].poverty_rate, Ratio::Defined(0.1));
/// assert_eq!(derived.rows()[1].poverty_rate, Ratio::Undefined);
///
/// # Ok::<(), TableError>(())
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    pub(crate) _regions: Vec<Region>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder {
            _regions: Vec::new(),
        }
    }

    /// Adds a region at the end of the table.
    ///
    /// The region code must not be blank. The counts are not checked.
    pub fn add_region(
        &mut self,
        region_id: &str,
        population: f64,
        poverty_count: f64,
        millionaire_count: f64,
    ) -> Result<(), TableError> {
        if region_id.trim().is_empty() {
            return Err(TableError::MalformedInput {
                lineno: None,
                column: None,
                message: "blank region code".to_string(),
            });
        }
        self.push_region(&Region {
            region_id: region_id.trim().to_string(),
            population,
            poverty_count,
            millionaire_count,
        })
    }

    pub fn push_region(&mut self, region: &Region) -> Result<(), TableError> {
        self._regions.push(region.clone());
        Ok(())
    }

    pub fn build(self) -> Table<Region> {
        Table::new(self._regions)
    }
}
