use clap::Parser;

/// Computes poverty and millionaire metrics per U.S. state from an Excel spreadsheet
/// and writes the data of the dashboard charts in JSON format.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A configuration file in JSON format. It can set the input file, the
    /// names of the columns, the worksheet and the selection of states. See the manual for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The Excel (.xlsx) file with one row per state. Setting this option overrides
    /// the input file that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the report in JSON format. Defaults to the
    /// standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference report in JSON format. If provided, povdash will check that the
    /// computed report matches the reference and fail otherwise.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (list of state codes, comma-separated or repeated) The states to compare in the poverty vs
    /// millionaires chart. Defaults to the first states in alphabetical order.
    #[clap(long, value_parser)]
    pub select: Option<Vec<String>>,

    /// (default: first worksheet) The name of the worksheet to read.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 'State') The header of the column with the state codes.
    #[clap(long, value_parser)]
    pub region_column: Option<String>,

    /// (default 'State Popiulation') The header of the column with the population.
    #[clap(long, value_parser)]
    pub population_column: Option<String>,

    /// (default 'Number in Poverty') The header of the column with the number of people in poverty.
    #[clap(long, value_parser)]
    pub poverty_column: Option<String>,

    /// (default 'Number of Millionaires') The header of the column with the number of millionaires.
    #[clap(long, value_parser)]
    pub millionaire_column: Option<String>,

    /// (default poverty_rate) The field used for the 'ranking' section of the report. One of
    /// population, poverty_count, millionaire_count, millionaire_density, poverty_rate.
    #[clap(long, value_parser)]
    pub rank_field: Option<String>,

    /// If passed as an argument, the 'ranking' section is sorted from lowest to highest.
    #[clap(long, takes_value = false)]
    pub ascending: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard error.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
