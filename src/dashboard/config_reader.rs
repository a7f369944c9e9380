use crate::dashboard::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(rename = "regionColumn")]
    pub region_column: Option<String>,
    #[serde(rename = "populationColumn")]
    pub population_column: Option<String>,
    #[serde(rename = "povertyColumn")]
    pub poverty_column: Option<String>,
    #[serde(rename = "millionaireColumn")]
    pub millionaire_column: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(rename = "inputFile")]
    pub input_file: Option<String>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    pub columns: Option<ColumnsConfig>,
    pub selection: Option<Vec<String>>,
    #[serde(rename = "defaultSelectionSize")]
    _default_selection_size: Option<JSValue>,
}

impl DashboardConfig {
    pub fn default_selection_size(&self) -> DResult<Option<usize>> {
        match &self._default_selection_size {
            None => Ok(None),
            x => read_js_int("defaultSelectionSize", x).map(Some),
        }
    }
}

pub fn parse_config(contents: &str) -> DResult<DashboardConfig> {
    serde_json::from_str(contents).context(ParsingJsonSnafu {})
}

pub fn read_config(path: &str) -> DResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: {:?}", contents);
    parse_config(contents.as_str())
}

/// Reads a report previously written by this program.
pub fn read_reference(path: &str) -> DResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

// Numbers may be written as JSON numbers or as strings.
fn read_js_int(field: &str, x: &Option<JSValue>) -> DResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    res.context(ParsingJsonNumberSnafu {
        field,
        value: format!("{:?}", x),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.default_selection_size().unwrap(), None);
    }

    #[test]
    fn full_config() {
        let config = parse_config(
            r#"{
                "inputFile": "poverty.xlsx",
                "worksheetName": "Sheet1",
                "columns": {
                    "regionColumn": "State",
                    "populationColumn": "State Population",
                    "povertyColumn": "Number in Poverty",
                    "millionaireColumn": "Number of Millionaires"
                },
                "selection": ["MD", "VA"],
                "defaultSelectionSize": 7
            }"#,
        )
        .unwrap();
        assert_eq!(config.input_file, Some("poverty.xlsx".to_string()));
        assert_eq!(config.worksheet_name, Some("Sheet1".to_string()));
        let columns = config.columns.clone().unwrap();
        assert_eq!(
            columns.population_column,
            Some("State Population".to_string())
        );
        assert_eq!(
            config.selection,
            Some(vec!["MD".to_string(), "VA".to_string()])
        );
        assert_eq!(config.default_selection_size().unwrap(), Some(7));
    }

    #[test]
    fn bad_selection_size() {
        let config = parse_config(r#"{"defaultSelectionSize": "five"}"#).unwrap();
        assert!(matches!(
            config.default_selection_size(),
            Err(DashboardError::ParsingJsonNumber { .. })
        ));
        let config = parse_config(r#"{"defaultSelectionSize": -2}"#).unwrap();
        assert!(config.default_selection_size().is_err());
    }

    #[test]
    fn not_json() {
        assert!(matches!(
            parse_config("inputFile = poverty.xlsx"),
            Err(DashboardError::ParsingJson { .. })
        ));
    }
}
