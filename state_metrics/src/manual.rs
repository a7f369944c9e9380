/*!

This is the long-form manual for `state_metrics` and `povdash`.

## Input format

The input is an Excel workbook (`.xlsx`). Only one worksheet is read: the one named
with `worksheetName` / `--excel-worksheet-name`, or the first worksheet otherwise.
The first row is the header. Every following row describes one state:

| State | State Popiulation | Number in Poverty | Number of Millionaires |
|-------|-------------------|-------------------|------------------------|
| MD    | 6177224           | 554000            | 244000                 |
| VA    | 8631393           | 827000            | 270000                 |
| ...   | ...               | ...               | ...                    |

The headers above are the defaults (the misspelling of `Popiulation` comes from the
published dataset). Other columns are ignored and the columns may come in any order.

Rules applied while reading:
- the state codes should be the two-letter abbreviations, since the map joins on them;
  codes stored as whole numbers (`24`) are read as text, other numbers are rejected;
- numbers may be stored as numbers or as text (`1,234` is read as `1234`);
- rows that are entirely blank are skipped;
- any other empty or unreadable cell in one of the four columns stops the load with an
  error that gives the line and the column.

## Derived metrics

- `millionaire_density = millionaire_count / population`
- `poverty_rate = poverty_count / population`

When the population of a state is zero, both are *undefined* (`null` in the JSON
output). Such states are kept everywhere raw counts are shown, they are left out of
the poverty ranking and of the color range of the map, and they are listed last by
any ranking.

## Configuration

`povdash` works without configuration if the workbook uses the default headers.
Otherwise a JSON file can be passed with `--config`:

```json
{
  "inputFile": "poverty.xlsx",
  "worksheetName": "Sheet1",
  "columns": {
    "regionColumn": "State",
    "populationColumn": "State Popiulation",
    "povertyColumn": "Number in Poverty",
    "millionaireColumn": "Number of Millionaires"
  },
  "selection": ["MD", "VA", "CA"],
  "defaultSelectionSize": 5
}
```

All the fields are optional. `inputFile` is relative to the directory of the
configuration file. Command line flags take precedence over the configuration file.

## Output

A JSON document with one entry per chart:
- `comparison`: the poverty and millionaire counts of the selected states
  (`null` if none of the selected states is in the file);
- `densityMap`: the millionaire density of every state, for a map in `USA-states` mode;
- `povertyRanking`: the poverty rates in percent, highest first;
- `ranking`: the order of the states for the field given with `--rank-field`.

With `--reference`, the output is compared to a previously saved output and the
differences are printed.

 */
