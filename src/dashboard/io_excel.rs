// Primitives for reading Excel workbooks.

use std::fs::File;
use std::io::{BufReader, Read, Seek};

use calamine::{DataType, Range, Reader, Xlsx};

use crate::dashboard::{io_common::to_cells, *};

/// Reads the table of regions from an Excel file on disk.
pub fn read_excel_file(path: &str, settings: &LoadSettings) -> DResult<Table<Region>> {
    let file = File::open(path).context(OpeningFileSnafu { path })?;
    load(BufReader::new(file), path, settings)
}

/// Reads the table of regions from the bytes of an Excel file, for example an upload.
///
/// `source_name` is only used in the error messages.
pub fn load<RS: Read + Seek>(
    reader: RS,
    source_name: &str,
    settings: &LoadSettings,
) -> DResult<Table<Region>> {
    let workbook: Xlsx<RS> = Xlsx::new(reader).context(OpeningExcelSnafu { path: source_name })?;
    read_workbook(workbook, source_name, settings)
}

fn read_workbook<RS: Read + Seek>(
    mut workbook: Xlsx<RS>,
    path: &str,
    settings: &LoadSettings,
) -> DResult<Table<Region>> {
    let wrange = get_range(&mut workbook, path, settings.worksheet_name.as_deref())?;
    debug!(
        "read_workbook: path: {:?} size: {:?}",
        path,
        wrange.get_size()
    );

    let mut iter = wrange.rows();
    let header = to_cells(iter.next().context(MissingHeaderSnafu { path })?);
    debug!("read_workbook: header: {:?}", header);

    let table = Table::from_cells(&header, iter.map(to_cells), &settings.columns)
        .context(ReadingTableSnafu { path })?;
    info!("Read {} regions from {:?}", table.len(), path);
    Ok(table)
}

fn get_range<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    path: &str,
    worksheet_name_o: Option<&str>,
) -> DResult<Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })
    } else {
        workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })
    }
}
