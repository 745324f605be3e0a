use std::path::Path;

use csv::WriterBuilder;

use crate::error::ExtractError;
use crate::model::MergedOutput;

pub(crate) fn write_csv(
    path: &Path,
    merged: &MergedOutput,
    delimiter: u8,
) -> Result<(), ExtractError> {
    let writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_records(writer, merged)?;
    Ok(())
}

pub(crate) fn write_csv_to_string(
    merged: &MergedOutput,
    delimiter: u8,
) -> Result<String, ExtractError> {
    let writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    let bytes = write_records(writer, merged)?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}

fn write_records<W: std::io::Write>(
    mut writer: csv::Writer<W>,
    merged: &MergedOutput,
) -> Result<W, ExtractError> {
    writer.write_record(&merged.headers)?;
    for row in &merged.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))
}
