use std::io::Write;
use std::path::Path;

use crate::error::ExportError;

use super::model::Dataset;

// ---------------------------------------------------------------------------
// CSV export of a (filtered) view
// ---------------------------------------------------------------------------

/// Write `view` as CSV: header row in schema order, cells rendered with
/// `Value`'s `Display` (null becomes an empty field).
pub fn write_csv<W: Write>(view: &Dataset, writer: W) -> Result<(), ExportError> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(view.column_names())?;
    for row in 0..view.len() {
        let cells = view
            .columns()
            .iter()
            .map(|col| col.values[row].to_string());
        out.write_record(cells)?;
    }
    out.flush()?;
    Ok(())
}

pub fn to_csv_string(view: &Dataset) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(view, &mut buf)?;
    String::from_utf8(buf)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

pub fn write_csv_file(view: &Dataset, path: &Path) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(view, std::io::BufWriter::new(file))?;
    log::info!("Wrote {} rows to {}", view.len(), path.display());
    Ok(())
}
