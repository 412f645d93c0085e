use crate::results::{COLUMNS, CombinedRecord};
use std::io::{self, Write};

/// File name offered for CSV exports
pub const DEFAULT_EXPORT_FILE: &str = "odisha_rera_export.csv";

const SEP: char = ',';

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{}", SEP)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header row followed by one row per record, UTF-8
pub fn write_csv<W: Write>(mut w: W, records: &[CombinedRecord]) -> io::Result<()> {
    write_row(&mut w, &COLUMNS)?;
    for record in records {
        write_row(&mut w, &record.to_row())?;
    }
    w.flush()
}

pub fn to_csv_string(records: &[CombinedRecord]) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_csv(&mut buf, records);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Plain-text table with columns padded to their widest cell
pub fn render_table(records: &[CombinedRecord]) -> String {
    let rows: Vec<Vec<String>> = records.iter().map(CombinedRecord::to_row).collect();

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format_row(&COLUMNS));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_row(&cells));
        out.push('\n');
    }
    out
}
