//! Export du CSV consolidé (colonnes sources + colonnes dérivées)

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use burgh::ConsolidatedSet;

/// Écrit l'ensemble consolidé; une valeur absente donne une cellule vide
pub fn export_to_csv(set: &ConsolidatedSet, output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    write_csv(file, set)
}

fn write_csv<W: Write>(out: W, set: &ConsolidatedSet) -> Result<()> {
    let mut wtr = ::csv::WriterBuilder::new().has_headers(true).from_writer(out);
    let (columns, rows) = set.rows();

    wtr.write_record(&columns)?;
    for row in rows {
        wtr.write_record(row.iter().map(|value| value.as_text().into_owned()))?;
    }
    wtr.flush()?;

    Ok(())
}
