//! Export vers GeoJSON

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use burgh::FeatureCollection;

use crate::config::OutputConfig;

/// Écrit la FeatureCollection dans un fichier
pub fn export_to_geojson(
    collection: &FeatureCollection,
    output: &OutputConfig,
    output_path: &Path,
) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_collection(&mut writer, collection, output)?;
    writer.flush()?;

    Ok(())
}

/// Sérialise selon le mode choisi (chaînes vides ou géométrie nulle)
fn write_collection<W: Write>(
    writer: &mut W,
    collection: &FeatureCollection,
    output: &OutputConfig,
) -> Result<()> {
    match (output.strict_geometry, output.pretty) {
        (true, true) => serde_json::to_writer_pretty(writer, &collection.to_geojson())?,
        (true, false) => serde_json::to_writer(writer, &collection.to_geojson())?,
        (false, true) => collection.to_writer_pretty(writer)?,
        (false, false) => collection.to_writer(writer)?,
    }
    Ok(())
}
