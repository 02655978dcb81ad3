//! Découverte et lecture des fichiers sources (CSV avec en-tête)

use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;

use crate::error::LoadError;
use crate::types::{RawRecord, Scalar};

/// Options de lecture
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Colonnes devant figurer dans l'en-tête
    pub required_columns: Vec<String>,

    /// Séparateur de champs
    pub delimiter: u8,
}

impl LoadOptions {
    /// Options pour un fichier de burghs: seule la colonne de nom est requise
    pub fn for_name_column(name_column: &str) -> Self {
        Self {
            required_columns: vec![name_column.to_string()],
            ..Default::default()
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            required_columns: vec!["Burgh".to_string()],
            delimiter: b',',
        }
    }
}

/// Liste les fichiers sources d'un dossier (non récursif), triés par nom.
///
/// Un chemin de fichier est retourné seul, quelle que soit son extension.
pub fn list_sources(path: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(path).map_err(|e| LoadError::io(path, e))? {
        let entry = entry.map_err(|e| LoadError::io(path, e))?;
        let entry_path = entry.path();

        if entry_path.is_file()
            && entry_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| ext.eq_ignore_ascii_case(extension))
        {
            sources.push(entry_path);
        }
    }

    sources.sort();
    Ok(sources)
}

/// Lit un fichier source en conservant l'ordre des colonnes et des lignes
pub fn load(path: &Path, options: &LoadOptions) -> Result<Vec<RawRecord>, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    let text = decode(&bytes);
    parse(path, &text, options)
}

/// Décode en UTF-8 (BOM retiré), sinon en Windows-1252
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match simdutf8::basic::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Parse un contenu CSV déjà décodé
pub fn parse(path: &Path, text: &str, options: &LoadOptions) -> Result<Vec<RawRecord>, LoadError> {
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = unique_headers(reader.headers().map_err(csv_error)?);

    for column in &options.required_columns {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::missing_column(path, column.as_str()));
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_error)?;

        if row.len() > headers.len() {
            return Err(LoadError::Malformed {
                path: path.to_path_buf(),
                line: row.position().map_or(0, |p| p.line()),
                reason: format!("expected {} fields, found {}", headers.len(), row.len()),
            });
        }

        // Ligne courte: les colonnes manquantes sont absentes
        let fields = headers.iter().enumerate().map(|(i, header)| {
            let value = row.get(i).map_or(Scalar::Missing, Scalar::parse);
            (header.clone(), value)
        });
        records.push(RawRecord::new(fields));
    }

    Ok(records)
}

/// Rend les noms de colonnes uniques: `Notes`, `Notes.1`, `Notes.2`...
fn unique_headers(headers: &csv::StringRecord) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        let header = header.trim().to_string();
        let mut candidate = header.clone();
        let mut suffix = 1;
        while unique.contains(&candidate) {
            candidate = format!("{}.{}", header, suffix);
            suffix += 1;
        }
        unique.push(candidate);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> Result<Vec<RawRecord>, LoadError> {
        parse(Path::new("test.csv"), text, &LoadOptions::default())
    }

    #[test]
    fn test_parse_keeps_order() {
        let records = parse_str("Burgh,County,Charter\nAyr,Ayrshire,1205\nPerth,Perthshire,\n").unwrap();

        assert_eq!(records.len(), 2);
        let columns: Vec<_> = records[0].columns().collect();
        assert_eq!(columns, vec!["Burgh", "County", "Charter"]);
        assert_eq!(records[0].get("Charter"), Some(&Scalar::Integer(1205)));
        assert_eq!(records[1].get("Burgh"), Some(&Scalar::Text("Perth".into())));
        assert_eq!(records[1].get("Charter"), Some(&Scalar::Missing));
    }

    #[test]
    fn test_missing_name_column() {
        let err = parse_str("Town,County\nAyr,Ayrshire\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "Burgh"));
    }

    #[test]
    fn test_empty_file_is_missing_column() {
        let err = parse_str("").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { .. }));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let records = parse_str("Burgh,County\nAyr\n").unwrap();
        assert_eq!(records[0].get("County"), Some(&Scalar::Missing));
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = parse_str("Burgh\nAyr,extra\n").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_headers() {
        let records = parse_str("Burgh,Notes,Notes\nAyr,a,b\n").unwrap();
        let columns: Vec<_> = records[0].columns().collect();
        assert_eq!(columns, vec!["Burgh", "Notes", "Notes.1"]);
    }

    #[test]
    fn test_custom_delimiter() {
        let options = LoadOptions {
            required_columns: vec!["Name".into()],
            delimiter: b';',
        };
        let records = parse(Path::new("x.csv"), "Name;Year\nElgin;1136\n", &options).unwrap();
        assert_eq!(records[0].get("Year"), Some(&Scalar::Integer(1136)));
    }

    #[test]
    fn test_decode_windows_1252() {
        // "Café" en Windows-1252
        let bytes = b"Burgh\nCaf\xE9\n";
        assert_eq!(decode(bytes), "Burgh\nCaf\u{e9}\n");
    }

    #[test]
    fn test_decode_strips_bom() {
        assert_eq!(decode(b"\xEF\xBB\xBFBurgh\n"), "Burgh\n");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load(Path::new("nonexistent.csv"), &LoadOptions::default());
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }
}
