//! Sérialisation de l'ensemble consolidé en FeatureCollection GeoJSON
//!
//! Les valeurs absentes ou non finies deviennent `""`: les clients
//! cartographiques (Leaflet) attendent une valeur réelle ou une chaîne vide,
//! jamais `null` ni `NaN`. Les coordonnées sont émises `[longitude, latitude]`.

use std::io::Write;

use geojson::{JsonObject, JsonValue};
use serde::{Serialize, Serializer};

use crate::error::SerializationError;
use crate::types::{ConsolidatedSet, Coordinates, RawRecord, Scalar};

/// Ordonnée d'un point: nombre fini ou chaîne vide
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ordinate {
    Value(f64),
    Missing,
}

impl From<Option<f64>> for Ordinate {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Ordinate::Value(v),
            _ => Ordinate::Missing,
        }
    }
}

impl Serialize for Ordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Ordinate::Value(v) => serializer.serialize_f64(*v),
            Ordinate::Missing => serializer.serialize_str(""),
        }
    }
}

/// Géométrie Point `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Point")]
pub struct PointGeometry {
    pub coordinates: [Ordinate; 2],
}

impl PointGeometry {
    pub fn new(longitude: Ordinate, latitude: Ordinate) -> Self {
        Self {
            coordinates: [longitude, latitude],
        }
    }

    /// Point `geo` si les deux ordonnées sont présentes
    pub fn to_point(&self) -> Option<geo::Point<f64>> {
        match self.coordinates {
            [Ordinate::Value(x), Ordinate::Value(y)] => Some(geo::Point::new(x, y)),
            _ => None,
        }
    }
}

impl From<Option<Coordinates>> for PointGeometry {
    fn from(coords: Option<Coordinates>) -> Self {
        match coords.map(Coordinates::to_point) {
            Some(point) => PointGeometry::new(Some(point.x()).into(), Some(point.y()).into()),
            None => PointGeometry::new(Ordinate::Missing, Ordinate::Missing),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: PointGeometry,
    pub properties: JsonObject,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Écrit le document JSON compact
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), SerializationError> {
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn to_writer_pretty<W: Write>(&self, writer: W) -> Result<(), SerializationError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, SerializationError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Variante stricte RFC 7946: une feature sans coordonnées porte
    /// `"geometry": null` au lieu de `["", ""]`.
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        let features = self
            .features
            .iter()
            .map(|feature| geojson::Feature {
                bbox: None,
                geometry: feature.geometry.to_point().map(|point| {
                    geojson::Geometry::new(geojson::Value::Point(vec![point.x(), point.y()]))
                }),
                id: None,
                properties: Some(feature.properties.clone()),
                foreign_members: None,
            })
            .collect();

        geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Convertit une valeur de cellule en JSON (absente / non finie -> `""`)
pub fn scalar_to_json(value: &Scalar) -> JsonValue {
    match value {
        Scalar::Text(s) => JsonValue::String(s.clone()),
        Scalar::Integer(i) => JsonValue::from(*i),
        Scalar::Float(f) => serde_json::Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(String::new())),
        Scalar::Missing => JsonValue::String(String::new()),
    }
}

/// Construit la FeatureCollection: une feature par enregistrement, même ordre.
///
/// Les propriétés couvrent l'union des colonnes de l'ensemble, `lat`/`long` compris.
pub fn to_feature_collection(set: &ConsolidatedSet) -> FeatureCollection {
    let (columns, rows) = set.rows();

    let features = set
        .iter()
        .zip(rows)
        .map(|(record, row)| {
            let properties: JsonObject = columns
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.clone(), scalar_to_json(value)))
                .collect();
            Feature {
                geometry: record.geocode.coordinates().into(),
                properties,
            }
        })
        .collect();

    FeatureCollection { features }
}

/// Construit la FeatureCollection depuis des lignes déjà géocodées, sans les modifier.
///
/// Les propriétés sont les colonnes de chaque ligne telles que lues; la géométrie
/// reprend `[long, lat]` de la ligne, sans contrôle de bornes.
pub fn records_to_feature_collection(
    records: &[RawRecord],
    lat_column: &str,
    long_column: &str,
) -> FeatureCollection {
    let features = records
        .iter()
        .map(|record| {
            let ordinate = |column: &str| Ordinate::from(record.get(column).and_then(Scalar::as_f64));
            Feature {
                geometry: PointGeometry::new(ordinate(long_column), ordinate(lat_column)),
                properties: record
                    .iter()
                    .map(|(column, value)| (column.to_string(), scalar_to_json(value)))
                    .collect(),
            }
        })
        .collect();

    FeatureCollection { features }
}
