//! Types de données pour le crate burgh

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Valeurs considérées comme "absentes" à la lecture d'une cellule
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Valeur scalaire d'une cellule
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    /// Cellule vide ou marqueur NA
    Missing,
}

impl Scalar {
    /// Type une cellule brute lue depuis un fichier tabulaire.
    ///
    /// Une cellule n'est typée numérique que si sa réécriture redonne le texte
    /// lu (`55.4586`, `1205`); sinon (`1e3`, `007`, `inf`) elle reste du texte.
    pub fn parse(cell: &str) -> Self {
        if MISSING_TOKENS.contains(&cell.trim()) {
            return Scalar::Missing;
        }
        if let Ok(i) = cell.parse::<i64>() {
            if i.to_string() == cell {
                return Scalar::Integer(i);
            }
        }
        // fast_float accepte un préfixe numérique: on exige une consommation totale
        if let Ok((f, consumed)) = fast_float::parse_partial::<f64, _>(cell) {
            if consumed == cell.len() && f.is_finite() && f.to_string() == cell {
                return Scalar::Float(f);
            }
        }
        Scalar::Text(cell.to_string())
    }

    /// `true` si la valeur est absente ou non finie (NaN, inf)
    pub fn is_missing(&self) -> bool {
        match self {
            Scalar::Missing => true,
            Scalar::Float(f) => !f.is_finite(),
            _ => false,
        }
    }

    /// Valeur numérique finie, si la cellule en porte une
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Float(f) if f.is_finite() => Some(*f),
            Scalar::Text(s) => fast_float::parse::<f64, _>(s.trim())
                .ok()
                .filter(|f| f.is_finite()),
            _ => None,
        }
    }

    /// Représentation texte (vide pour une valeur absente ou non finie)
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Text(s) => Cow::Borrowed(s.as_str()),
            Scalar::Integer(i) => Cow::Owned(i.to_string()),
            Scalar::Float(f) if f.is_finite() => Cow::Owned(f.to_string()),
            Scalar::Float(_) | Scalar::Missing => Cow::Borrowed(""),
        }
    }
}

impl From<Option<f64>> for Scalar {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Scalar::Missing, Scalar::Float)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Une ligne d'un fichier source: colonnes ordonnées, noms uniques
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    fields: Vec<(String, Scalar)>,
}

impl RawRecord {
    /// Construit un enregistrement; une clé répétée garde la dernière valeur
    pub fn new<K: Into<String>>(fields: impl IntoIterator<Item = (K, Scalar)>) -> Self {
        let mut record = Self::default();
        for (key, value) in fields {
            record.upsert(key.into(), value);
        }
        record
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|(key, _)| key == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remplace la valeur en place si la colonne existe, sinon l'ajoute en fin
    fn upsert(&mut self, key: String, value: Scalar) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }
}

/// Coordonnées WGS84 brutes renvoyées par le service de géocodage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finies et dans les bornes WGS84
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Point `geo` (x = longitude, y = latitude)
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// Résultat du géocodage d'un nom nettoyé
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeResult {
    Resolved(Coordinates),
    /// Le service n'a trouvé aucune correspondance
    Unresolved,
    /// Le service a échoué (réseau, timeout, réponse invalide)
    Failed { reason: String },
}

impl GeocodeResult {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            GeocodeResult::Resolved(c) => Some(*c),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, GeocodeResult::Resolved(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, GeocodeResult::Failed { .. })
    }
}

/// Noms des colonnes dérivées ajoutées à chaque enregistrement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedColumns {
    pub cleaned: Arc<str>,
    pub lat: Arc<str>,
    pub long: Arc<str>,
}

impl DerivedColumns {
    pub const LAT: &'static str = "lat";
    pub const LONG: &'static str = "long";

    /// `Burgh` -> `Burgh_Cleaned`, `lat`, `long`
    pub fn for_name_column(name_column: &str) -> Self {
        Self {
            cleaned: format!("{}_Cleaned", name_column).into(),
            lat: Self::LAT.into(),
            long: Self::LONG.into(),
        }
    }
}

impl Default for DerivedColumns {
    fn default() -> Self {
        Self::for_name_column("Burgh")
    }
}

/// Enregistrement source enrichi du nom nettoyé et du résultat de géocodage
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    /// Fichier d'origine
    pub source: Arc<PathBuf>,

    pub raw: RawRecord,

    pub cleaned_name: String,

    pub geocode: GeocodeResult,

    pub derived: DerivedColumns,
}

impl AnnotatedRecord {
    pub fn lat(&self) -> Option<f64> {
        self.geocode.coordinates().map(|c| c.latitude)
    }

    pub fn long(&self) -> Option<f64> {
        self.geocode.coordinates().map(|c| c.longitude)
    }

    /// Projection complète: colonnes brutes puis colonnes dérivées.
    ///
    /// Une colonne dérivée déjà présente dans la source est remplacée en place.
    pub fn fields(&self) -> RawRecord {
        let mut fields = self.raw.clone();
        fields.upsert(
            self.derived.cleaned.to_string(),
            Scalar::Text(self.cleaned_name.clone()),
        );
        fields.upsert(self.derived.lat.to_string(), self.lat().into());
        fields.upsert(self.derived.long.to_string(), self.long().into());
        fields
    }
}

/// Ensemble consolidé de tous les enregistrements, toutes sources confondues
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidatedSet {
    pub(crate) records: Vec<AnnotatedRecord>,
}

impl ConsolidatedSet {
    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnotatedRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Union des colonnes de tous les enregistrements, ordre de première apparition
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for column in record.fields().columns() {
                if !columns.iter().any(|c| c == column) {
                    columns.push(column.to_string());
                }
            }
        }
        columns
    }

    /// Lignes alignées sur `columns()`, `Missing` pour une colonne absente
    pub fn rows(&self) -> (Vec<String>, Vec<Vec<Scalar>>) {
        let columns = self.columns();
        let rows = self
            .records
            .iter()
            .map(|record| {
                let fields = record.fields();
                columns
                    .iter()
                    .map(|c| fields.get(c).cloned().unwrap_or(Scalar::Missing))
                    .collect()
            })
            .collect();
        (columns, rows)
    }
}

impl IntoIterator for ConsolidatedSet {
    type Item = AnnotatedRecord;
    type IntoIter = std::vec::IntoIter<AnnotatedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
