//! Tests d'intégration du pipeline complet avec un service de géocodage factice

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use burgh::{
    list_sources, to_feature_collection, Coordinates, GeocodeClient, GeocodeResult, LoadError,
    Lookup, LookupError, Pipeline, PipelineOptions,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

/// Gazetteer factice comptant ses appels
#[derive(Default)]
struct Gazetteer {
    calls: AtomicUsize,
}

impl Lookup for Gazetteer {
    fn lookup<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, LookupError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(match query {
                "Perth" => Some(Coordinates::new(56.3955, -3.4309)),
                "of Ayr" => Some(Coordinates::new(55.4586, -4.6292)),
                "Elgin" => Some(Coordinates::new(57.6495, -3.3186)),
                _ => None,
            })
        }
        .boxed()
    }
}

/// Service toujours en erreur
struct Unreachable;

impl Lookup for Unreachable {
    fn lookup<'a>(
        &'a self,
        _query: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, LookupError>> {
        async { Err(LookupError::Transport("connection refused".into())) }.boxed()
    }
}

/// Crée un dossier temporaire propre au test
fn fixture_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("burgh-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for (file, content) in files {
        std::fs::write(dir.join(file), content).unwrap();
    }
    dir
}

fn pipeline<L: Lookup>(lookup: L) -> Pipeline<L> {
    Pipeline::new(GeocodeClient::new(lookup), PipelineOptions::default())
}

#[tokio::test]
async fn test_same_burgh_in_two_files() {
    let dir = fixture_dir(
        "two-files",
        &[
            ("a.csv", "Burgh,Listing\nPerth,A\nRoyal Burgh of Ayr,A\n"),
            ("b.csv", "Burgh,Listing\nPerth,B\n"),
            ("notes.txt", "not a source"),
        ],
    );

    let sources = list_sources(&dir, "csv").unwrap();
    assert_eq!(sources.len(), 2);

    let lookup = Arc::new(Gazetteer::default());
    let pipeline = pipeline(Arc::clone(&lookup));
    let outcome = pipeline.run(&sources).await.unwrap();

    let set = &outcome.consolidated;
    assert_eq!(set.len(), 3);
    // ordre fichier puis ligne
    let listings: Vec<_> = set
        .iter()
        .map(|r| r.raw.get("Listing").unwrap().as_text().into_owned())
        .collect();
    assert_eq!(listings, vec!["A", "A", "B"]);
    assert_eq!(set.records()[1].cleaned_name, "of Ayr");
    assert_eq!(set.records()[0].geocode, set.records()[2].geocode);

    // Perth n'est géocodé qu'une fois
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.client().stats().external_lookups, 2);

    let value = serde_json::to_value(to_feature_collection(set)).unwrap();
    let features = value["features"].as_array().unwrap();
    assert_eq!(features.len(), 3);
    assert_eq!(features[0]["geometry"]["coordinates"], json!([-3.4309, 56.3955]));
    assert_eq!(features[2]["geometry"]["coordinates"], json!([-3.4309, 56.3955]));
    assert_eq!(features[2]["properties"]["Listing"], json!("B"));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_unreachable_service_still_covers_every_row() {
    let dir = fixture_dir(
        "unreachable",
        &[("burghs.csv", "Burgh,County\nPerth,Perthshire\nElgin,Moray\n,Nowhere\n")],
    );
    let sources = list_sources(&dir, "csv").unwrap();

    let outcome = pipeline(Unreachable).run(&sources).await.unwrap();
    assert_eq!(outcome.consolidated.len(), 3);
    // ligne sans nom: pas d'appel, Unresolved
    assert_eq!(outcome.consolidated.records()[2].geocode, GeocodeResult::Unresolved);
    assert!(outcome.consolidated.records()[0].geocode.is_failed());

    let value = serde_json::to_value(to_feature_collection(&outcome.consolidated)).unwrap();
    for feature in value["features"].as_array().unwrap() {
        assert_eq!(feature["geometry"]["coordinates"], json!(["", ""]));
        assert_eq!(feature["properties"]["lat"], json!(""));
        assert_eq!(feature["properties"]["long"], json!(""));
    }
    assert_eq!(value["features"][2]["properties"]["Burgh"], json!(""));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_source_without_name_column_is_skipped() {
    let dir = fixture_dir(
        "missing-column",
        &[
            ("a.csv", "Town\nPerth\n"),
            ("b.csv", "Burgh\nElgin\n"),
        ],
    );
    let sources = list_sources(&dir, "csv").unwrap();

    let outcome = pipeline(Gazetteer::default()).run(&sources).await.unwrap();

    assert_eq!(outcome.consolidated.len(), 1);
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(outcome.failed_sources.len(), 1);
    assert!(matches!(
        outcome.failed_sources[0].1,
        LoadError::MissingColumn { .. }
    ));

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_total_coverage_with_concurrency() {
    let mut rows = String::from("Burgh,Rank\n");
    for i in 0..40 {
        let name = ["Perth", "Elgin", "Atlantis", "Royal Burgh of Ayr"][i % 4];
        rows.push_str(&format!("{},{}\n", name, i));
    }
    let dir = fixture_dir("coverage", &[("a.csv", rows.as_str()), ("b.csv", rows.as_str())]);
    let sources = list_sources(&dir, "csv").unwrap();

    let lookup = Arc::new(Gazetteer::default());
    let pipeline = Pipeline::new(
        GeocodeClient::new(Arc::clone(&lookup)),
        PipelineOptions {
            concurrency: 8,
            ..Default::default()
        },
    );
    let outcome = pipeline.run(&sources).await.unwrap();

    let expected: usize = outcome.sources.iter().map(|s| s.records).sum();
    assert_eq!(expected, 80);
    assert_eq!(outcome.consolidated.len(), expected);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 4);

    let ranks: Vec<Value> = to_feature_collection(&outcome.consolidated)
        .features
        .iter()
        .map(|f| f.properties["Rank"].clone())
        .collect();
    let expected_ranks: Vec<Value> = (0..40).chain(0..40).map(|i| json!(i)).collect();
    assert_eq!(ranks, expected_ranks);

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_windows_1252_source() {
    let dir = fixture_dir("latin1", &[]);
    std::fs::write(dir.join("a.csv"), b"Burgh,Note\nElgin,caf\xE9\n").unwrap();

    let outcome = pipeline(Gazetteer::default())
        .run(&[dir.join("a.csv")])
        .await
        .unwrap();
    let record = &outcome.consolidated.records()[0];
    assert_eq!(record.raw.get("Note").unwrap().as_text(), "caf\u{e9}");
    assert!(record.geocode.is_resolved());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_list_sources_single_file() {
    let sources = list_sources(Path::new("Cargo.toml"), "csv").unwrap();
    assert_eq!(sources, vec![PathBuf::from("Cargo.toml")]);
}
