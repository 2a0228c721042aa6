//! Title loading through the registry, document source, and parser seams.

mod support;

use std::sync::Arc;

use url::Url;

use marquee_core::error::ExperienceError;
use marquee_core::loader::TitleLoader;
use marquee_core::registry::{ContentRegistry, TitleRecord};
use marquee_model::appdata::{AppData, AppDataKind, Coordinate};
use marquee_model::ids::{AppDataId, ContentId};
use marquee_model::manifest::ManifestSection;
use marquee_model::style::TitleStyle;

use support::{JsonParser, MapSource, document_with, media_url};

fn registered(
    manifest_url: &Url,
    app_data_url: Option<Url>,
    style_url: Option<Url>,
) -> ContentRegistry {
    let mut registry = ContentRegistry::new();
    registry.register(
        ContentId::from("tt0001"),
        TitleRecord {
            title: "Big Night".into(),
            image_url: None,
            manifest_url: manifest_url.clone(),
            app_data_url,
            style_url,
        },
    );
    registry
}

fn loader(registry: ContentRegistry, source: Arc<MapSource>) -> TitleLoader {
    TitleLoader::new(registry, source, Arc::new(JsonParser))
}

fn trevi_fountain() -> AppData {
    AppData {
        id: AppDataId::from("loc-1"),
        title: "Trevi Fountain".into(),
        description: Some("Night shoot, week two".into()),
        kind: AppDataKind::Location {
            coordinate: Coordinate { latitude: 41.9009, longitude: 12.4833 },
            zoom_level: Some(14),
        },
        image_urls: Vec::new(),
    }
}

#[tokio::test]
async fn unknown_titles_fail_before_any_fetch() {
    let source = MapSource::new();
    let loader = loader(ContentRegistry::new(), source.clone());

    let err = loader
        .load_title(&ContentId::from("tt9999"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExperienceError::TitleNotFound(_)));
    assert!(source.hits().is_empty(), "no fetch for an unregistered title");
}

#[tokio::test]
async fn missing_mandatory_section_is_named() {
    let manifest_url = media_url("tt0001/manifest.json");
    let source = MapSource::new();
    let mut document = document_with(Vec::new(), Vec::new());
    document.in_movie = None;
    source.insert_json(&manifest_url, &document);

    let loader = loader(registered(&manifest_url, None, None), source);
    let err = loader
        .load_title(&ContentId::from("tt0001"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExperienceError::ManifestStructureInvalid(ManifestSection::InMovieExperience)
    ));
}

#[tokio::test]
async fn malformed_manifest_is_a_parse_error() {
    let manifest_url = media_url("tt0001/manifest.json");
    let source = MapSource::new();
    source.insert(&manifest_url, b"not a manifest".to_vec());

    let loader = loader(registered(&manifest_url, None, None), source);
    let err = loader
        .load_title(&ContentId::from("tt0001"))
        .await
        .unwrap_err();

    assert!(matches!(err, ExperienceError::Serialization(_)));
}

#[tokio::test]
async fn side_document_failures_degrade_to_a_bare_manifest() {
    let manifest_url = media_url("tt0001/manifest.json");
    let app_data_url = media_url("tt0001/appdata.json");
    let style_url = media_url("tt0001/style.json");
    let source = MapSource::new();
    // Only the manifest is present; both side fetches will fail.
    source.insert_json(&manifest_url, &document_with(Vec::new(), Vec::new()));

    let loader = loader(
        registered(&manifest_url, Some(app_data_url.clone()), Some(style_url.clone())),
        source.clone(),
    );
    let loaded = loader.load_title(&ContentId::from("tt0001")).await.unwrap();

    assert!(loaded.manifest.app_data.is_empty());
    assert!(loaded.manifest.style.is_none());
    let hits = source.hits();
    assert!(hits.contains(&app_data_url), "app data was attempted");
    assert!(hits.contains(&style_url), "style was attempted");
}

#[tokio::test]
async fn side_documents_join_the_aggregate() {
    let manifest_url = media_url("tt0001/manifest.json");
    let app_data_url = media_url("tt0001/appdata.json");
    let style_url = media_url("tt0001/style.json");
    let source = MapSource::new();
    source.insert_json(&manifest_url, &document_with(Vec::new(), Vec::new()));
    source.insert_json(&app_data_url, &vec![trevi_fountain()]);
    source.insert_json(&style_url, &TitleStyle::default());

    let loader = loader(
        registered(&manifest_url, Some(app_data_url), Some(style_url)),
        source,
    );
    let loaded = loader.load_title(&ContentId::from("tt0001")).await.unwrap();

    assert_eq!(loaded.title, "Big Night");
    assert_eq!(loaded.content_id, ContentId::from("tt0001"));
    assert!(loaded.manifest.style.is_some());
    let record = loaded
        .manifest
        .app_data
        .get(&AppDataId::from("loc-1"))
        .expect("location record indexed by id");
    assert_eq!(record.title, "Trevi Fountain");
    assert!(record.coordinate().is_some());
}
