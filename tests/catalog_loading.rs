use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;

use rosterview::catalog::{Catalog, CatalogLoader, DocumentFetcher, LoadError, SectionLoad};
use rosterview::config::CatalogSource;
use rosterview::paths::BasePath;

/// Serves documents from memory and records every requested URL.
#[derive(Default)]
struct MemoryFetcher {
    docs: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    fn with(mut self, url: &str, body: &str) -> Self {
        self.docs.insert(url.to_string(), body.to_string());
        self
    }
}

#[async_trait(?Send)]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        self.requests.borrow_mut().push(url.to_string());
        self.docs
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::Transport("connection refused".to_string()))
    }
}

const CREW: &str = r#"{
  "groups": [
    {
      "title": "Crew",
      "members": [
        {
          "id": "aria",
          "name": "Aria",
          "nameEn": "Aria",
          "img": "../img/aria.png",
          "focusY": "8%",
          "age": 17,
          "overview": "Navigator.",
          "T1": "Origins",
          "N1": ["Born aboard.", "Raised aboard."],
          "images": [
            { "src": "img/aria-1.jpg", "title": "Deck" },
            { "src": "https://cdn.example.org/aria-2.jpg" },
            { "src": "" }
          ]
        },
        { "age": 40 },
        { "name": "Bram" }
      ]
    },
    { "title": "Empty" }
  ]
}"#;

fn sources() -> Vec<CatalogSource> {
    vec![
        CatalogSource::new("data/world.json", "world-list"),
        CatalogSource::new("data/crew.json", "crew-list"),
    ]
}

async fn load(fetcher: MemoryFetcher, base: &str) -> (Catalog, Vec<String>) {
    rosterview::platform::init_logging(log::Level::Debug);
    let sources = sources();
    let mut catalog = Catalog::new(&sources);
    let loader = CatalogLoader::new(fetcher, BasePath::new(base));
    loader
        .load_all(&sources, |index, _, load| {
            catalog.install(index, load);
        })
        .await;
    let requests = loader.fetcher().requests.borrow().clone();
    (catalog, requests)
}

#[tokio::test]
async fn test_failed_source_is_isolated() {
    let fetcher = MemoryFetcher::default().with("/roster/data/crew.json", CREW);
    let (catalog, requests) = load(fetcher, "/roster/").await;

    assert_eq!(
        requests,
        vec!["/roster/data/world.json", "/roster/data/crew.json"]
    );

    let view = catalog.view();
    assert_eq!(view[0].target, "world-list");
    assert_eq!(view[0].status, "failed");
    let message = view[0].message.as_deref().unwrap();
    assert!(message.contains("data/world.json"), "{message}");
    assert!(view[0].groups.is_empty());

    assert_eq!(view[1].status, "rendered");
    assert!(view[1].message.is_none());
    let names: Vec<_> = view[1].groups[0]
        .controls
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Aria", "Bram"]);
}

#[tokio::test]
async fn test_members_are_resolved_against_base_path() {
    let fetcher = MemoryFetcher::default().with("/roster/data/crew.json", CREW);
    let (catalog, _) = load(fetcher, "/roster").await;

    let aria = catalog.record(catalog.find_by_identity("aria").unwrap()).unwrap();
    assert_eq!(aria.img, "/roster/img/aria.png");
    assert_eq!(aria.focus_y, "8%");
    assert_eq!(aria.field("age"), "17");
    assert_eq!(aria.overview, vec!["Navigator."]);
    assert_eq!(aria.notes[0].title, "Origins");
    assert_eq!(aria.notes[0].paragraphs.len(), 2);
    assert_eq!(aria.images.len(), 2);
    assert_eq!(aria.images[0].src, "/roster/img/aria-1.jpg");
    assert_eq!(aria.images[0].caption, "Deck");
    assert_eq!(aria.images[1].src, "https://cdn.example.org/aria-2.jpg");

    // Members without any identity are dropped; empty groups survive.
    let view = catalog.view();
    assert_eq!(view[1].groups.len(), 2);
    assert_eq!(view[1].groups[0].controls.len(), 2);
    assert_eq!(view[1].groups[1].title, "Empty");
    assert!(view[1].groups[1].controls.is_empty());
}

#[tokio::test]
async fn test_malformed_document_fails_only_that_source() {
    let fetcher = MemoryFetcher::default()
        .with("/data/world.json", "{ \"groups\": [ ")
        .with("/data/crew.json", CREW);
    let (catalog, _) = load(fetcher, "/").await;

    let view = catalog.view();
    assert_eq!(view[0].status, "failed");
    assert_eq!(view[1].status, "rendered");
    assert!(catalog.find_by_identity("Bram").is_some());
}

#[tokio::test]
async fn test_missing_groups_render_empty() {
    let fetcher = MemoryFetcher::default()
        .with("/data/world.json", "{}")
        .with("/data/crew.json", r#"{ "groups": [] }"#);
    let (catalog, _) = load(fetcher, "/").await;

    for section in catalog.view() {
        assert_eq!(section.status, "rendered");
        assert!(section.groups.is_empty());
    }
    assert_eq!(catalog.controls().count(), 0);
}

#[tokio::test]
async fn test_each_install_publishes_a_generation() {
    let fetcher = MemoryFetcher::default().with("/data/crew.json", CREW);
    let sources = sources();
    let mut catalog = Catalog::new(&sources);
    let rx = catalog.subscribe();
    let loader = CatalogLoader::new(fetcher, BasePath::default());

    loader
        .load_all(&sources, |index, _, load| {
            assert!(catalog.install(index, load));
        })
        .await;

    assert_eq!(catalog.generation(), 2);
    assert_eq!(*rx.borrow(), 2);
    assert!(!catalog.install(sources.len(), SectionLoad::Loaded(Vec::new())));
    assert_eq!(catalog.generation(), 2);
}

#[tokio::test]
async fn test_targets_sharing_a_document_both_render() {
    let fetcher = MemoryFetcher::default().with("/data/crew.json", CREW);
    let sources = vec![
        CatalogSource::new("data/crew.json", "crew-main"),
        CatalogSource::new("data/crew.json", "crew-sidebar"),
    ];
    let mut catalog = Catalog::new(&sources);
    let loader = CatalogLoader::new(fetcher, BasePath::default());
    loader
        .load_all(&sources, |index, _, load| {
            assert!(catalog.install(index, load));
        })
        .await;

    assert_eq!(loader.fetcher().requests.borrow().len(), 2);
    let view = catalog.view();
    assert_eq!(view[0].target, "crew-main");
    assert_eq!(view[1].target, "crew-sidebar");
    for section in &view {
        assert_eq!(section.status, "rendered");
        assert_eq!(section.groups[0].controls.len(), 2);
    }
    // Each target gets its own controls.
    assert_ne!(
        view[0].groups[0].controls[0].control,
        view[1].groups[0].controls[0].control
    );
}

#[tokio::test]
async fn test_numeric_identity_does_not_fail_the_source() {
    let fetcher = MemoryFetcher::default()
        .with("/data/world.json", r#"{ "groups": [] }"#)
        .with(
            "/data/crew.json",
            r#"{"groups":[{"members":[{"id":7,"name":"Aria"},{"id":"bram"}]}]}"#,
        );
    let (catalog, _) = load(fetcher, "/").await;

    let view = catalog.view();
    assert_eq!(view[1].status, "rendered");
    let ids: Vec<_> = view[1].groups[0]
        .controls
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(ids, vec!["7", "bram"]);
    assert!(catalog.find_by_identity("7").is_some());
}
