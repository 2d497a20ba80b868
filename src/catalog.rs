//! Catalog loading and the rendered catalog index.
//!
//! Each configured [`CatalogSource`] names one JSON document and one render
//! target. Sources load independently: a failed fetch or parse replaces that
//! source's section with an inline message and the rest carry on. There is
//! no retry and no caching; every load asks for a fresh copy.
//!
//! Installing a section publishes a new generation on a watch channel. That
//! is the "catalog rendered" signal the deep-link resolver waits on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::watch;

use crate::config::CatalogSource;
use crate::debug::{self, cat};
use crate::model::{CatalogDocument, EntityRecord};
use crate::paths::BasePath;
use crate::ui_core::ControlId;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("invalid document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Retrieves raw documents. Implemented over HTTP in production and in
/// memory in tests.
#[async_trait(?Send)]
pub trait DocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<String, LoadError>;
}

/// Fetches over HTTP, always bypassing caches.
pub struct HttpFetcher {
    client: reqwest::Client,
    origin: Option<String>,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        HttpFetcher {
            client: reqwest::Client::new(),
            origin: None,
        }
    }

    /// Root-relative URLs are joined onto `origin` (e.g. `https://example.org`).
    pub fn with_origin(origin: impl Into<String>) -> Self {
        HttpFetcher {
            client: reqwest::Client::new(),
            origin: Some(origin.into()),
        }
    }

    fn absolute(&self, url: &str) -> String {
        match &self.origin {
            Some(origin) if !url.contains("://") => {
                format!("{}/{}", origin.trim_end_matches('/'), url.trim_start_matches('/'))
            }
            _ => url.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, LoadError> {
        use reqwest::header::{CACHE_CONTROL, PRAGMA};

        let resp = self
            .client
            .get(self.absolute(url))
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        resp.text()
            .await
            .map_err(|e| LoadError::Transport(e.to_string()))
    }
}

/// A loaded group before ids are assigned.
#[derive(Clone, Debug, Default)]
pub struct LoadedGroup {
    pub title: String,
    pub records: Vec<EntityRecord>,
}

/// Outcome of loading one source.
#[derive(Clone, Debug)]
pub enum SectionLoad {
    Loaded(Vec<LoadedGroup>),
    Failed { message: String },
}

/// Inline message shown in place of a source that failed to load.
pub fn failure_message(source: &CatalogSource) -> String {
    format!("Could not load catalog data ({})", source.id)
}

pub struct CatalogLoader<F> {
    fetcher: F,
    base: BasePath,
}

impl<F: DocumentFetcher> CatalogLoader<F> {
    pub fn new(fetcher: F, base: BasePath) -> Self {
        CatalogLoader { fetcher, base }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn fetch_groups(&self, source: &CatalogSource) -> Result<Vec<LoadedGroup>, LoadError> {
        let url = self.base.resolve(&source.id);
        let text = self.fetcher.fetch(&url).await?;
        let doc = CatalogDocument::from_json(&text)?;

        let groups = doc
            .groups
            .into_iter()
            .map(|group| {
                let records = group
                    .members
                    .into_iter()
                    .map(|m| m.into_record(&self.base))
                    .filter(|r| {
                        if !r.has_identity() {
                            log::warn!("skipping member without id or name in {}", source.id);
                        }
                        r.has_identity()
                    })
                    .collect();
                LoadedGroup {
                    title: group.title.unwrap_or_default(),
                    records,
                }
            })
            .collect();
        Ok(groups)
    }

    /// Load one source. Never fails: errors become [`SectionLoad::Failed`].
    pub async fn load_section(&self, source: &CatalogSource) -> SectionLoad {
        match self.fetch_groups(source).await {
            Ok(groups) => {
                debug::log(
                    cat::CATALOG,
                    format!("{}: {} group(s) loaded", source.id, groups.len()),
                );
                SectionLoad::Loaded(groups)
            }
            Err(e) => {
                log::error!("catalog source {} failed: {e}", source.id);
                SectionLoad::Failed {
                    message: failure_message(source),
                }
            }
        }
    }

    /// Load every source in order, handing each result to `install` together
    /// with its declaration index as soon as it is ready.
    pub async fn load_all<I>(&self, sources: &[CatalogSource], mut install: I)
    where
        I: FnMut(usize, &CatalogSource, SectionLoad),
    {
        for (index, source) in sources.iter().enumerate() {
            let load = self.load_section(source).await;
            install(index, source, load);
        }
    }
}

/// A rendered, activatable control bound to its record.
#[derive(Clone, Debug)]
pub struct CatalogControl {
    pub id: ControlId,
    pub record: Arc<EntityRecord>,
}

#[derive(Clone, Debug)]
pub struct RenderedGroup {
    pub title: String,
    pub controls: Vec<CatalogControl>,
}

#[derive(Clone, Debug)]
pub enum SectionState {
    Pending,
    Rendered(Vec<RenderedGroup>),
    Failed { message: String },
}

#[derive(Clone, Debug)]
pub struct CatalogSection {
    pub source: CatalogSource,
    pub state: SectionState,
}

/// The rendered catalog: every section in declaration order.
pub struct Catalog {
    sections: Vec<CatalogSection>,
    next_id: usize,
    generation: u64,
    rendered_tx: watch::Sender<u64>,
}

impl Catalog {
    pub fn new(sources: &[CatalogSource]) -> Self {
        let (rendered_tx, _) = watch::channel(0);
        Catalog {
            sections: sources
                .iter()
                .map(|s| CatalogSection {
                    source: s.clone(),
                    state: SectionState::Pending,
                })
                .collect(),
            next_id: 0,
            generation: 0,
            rendered_tx,
        }
    }

    /// Subscribe to "catalog rendered" notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rendered_tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sections(&self) -> &[CatalogSection] {
        &self.sections
    }

    /// Replace the section declared at `index`. Controls from a previous
    /// render of that section are dropped and their ids become invalid.
    ///
    /// Sections are keyed by position, not document path: two targets may
    /// render the same document.
    pub fn install(&mut self, index: usize, load: SectionLoad) -> bool {
        if index >= self.sections.len() {
            log::warn!("install for unknown catalog section #{index}");
            return false;
        }

        let state = match load {
            SectionLoad::Failed { message } => SectionState::Failed { message },
            SectionLoad::Loaded(groups) => SectionState::Rendered(
                groups
                    .into_iter()
                    .map(|g| RenderedGroup {
                        title: g.title,
                        controls: g
                            .records
                            .into_iter()
                            .map(|record| {
                                let id = ControlId(self.next_id);
                                self.next_id += 1;
                                CatalogControl {
                                    id,
                                    record: Arc::new(record),
                                }
                            })
                            .collect(),
                    })
                    .collect(),
            ),
        };
        self.sections[index].state = state;

        self.generation += 1;
        self.rendered_tx.send_replace(self.generation);
        debug::log(
            cat::CATALOG,
            format!(
                "installed {} into {}, generation {}",
                self.sections[index].source.id, self.sections[index].source.target, self.generation
            ),
        );
        true
    }

    /// Every rendered control in document order.
    pub fn controls(&self) -> impl Iterator<Item = &CatalogControl> {
        self.sections
            .iter()
            .flat_map(|s| match &s.state {
                SectionState::Rendered(groups) => groups.as_slice(),
                _ => <&[RenderedGroup]>::default(),
            })
            .flat_map(|g| g.controls.iter())
    }

    pub fn control(&self, id: ControlId) -> Option<&CatalogControl> {
        self.controls().find(|c| c.id == id)
    }

    pub fn record(&self, id: ControlId) -> Option<Arc<EntityRecord>> {
        self.control(id).map(|c| Arc::clone(&c.record))
    }

    /// Find a control whose identity equals `token` exactly. `id` is tried
    /// across the whole catalog first, then `name`, then `name_en`.
    pub fn find_by_identity(&self, token: &str) -> Option<ControlId> {
        if token.is_empty() {
            return None;
        }
        let fields: [fn(&EntityRecord) -> &str; 3] =
            [|r| r.id.as_str(), |r| r.name.as_str(), |r| r.name_en.as_str()];
        fields.iter().find_map(|field| {
            self.controls()
                .find(|c| field(&c.record) == token)
                .map(|c| c.id)
        })
    }

    pub fn view(&self) -> Vec<SectionView> {
        self.sections.iter().map(SectionView::from).collect()
    }
}

/// Serializable render state of one catalog section.
#[derive(Clone, Debug, Serialize)]
pub struct SectionView {
    pub source: String,
    pub target: String,
    pub status: &'static str,
    pub message: Option<String>,
    pub groups: Vec<GroupView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GroupView {
    pub title: String,
    pub controls: Vec<ControlView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ControlView {
    pub control: ControlId,
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub img: String,
    pub focus_y: String,
}

impl From<&CatalogSection> for SectionView {
    fn from(section: &CatalogSection) -> Self {
        let (status, message, groups) = match &section.state {
            SectionState::Pending => ("pending", None, Vec::new()),
            SectionState::Failed { message } => ("failed", Some(message.clone()), Vec::new()),
            SectionState::Rendered(groups) => (
                "rendered",
                None,
                groups
                    .iter()
                    .map(|g| GroupView {
                        title: g.title.clone(),
                        controls: g
                            .controls
                            .iter()
                            .map(|c| ControlView {
                                control: c.id,
                                id: c.record.id.clone(),
                                name: c.record.name.clone(),
                                name_en: c.record.name_en.clone(),
                                img: c.record.img.clone(),
                                focus_y: c.record.focus_y.clone(),
                            })
                            .collect(),
                    })
                    .collect(),
            ),
        };
        SectionView {
            source: section.source.id.clone(),
            target: section.source.target.clone(),
            status,
            message,
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, name: &str, name_en: &str) -> EntityRecord {
        EntityRecord {
            id: id.to_string(),
            name: name.to_string(),
            name_en: name_en.to_string(),
            ..EntityRecord::default()
        }
    }

    fn catalog_with(records: Vec<EntityRecord>) -> Catalog {
        let sources = vec![CatalogSource::new("data/a.json", "a")];
        let mut catalog = Catalog::new(&sources);
        catalog.install(
            0,
            SectionLoad::Loaded(vec![LoadedGroup {
                title: "Main".into(),
                records,
            }]),
        );
        catalog
    }

    #[test]
    fn test_find_prefers_id_over_name() {
        let catalog = catalog_with(vec![
            rec("", "aria", ""),
            rec("aria", "Someone Else", ""),
        ]);
        assert_eq!(catalog.find_by_identity("aria"), Some(ControlId(1)));
    }

    #[test]
    fn test_find_by_name_and_localized_name() {
        let catalog = catalog_with(vec![rec("a1", "アリア", "Aria")]);
        assert_eq!(catalog.find_by_identity("アリア"), Some(ControlId(0)));
        assert_eq!(catalog.find_by_identity("Aria"), Some(ControlId(0)));
        assert_eq!(catalog.find_by_identity("aria"), None);
        assert_eq!(catalog.find_by_identity(""), None);
    }

    #[test]
    fn test_reinstall_invalidates_old_ids() {
        let mut catalog = catalog_with(vec![rec("aria", "", "")]);
        assert!(catalog.control(ControlId(0)).is_some());
        catalog.install(
            0,
            SectionLoad::Loaded(vec![LoadedGroup {
                title: "Main".into(),
                records: vec![rec("aria", "", "")],
            }]),
        );
        assert!(catalog.control(ControlId(0)).is_none());
        assert_eq!(catalog.find_by_identity("aria"), Some(ControlId(1)));
        assert_eq!(catalog.generation(), 2);
    }

    #[test]
    fn test_install_publishes_generation() {
        let sources = vec![CatalogSource::new("data/a.json", "a")];
        let mut catalog = Catalog::new(&sources);
        let rx = catalog.subscribe();
        assert_eq!(*rx.borrow(), 0);
        catalog.install(0, SectionLoad::Failed { message: "x".into() });
        assert_eq!(*rx.borrow(), 1);
        assert!(!catalog.install(1, SectionLoad::Loaded(vec![])));
        assert_eq!(*rx.borrow(), 1);
    }

    #[test]
    fn test_targets_sharing_a_document_render_independently() {
        let sources = vec![
            CatalogSource::new("data/chars.json", "chars-a"),
            CatalogSource::new("data/chars.json", "chars-b"),
        ];
        let mut catalog = Catalog::new(&sources);
        for index in 0..sources.len() {
            let load = SectionLoad::Loaded(vec![LoadedGroup {
                title: "Main".into(),
                records: vec![rec("aria", "", "")],
            }]);
            assert!(catalog.install(index, load));
        }

        let statuses: Vec<_> = catalog
            .view()
            .into_iter()
            .map(|v| (v.target, v.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("chars-a".to_string(), "rendered"),
                ("chars-b".to_string(), "rendered"),
            ]
        );
        assert_eq!(catalog.controls().count(), 2);
        assert_eq!(catalog.find_by_identity("aria"), Some(ControlId(0)));
    }

    #[test]
    fn test_view_reports_failure() {
        let sources = vec![CatalogSource::new("data/a.json", "a")];
        let mut catalog = Catalog::new(&sources);
        assert_eq!(catalog.view()[0].status, "pending");
        catalog.install(
            0,
            SectionLoad::Failed {
                message: failure_message(&sources[0]),
            },
        );
        let view = catalog.view();
        assert_eq!(view[0].status, "failed");
        assert_eq!(
            view[0].message.as_deref(),
            Some("Could not load catalog data (data/a.json)")
        );
    }

    #[test]
    fn test_http_fetcher_joins_origin() {
        let f = HttpFetcher::with_origin("https://example.org/");
        assert_eq!(f.absolute("/roster/data.json"), "https://example.org/roster/data.json");
        assert_eq!(f.absolute("https://cdn.example/x.json"), "https://cdn.example/x.json");
        assert_eq!(HttpFetcher::new().absolute("/x.json"), "/x.json");
    }
}
