// Page service - Use case for rendering one page in a fresh session
use crate::application::dataset_cache::DatasetCache;
use crate::application::dataset_fetcher::DatasetFetcher;
use crate::application::loader::Loader;
use crate::application::page_catalog::PageCatalog;
use crate::application::panel_registry::RenderReport;
use crate::domain::panel::PanelState;
use crate::infrastructure::mount_sink::MountSink;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct PageSummary {
    pub name: String,
    pub panels: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelStatus {
    pub target: String,
    pub title: String,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one page session: per-panel status plus what each mount received.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedPage {
    pub page: String,
    pub panels: Vec<PanelStatus>,
    pub mounts: BTreeMap<String, serde_json::Value>,
}

impl RenderedPage {
    fn new(page: String, report: RenderReport, mounts: BTreeMap<String, serde_json::Value>) -> Self {
        let panels = report
            .outcomes
            .into_iter()
            .map(|outcome| PanelStatus {
                target: outcome.target,
                title: outcome.title,
                state: outcome.state.label(),
                error: match &outcome.state {
                    PanelState::Failed(failure) => Some(failure.to_string()),
                    _ => None,
                },
            })
            .collect();

        Self {
            page,
            panels,
            mounts,
        }
    }
}

#[derive(Clone)]
pub struct PageService {
    fetcher: Arc<dyn DatasetFetcher>,
    catalog: Arc<PageCatalog>,
}

impl PageService {
    pub fn new(fetcher: Arc<dyn DatasetFetcher>, catalog: PageCatalog) -> Self {
        Self {
            fetcher,
            catalog: Arc::new(catalog),
        }
    }

    pub fn list_pages(&self) -> Vec<PageSummary> {
        self.catalog
            .pages()
            .iter()
            .map(|page| PageSummary {
                name: page.name.clone(),
                panels: page.registry.panels().len(),
            })
            .collect()
    }

    /// Render a page with its own dataset cache. `None` if the page is unknown.
    pub async fn render_page(&self, name: &str) -> Option<RenderedPage> {
        let page = self.catalog.get(name)?;

        let loader = Loader::new(self.fetcher.clone(), Arc::new(DatasetCache::new()));
        let sink = MountSink::new(page.registry.mount_points());
        let report = page.registry.render_all(&loader, &sink).await;

        tracing::info!(
            "Rendered page {}: {} rendered, {} failed",
            page.name,
            report.rendered_count(),
            report.failures().count()
        );

        Some(RenderedPage::new(
            page.name.clone(),
            report,
            sink.into_rendered(),
        ))
    }
}
