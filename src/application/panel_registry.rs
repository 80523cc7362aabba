// Panel registry - Validated descriptor list and render dispatch
use crate::application::chart_renderer::ChartRenderer;
use crate::application::loader::Loader;
use crate::domain::errors::{ConfigError, PanelFailure};
use crate::domain::panel::{PanelDescriptor, PanelState};
use crate::domain::source::DataSource;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct PanelRegistry {
    sources: Vec<DataSource>,
    panels: Vec<PanelDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelOutcome {
    pub target: String,
    pub title: String,
    pub state: PanelState,
}

/// Terminal state of every panel, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub outcomes: Vec<PanelOutcome>,
}

impl RenderReport {
    pub fn rendered_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == PanelState::Rendered)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PanelFailure)> {
        self.outcomes.iter().filter_map(|o| match &o.state {
            PanelState::Failed(failure) => Some((o.target.as_str(), failure)),
            _ => None,
        })
    }
}

impl PanelRegistry {
    pub fn new(
        sources: Vec<DataSource>,
        panels: Vec<PanelDescriptor>,
    ) -> Result<Self, ConfigError> {
        let mut source_names = HashSet::new();
        for source in &sources {
            if !source_names.insert(source.name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.name.clone()));
            }
        }

        let mut mounts = HashSet::new();
        for panel in &panels {
            if !source_names.contains(panel.source()) {
                return Err(ConfigError::UnknownSource {
                    target: panel.target().to_string(),
                    source_name: panel.source().to_string(),
                });
            }
            for mount in std::iter::once(panel.target()).chain(panel.legend_target()) {
                if !mounts.insert(mount) {
                    return Err(ConfigError::DuplicateTarget(mount.to_string()));
                }
            }
        }

        Ok(Self { sources, panels })
    }

    pub fn panels(&self) -> &[PanelDescriptor] {
        &self.panels
    }

    /// Every mount point the registry writes into: targets and legend targets.
    pub fn mount_points(&self) -> Vec<&str> {
        self.panels
            .iter()
            .flat_map(|p| std::iter::once(p.target()).chain(p.legend_target()))
            .collect()
    }

    /// Panels grouped by source, in order of first appearance.
    fn groups(&self) -> Vec<(&DataSource, Vec<usize>)> {
        let mut groups: Vec<(&DataSource, Vec<usize>)> = Vec::new();
        for (index, panel) in self.panels.iter().enumerate() {
            match groups.iter_mut().find(|(s, _)| s.name == panel.source()) {
                Some((_, indexes)) => indexes.push(index),
                None => {
                    // Checked in `new`.
                    if let Some(source) = self.sources.iter().find(|s| s.name == panel.source()) {
                        groups.push((source, vec![index]));
                    }
                }
            }
        }
        groups
    }

    /// Load every referenced source once and render its panels as soon as it resolves.
    ///
    /// Panels of one source render in registry order. A failed panel never
    /// stops its siblings.
    pub async fn render_all(&self, loader: &Loader, renderer: &dyn ChartRenderer) -> RenderReport {
        let mut states = vec![PanelState::Pending; self.panels.len()];
        let groups = self.groups();

        for (_, indexes) in &groups {
            for &index in indexes {
                self.transition(&mut states, index, PanelState::LoadingData);
            }
        }

        let mut loads: FuturesUnordered<_> = groups
            .into_iter()
            .map(move |(source, indexes)| async move { (indexes, loader.load(source).await) })
            .collect();

        while let Some((indexes, result)) = loads.next().await {
            for index in indexes {
                let panel = &self.panels[index];
                let next = match &result {
                    Ok(dataset) => match panel
                        .options(&dataset.records)
                        .and_then(|options| renderer.render(&options))
                    {
                        Ok(()) => PanelState::Rendered,
                        Err(e) => PanelState::Failed(e.into()),
                    },
                    Err(e) => PanelState::Failed(e.clone().into()),
                };
                self.transition(&mut states, index, next);
            }
        }

        let outcomes = self
            .panels
            .iter()
            .zip(states)
            .map(|(panel, state)| PanelOutcome {
                target: panel.target().to_string(),
                title: panel.title().to_string(),
                state,
            })
            .collect();

        RenderReport { outcomes }
    }

    fn transition(&self, states: &mut [PanelState], index: usize, next: PanelState) {
        let target = self.panels[index].target();
        debug_assert!(!states[index].is_terminal(), "panel {} already settled", target);
        if let PanelState::Failed(failure) = &next {
            tracing::warn!("Panel {} failed: {}", target, failure);
        } else {
            tracing::debug!("Panel {}: {} -> {}", target, states[index].label(), next.label());
        }
        states[index] = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dataset_cache::DatasetCache;
    use crate::application::dataset_fetcher::DatasetFetcher;
    use crate::domain::errors::{FetchError, RenderError};
    use crate::domain::panel::{
        BrushAxis, Color, Dimensions, PanelStyle, RenderOptions, YAccessor,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct CountingFetcher {
        payloads: HashMap<String, serde_json::Value>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(payloads: Vec<(&str, serde_json::Value)>) -> Self {
            Self {
                payloads: payloads
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value))
                    .collect(),
                calls: Mutex::new(HashMap::new()),
                total: AtomicUsize::new(0),
            }
        }

        fn calls_for(&self, name: &str) -> usize {
            self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl DatasetFetcher for CountingFetcher {
        async fn fetch(&self, source: &DataSource) -> Result<serde_json::Value, FetchError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            *self
                .calls
                .lock()
                .unwrap()
                .entry(source.name.clone())
                .or_default() += 1;
            tokio::task::yield_now().await;
            self.payloads
                .get(&source.name)
                .cloned()
                .ok_or_else(|| FetchError::Unreachable {
                    source_name: source.name.clone(),
                    location: source.location.clone(),
                    reason: "connection refused".to_string(),
                })
        }
    }

    /// Records every options bundle it is handed, as JSON.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<serde_json::Value>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, options: &RenderOptions<'_>) -> Result<(), RenderError> {
            let value = serde_json::to_value(options).map_err(|e| RenderError::Backend {
                target: options.target.to_string(),
                reason: e.to_string(),
            })?;
            self.calls.lock().unwrap().push(value);
            Ok(())
        }
    }

    fn panel(target: &str, source: &str, y: &str) -> PanelDescriptor {
        PanelDescriptor::new(
            format!("Panel {}", target),
            target.to_string(),
            source.to_string(),
            "group".to_string(),
            YAccessor::Single(y.to_string()),
            PanelStyle {
                dimensions: Dimensions {
                    width: 450,
                    height: 250,
                },
                color: Color::Single("#2155a8".to_string()),
                brush: BrushAxis::X,
            },
        )
        .unwrap()
    }

    fn sources() -> Vec<DataSource> {
        vec![
            DataSource::new("by_year".to_string(), "by_year.json".to_string()),
            DataSource::new("by_month".to_string(), "by_month.json".to_string())
                .with_date_field("group".to_string()),
        ]
    }

    fn loader(fetcher: Arc<CountingFetcher>) -> Loader {
        Loader::new(fetcher, Arc::new(DatasetCache::new()))
    }

    #[test]
    fn test_registry_rejects_duplicate_targets_and_unknown_sources() {
        let err = PanelRegistry::new(
            sources(),
            vec![
                panel("#njobsyear", "by_year", "npos"),
                panel("#njobsyear", "by_year", "proportion_pos"),
            ],
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateTarget("#njobsyear".to_string()));

        let err = PanelRegistry::new(sources(), vec![panel("#trainjobs", "training", "total")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownSource { .. }));

        let mut doubled = sources();
        doubled.push(DataSource::new("by_year".to_string(), "other.json".to_string()));
        let err = PanelRegistry::new(doubled, vec![]).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateSource("by_year".to_string()));
    }

    #[tokio::test]
    async fn test_by_year_panel_receives_records_unmodified() {
        let records = json!([{"group": "2018", "npos": 10}, {"group": "2019", "npos": 20}]);
        let fetcher = Arc::new(CountingFetcher::new(vec![("by_year", records.clone())]));
        let registry =
            PanelRegistry::new(sources(), vec![panel("#njobsyear", "by_year", "npos")]).unwrap();
        let renderer = RecordingRenderer::default();

        let report = registry.render_all(&loader(fetcher), &renderer).await;

        assert_eq!(report.rendered_count(), 1);
        let calls = renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["data"], records);
        assert_eq!(calls[0]["y_accessor"], json!("npos"));
        assert_eq!(calls[0]["x_accessor"], json!("group"));
        assert_eq!(calls[0]["width"], json!(450));
    }

    #[tokio::test]
    async fn test_shared_source_is_fetched_once() {
        let fetcher = Arc::new(CountingFetcher::new(vec![(
            "by_year",
            json!([{"group": "2018", "npos": 10, "proportion_pos": 0.1}]),
        )]));
        let registry = PanelRegistry::new(
            sources(),
            vec![
                panel("#njobsyear", "by_year", "npos"),
                panel("#propjobsyear", "by_year", "proportion_pos"),
            ],
        )
        .unwrap();
        let renderer = RecordingRenderer::default();
        let loader = loader(fetcher.clone());

        let (first, second) = tokio::join!(
            registry.render_all(&loader, &renderer),
            registry.render_all(&loader, &renderer)
        );

        assert_eq!(first.rendered_count(), 2);
        assert_eq!(second.rendered_count(), 2);
        assert_eq!(fetcher.calls_for("by_year"), 1);
        assert_eq!(fetcher.total.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panels_of_one_source_render_in_registry_order() {
        let fetcher = Arc::new(CountingFetcher::new(vec![(
            "by_year",
            json!([{"group": "2018", "npos": 10, "njob_match": 2, "proportion_pos": 0.1}]),
        )]));
        let registry = PanelRegistry::new(
            sources(),
            vec![
                panel("#njobsyear", "by_year", "npos"),
                panel("#njobsmatch", "by_year", "njob_match"),
                panel("#propjobsyear", "by_year", "proportion_pos"),
            ],
        )
        .unwrap();
        let renderer = RecordingRenderer::default();

        registry.render_all(&loader(fetcher), &renderer).await;

        let targets: Vec<String> = renderer
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c["target"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(targets, vec!["#njobsyear", "#njobsmatch", "#propjobsyear"]);
    }

    #[tokio::test]
    async fn test_failures_stay_with_their_panel_or_source() {
        let fetcher = Arc::new(CountingFetcher::new(vec![(
            "by_year",
            json!([{"group": "2018", "npos": 10}]),
        )]));
        let registry = PanelRegistry::new(
            sources(),
            vec![
                panel("#njobsyear", "by_year", "npos"),
                panel("#meansalary", "by_year", "salary_mean_pos"),
                panel("#njobsmonth", "by_month", "npos"),
            ],
        )
        .unwrap();
        let renderer = RecordingRenderer::default();

        let report = registry.render_all(&loader(fetcher), &renderer).await;

        assert_eq!(report.outcomes[0].state, PanelState::Rendered);
        assert!(matches!(
            report.outcomes[1].state,
            PanelState::Failed(PanelFailure::Render(RenderError::MissingField { .. }))
        ));
        assert!(matches!(
            report.outcomes[2].state,
            PanelState::Failed(PanelFailure::Fetch(FetchError::Unreachable { .. }))
        ));
        assert_eq!(report.failures().count(), 2);
        assert_eq!(renderer.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_month_renders_empty_dataset() {
        let fetcher = Arc::new(CountingFetcher::new(vec![(
            "by_month",
            json!([{"group": "2020-01", "total": 5}]),
        )]));
        let registry =
            PanelRegistry::new(sources(), vec![panel("#njobsmonth", "by_month", "total")]).unwrap();
        let renderer = RecordingRenderer::default();

        let report = registry.render_all(&loader(fetcher), &renderer).await;

        assert_eq!(report.outcomes[0].state, PanelState::Rendered);
        assert_eq!(renderer.calls.lock().unwrap()[0]["data"], json!([]));
    }

    #[test]
    fn test_mount_points_include_legend_targets() {
        let location = panel("#location", "by_year", "nloc_london")
            .with_legend_target(".legend".to_string())
            .unwrap();
        let registry =
            PanelRegistry::new(sources(), vec![panel("#njobsyear", "by_year", "npos"), location])
                .unwrap();

        assert_eq!(
            registry.mount_points(),
            vec!["#njobsyear", "#location", ".legend"]
        );
    }
}
