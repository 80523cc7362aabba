// Mount sink - ChartRenderer that keeps each panel's options bundle per mount point
use crate::application::chart_renderer::ChartRenderer;
use crate::domain::errors::RenderError;
use crate::domain::panel::RenderOptions;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

pub struct MountSink {
    mounts: HashSet<String>,
    rendered: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MountSink {
    /// A sink that accepts only the given mount points.
    pub fn new<'a>(mounts: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            mounts: mounts.into_iter().map(str::to_string).collect(),
            rendered: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn into_rendered(self) -> BTreeMap<String, serde_json::Value> {
        self.rendered
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChartRenderer for MountSink {
    fn render(&self, options: &RenderOptions<'_>) -> Result<(), RenderError> {
        if !self.mounts.contains(options.target) {
            return Err(RenderError::UnknownMount(options.target.to_string()));
        }
        if let Some(legend_target) = options.legend_target {
            if !self.mounts.contains(legend_target) {
                return Err(RenderError::UnknownMount(legend_target.to_string()));
            }
        }

        let backend = |reason: String| RenderError::Backend {
            target: options.target.to_string(),
            reason,
        };

        let bundle = serde_json::to_value(options).map_err(|e| backend(e.to_string()))?;
        self.rendered
            .lock()
            .map_err(|e| backend(e.to_string()))?
            .insert(options.target.to_string(), bundle);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Dataset;
    use crate::domain::panel::{
        BrushAxis, Color, Dimensions, PanelDescriptor, PanelStyle, YAccessor,
    };
    use serde_json::json;

    fn location_panel() -> PanelDescriptor {
        PanelDescriptor::new(
            "Job locations".to_string(),
            "#location".to_string(),
            "by_year".to_string(),
            "group".to_string(),
            YAccessor::Multi(vec!["nloc_london".to_string(), "nloc_wales".to_string()]),
            PanelStyle {
                dimensions: Dimensions {
                    width: 950,
                    height: 300,
                },
                color: Color::Palette(vec!["#2155a8".to_string(), "#FF8C00".to_string()]),
                brush: BrushAxis::X,
            },
        )
        .unwrap()
        .with_legend(vec!["London".to_string(), "Wales".to_string()])
        .unwrap()
        .with_legend_target(".legend".to_string())
        .unwrap()
    }

    fn dataset() -> Dataset {
        Dataset::from_json(
            "by_year",
            json!([{"group": "2018", "nloc_london": 12, "nloc_wales": 3}]),
        )
        .unwrap()
    }

    #[test]
    fn test_bundle_is_stored_under_target() {
        let sink = MountSink::new(["#location", ".legend"]);
        let panel = location_panel();
        let dataset = dataset();

        sink.render(&panel.options(&dataset.records).unwrap()).unwrap();

        let rendered = sink.into_rendered();
        let bundle = &rendered["#location"];
        assert_eq!(bundle["width"], json!(950));
        assert_eq!(bundle["height"], json!(300));
        assert_eq!(bundle["legend"], json!(["London", "Wales"]));
        assert_eq!(bundle["legend_target"], json!(".legend"));
    }

    #[test]
    fn test_unknown_mounts_are_rejected() {
        let panel = location_panel();
        let dataset = dataset();
        let options = panel.options(&dataset.records).unwrap();

        let sink = MountSink::new(["#njobsyear"]);
        assert_eq!(
            sink.render(&options),
            Err(RenderError::UnknownMount("#location".to_string()))
        );

        let sink = MountSink::new(["#location"]);
        assert_eq!(
            sink.render(&options),
            Err(RenderError::UnknownMount(".legend".to_string()))
        );
        assert!(sink.into_rendered().is_empty());
    }
}
