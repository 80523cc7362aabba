use crate::application::page_catalog::{Page, PageCatalog};
use crate::application::panel_registry::PanelRegistry;
use crate::domain::errors::ConfigError;
use crate::domain::panel::{
    BrushAxis, Color, ConfidenceBand, Dimensions, PanelDescriptor, PanelStyle, YAccessor,
};
use crate::domain::source::DataSource;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub server: ServerSettings,
    pub data: DataSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSettings {
    /// Directory or base URL that relative source locations resolve against
    pub root: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PagesConfig {
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub pages: Vec<PageConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    pub location: String,
    pub date_field: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PageConfig {
    pub name: String,
    #[serde(default)]
    pub panels: Vec<PanelConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PanelConfig {
    pub title: String,
    pub target: String,
    pub source: String,
    pub x_accessor: String,
    pub y_accessor: YAccessor,
    pub legend: Option<Vec<String>>,
    pub legend_target: Option<String>,
    pub confidence_band: Option<ConfidenceBand>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub area: bool,
    pub color: Color,
    pub brush: BrushAxis,
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/server"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_pages_config() -> anyhow::Result<PagesConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/pages"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

impl SourceConfig {
    pub fn to_source(&self) -> DataSource {
        let source = DataSource::new(self.name.clone(), self.location.clone());
        match &self.date_field {
            Some(field) => source.with_date_field(field.clone()),
            None => source,
        }
    }
}

impl PanelConfig {
    pub fn to_descriptor(&self) -> Result<PanelDescriptor, ConfigError> {
        let mut panel = PanelDescriptor::new(
            self.title.clone(),
            self.target.clone(),
            self.source.clone(),
            self.x_accessor.clone(),
            self.y_accessor.clone(),
            PanelStyle {
                dimensions: Dimensions {
                    width: self.width,
                    height: self.height,
                },
                color: self.color.clone(),
                brush: self.brush,
            },
        )?
        .with_area(self.area);

        if let Some(legend) = &self.legend {
            panel = panel.with_legend(legend.clone())?;
        }
        if let Some(legend_target) = &self.legend_target {
            panel = panel.with_legend_target(legend_target.clone())?;
        }
        if let Some(band) = &self.confidence_band {
            panel = panel.with_confidence_band(band.clone())?;
        }

        Ok(panel)
    }
}

impl PagesConfig {
    /// Validate every page into its own registry. All pages see every declared source.
    pub fn build_catalog(&self) -> Result<PageCatalog, ConfigError> {
        let sources: Vec<DataSource> = self.sources.iter().map(SourceConfig::to_source).collect();

        let pages = self
            .pages
            .iter()
            .map(|page| -> Result<Page, ConfigError> {
                let panels = page
                    .panels
                    .iter()
                    .map(PanelConfig::to_descriptor)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Page {
                    name: page.name.clone(),
                    registry: PanelRegistry::new(sources.clone(), panels)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        PageCatalog::new(pages)
    }
}
