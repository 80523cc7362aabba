// Panel descriptor domain model
use super::dataset::Record;
use super::errors::{ConfigError, PanelFailure, RenderError};
use serde::{Deserialize, Serialize};

/// Field (or ordered fields, one per series) plotted on the y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YAccessor {
    Single(String),
    Multi(Vec<String>),
}

impl YAccessor {
    pub fn fields(&self) -> Vec<&str> {
        match self {
            YAccessor::Single(field) => vec![field.as_str()],
            YAccessor::Multi(fields) => fields.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Single(String),
    Palette(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushAxis {
    X,
    Y,
    Xy,
}

/// Pre-computed lower/upper bound fields drawn as a band around the series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfidenceBand {
    pub lower: String,
    pub upper: String,
}

impl Serialize for ConfidenceBand {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [&self.lower, &self.upper].serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Declared size, colour and brush of a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStyle {
    pub dimensions: Dimensions,
    pub color: Color,
    pub brush: BrushAxis,
}

/// An immutable, validated description of one chart panel.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDescriptor {
    title: String,
    target: String,
    source: String,
    x_accessor: String,
    y_accessor: YAccessor,
    legend: Option<Vec<String>>,
    legend_target: Option<String>,
    confidence_band: Option<ConfidenceBand>,
    dimensions: Dimensions,
    area: bool,
    color: Color,
    brush: BrushAxis,
}

impl PanelDescriptor {
    pub fn new(
        title: String,
        target: String,
        source: String,
        x_accessor: String,
        y_accessor: YAccessor,
        style: PanelStyle,
    ) -> Result<Self, ConfigError> {
        let PanelStyle {
            dimensions,
            color,
            brush,
        } = style;
        let empty = |field: &'static str| ConfigError::EmptyField {
            target: target.clone(),
            field,
        };

        if target.trim().is_empty() {
            return Err(empty("target"));
        }
        if title.trim().is_empty() {
            return Err(empty("title"));
        }
        if source.trim().is_empty() {
            return Err(empty("source"));
        }
        if x_accessor.trim().is_empty() {
            return Err(empty("x_accessor"));
        }
        let y_fields = y_accessor.fields();
        if y_fields.is_empty() || y_fields.iter().any(|f| f.trim().is_empty()) {
            return Err(empty("y_accessor"));
        }
        if dimensions.width == 0 || dimensions.height == 0 {
            return Err(ConfigError::InvalidDimensions { target });
        }

        Ok(Self {
            title,
            target,
            source,
            x_accessor,
            y_accessor,
            legend: None,
            legend_target: None,
            confidence_band: None,
            dimensions,
            area: false,
            color,
            brush,
        })
    }

    /// Attach legend labels; a multi-series panel needs one label per series.
    pub fn with_legend(mut self, legend: Vec<String>) -> Result<Self, ConfigError> {
        if let YAccessor::Multi(fields) = &self.y_accessor {
            let series = fields.len();
            if series != legend.len() {
                return Err(ConfigError::LegendLengthMismatch {
                    target: self.target.clone(),
                    series,
                    legend: legend.len(),
                });
            }
        }
        self.legend = Some(legend);
        Ok(self)
    }

    pub fn with_legend_target(mut self, legend_target: String) -> Result<Self, ConfigError> {
        if legend_target.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                target: self.target,
                field: "legend_target",
            });
        }
        self.legend_target = Some(legend_target);
        Ok(self)
    }

    pub fn with_confidence_band(mut self, band: ConfidenceBand) -> Result<Self, ConfigError> {
        if band.lower.trim().is_empty() || band.upper.trim().is_empty() || band.lower == band.upper {
            return Err(ConfigError::DegenerateBand {
                target: self.target,
            });
        }
        self.confidence_band = Some(band);
        Ok(self)
    }

    pub fn with_area(mut self, area: bool) -> Self {
        self.area = area;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn legend_target(&self) -> Option<&str> {
        self.legend_target.as_deref()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Every field the panel reads from a record.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.x_accessor.as_str()];
        fields.extend(self.y_accessor.fields());
        if let Some(band) = &self.confidence_band {
            fields.push(band.lower.as_str());
            fields.push(band.upper.as_str());
        }
        fields
    }

    /// Build the options bundle handed to the renderer.
    ///
    /// Fails if any record lacks a field the panel reads.
    pub fn options<'a>(&'a self, data: &'a [Record]) -> Result<RenderOptions<'a>, RenderError> {
        let fields = self.referenced_fields();
        for (record_index, record) in data.iter().enumerate() {
            if let Some(field) = fields.iter().find(|f| !record.contains_key(**f)) {
                return Err(RenderError::MissingField {
                    target: self.target.clone(),
                    field: field.to_string(),
                    record_index,
                });
            }
        }

        let Dimensions { width, height } = self.dimensions();
        Ok(RenderOptions {
            title: &self.title,
            data,
            width,
            height,
            area: self.area,
            color: &self.color,
            target: &self.target,
            x_accessor: &self.x_accessor,
            y_accessor: &self.y_accessor,
            brush: self.brush,
            legend: self.legend.as_deref(),
            legend_target: self.legend_target.as_deref(),
            show_confidence_band: self.confidence_band.as_ref(),
        })
    }
}

/// The fixed options shape of the external rendering call.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOptions<'a> {
    pub title: &'a str,
    pub data: &'a [Record],
    pub width: u32,
    pub height: u32,
    pub area: bool,
    pub color: &'a Color,
    pub target: &'a str,
    pub x_accessor: &'a str,
    pub y_accessor: &'a YAccessor,
    pub brush: BrushAxis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_target: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_confidence_band: Option<&'a ConfidenceBand>,
}

/// Lifecycle of a panel during one render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Pending,
    LoadingData,
    Rendered,
    Failed(PanelFailure),
}

impl PanelState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PanelState::Rendered | PanelState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            PanelState::Pending => "pending",
            PanelState::LoadingData => "loading-data",
            PanelState::Rendered => "rendered",
            PanelState::Failed(_) => "failed",
        }
    }
}
