// Renderer trait - boundary to the external charting library
use crate::domain::errors::RenderError;
use crate::domain::panel::RenderOptions;

pub trait ChartRenderer: Send + Sync {
    /// Draw one panel into the mount point named by `options.target`
    fn render(&self, options: &RenderOptions<'_>) -> Result<(), RenderError>;
}
