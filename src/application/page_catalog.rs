// Page catalog - Independent descriptor lists rendered as a unit
use crate::application::panel_registry::PanelRegistry;
use crate::domain::errors::ConfigError;

#[derive(Debug, Clone)]
pub struct Page {
    pub name: String,
    pub registry: PanelRegistry,
}

#[derive(Debug, Clone, Default)]
pub struct PageCatalog {
    pages: Vec<Page>,
}

impl PageCatalog {
    pub fn new(pages: Vec<Page>) -> Result<Self, ConfigError> {
        for (index, page) in pages.iter().enumerate() {
            if pages[..index].iter().any(|p| p.name == page.name) {
                return Err(ConfigError::DuplicatePage(page.name.clone()));
            }
        }
        Ok(Self { pages })
    }

    pub fn get(&self, name: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.name == name)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}
