// Application layer - Loading, dispatch and page use cases
pub mod chart_renderer;
pub mod dataset_cache;
pub mod dataset_fetcher;
pub mod loader;
pub mod page_catalog;
pub mod page_service;
pub mod panel_registry;
