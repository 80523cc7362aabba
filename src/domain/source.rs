// Data source domain model

/// A named JSON dataset backing one or more panels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSource {
    pub name: String,
    pub location: String,
    /// Column parsed from string to date before the data reaches any panel.
    pub date_field: Option<String>,
}

impl DataSource {
    pub fn new(name: String, location: String) -> Self {
        Self {
            name,
            location,
            date_field: None,
        }
    }

    pub fn with_date_field(mut self, field: String) -> Self {
        self.date_field = Some(field);
        self
    }

    pub fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }
}
