/// Error type for permission catalog lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown permission: {0}")]
    UnknownPermission(String),
}

impl CatalogError {
    pub fn unknown(id: impl Into<String>) -> Self {
        Self::UnknownPermission(id.into())
    }
}
