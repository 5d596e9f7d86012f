//! Store configuration.
//!
//! ```yaml
//! page_rows: 32
//! max_pages: 8
//! read_only: false
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Default number of rows per lazily allocated page.
pub const DEFAULT_PAGE_ROWS: u32 = 64;

/// Settings for a [`PixelStore`](crate::PixelStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Rows per page. Must be positive.
    pub page_rows: u32,
    /// Maximum number of resident pages, `None` for unlimited.
    pub max_pages: Option<usize>,
    /// Reject every write.
    pub read_only: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            page_rows: DEFAULT_PAGE_ROWS,
            max_pages: None,
            read_only: false,
        }
    }
}

impl CacheConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CacheError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Loads configuration from a YAML string and validates it.
    pub fn from_yaml_str(yaml: &str) -> CacheResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> CacheResult<()> {
        if self.page_rows == 0 {
            return Err(CacheError::invalid_config("page_rows must be positive"));
        }
        if self.max_pages == Some(0) {
            return Err(CacheError::invalid_config("max_pages must be positive when set"));
        }
        Ok(())
    }

    /// Sets rows per page.
    pub fn with_page_rows(mut self, rows: u32) -> Self {
        self.page_rows = rows;
        self
    }

    /// Limits the number of resident pages.
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages);
        self
    }

    /// Makes the store reject writes.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}
