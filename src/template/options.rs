//! Rendering options.
//!
//! Every field has a default, so an empty YAML document is a valid
//! configuration:
//!
//! ```yaml
//! list_auto_size: text_to_fit_shape
//! list_word_wrap: true
//! markers:
//!   empty_list: "None"
//!   image_missing: "Image Missing: {name}"
//! ```

use crate::common::error::{Error, Result};
use crate::ooxml::pptx::shapes::AutoSize;
use serde::Deserialize;
use std::path::Path;

/// Text written in place of a placeholder that could not be resolved.
///
/// `{name}` in a template is replaced by the placeholder name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Markers {
    pub empty_list: String,
    pub image_missing: String,
    pub image_error: String,
    pub table_missing: String,
    pub table_error: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            empty_list: "None".to_string(),
            image_missing: "Image Missing: {name}".to_string(),
            image_error: "Image Error".to_string(),
            table_missing: "Table Missing: {name}".to_string(),
            table_error: "Table Error".to_string(),
        }
    }
}

impl Markers {
    /// Fill `{name}` in a marker template.
    pub fn render(template: &str, name: &str) -> String {
        template.replace("{name}", name)
    }
}

/// Options for a rendering pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Auto-fit mode written to a text frame after list expansion
    pub list_auto_size: AutoSize,
    /// Word wrap written to a text frame after list expansion
    pub list_word_wrap: bool,
    pub markers: Markers,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            list_auto_size: AutoSize::TextToFitShape,
            list_word_wrap: true,
            markers: Markers::default(),
        }
    }
}

impl RenderOptions {
    /// Parse options from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load options from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }
}
