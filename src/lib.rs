//! Loquat - placeholder templating for PowerPoint (.pptx) presentations
//!
//! Templates are ordinary presentations whose text contains tokens such as
//! `{{client}}`, `{{list:agenda}}`, `{{image:logo}}` or `{{table:figures}}`.
//! Loquat finds those tokens and fills them in from a JSON data mapping,
//! keeping the fonts, colours and bullet formatting of the template.
//!
//! # Features
//!
//! - **Placeholder discovery**: list every distinct `(name, type)` pair in a
//!   template
//! - **Format-preserving text substitution**: tokens are replaced inside
//!   their run; tokens split across runs are recovered
//! - **List expansion**: one paragraph per item with cloned bullet formatting
//! - **Images and tables**: placeholder shapes replaced at the same bounds
//! - **Self-contained OOXML codec**: OPC package, XML tree and
//!   PresentationML model with byte-preserving round trips of untouched parts
//!
//! # Example - Listing placeholders
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = std::fs::read("template.pptx")?;
//! for placeholder in loquat::extract_placeholders(&template)? {
//!     println!("{} ({})", placeholder.name, placeholder.kind);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Rendering
//!
//! ```no_run
//! use loquat::{DirectoryAssets, Renderer, TemplateData};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let template = std::fs::read("template.pptx")?;
//! let data = TemplateData::from_json_str(
//!     r#"{"client": "Acme", "agenda": ["Intro", "Numbers"], "logo": "acme.png"}"#,
//! )?;
//! let assets = DirectoryAssets::new("uploads");
//!
//! let rendered = Renderer::new(&assets).render(&template, &data)?;
//! for marker in rendered.report.markers() {
//!     eprintln!("slide {}: {:?}", marker.slide, marker.outcome);
//! }
//! std::fs::write("output.pptx", rendered.bytes)?;
//! # Ok(())
//! # }
//! ```

/// Shared error type and XML helpers
pub mod common;

/// OOXML (Office Open XML) package and PresentationML model
///
/// This module provides the document codec the template engine works on:
/// opening a `.pptx`, editing slides in memory and writing it back.
pub mod ooxml;

/// Placeholder discovery and substitution
pub mod template;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use template::{
    AssetResolver, DirectoryAssets, MemoryAssets, Placeholder, PlaceholderKind, RenderOptions,
    RenderReport, Rendered, Renderer, TemplateData, extract_placeholders, render,
};
