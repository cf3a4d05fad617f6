//! Placeholder templating for presentations.
//!
//! Templates carry tokens such as `{{client}}`, `{{list:items}}` or
//! `{{image:logo}}` in their text. [`extract_placeholders`] lists them;
//! [`Renderer`] replaces them with data:
//!
//! - `text` / `choice`: the value's string form, replaced inside the run so
//!   formatting survives
//! - `list`: one paragraph per item, styled like the placeholder paragraph
//! - `image` / `scrape`: a picture at the placeholder shape's bounds
//! - `table`: a table at the placeholder shape's bounds
//!
//! Missing or unusable data never fails a render; the affected shape shows
//! a marker such as `Image Missing: logo` instead.

pub mod assets;
pub mod data;
pub mod extract;
pub mod lifecycle;
pub mod options;
pub mod placeholder;
pub mod render;
pub mod report;
pub mod strategy;

pub use assets::{AssetResolver, DirectoryAssets, MemoryAssets, NoAssets};
pub use data::TemplateData;
pub use extract::{collect_placeholders, extract_placeholders};
pub use lifecycle::ShapeLifecycle;
pub use options::{Markers, RenderOptions};
pub use placeholder::{Placeholder, PlaceholderKind, Token, tokenize};
pub use render::{Rendered, Renderer, render};
pub use report::{Outcome, RenderReport, ReportEntry};
pub use strategy::{DrawingTableBuilder, TableBuilder};
