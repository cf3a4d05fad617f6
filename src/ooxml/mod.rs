//! Office Open XML (OOXML) document layer.
//!
//! Just enough of PresentationML to open a `.pptx`, walk and edit the
//! shapes on each slide, embed images, and save the result.
//!
//! # Architecture
//!
//! 1. **OPC Layer** (`opc`): Low-level package handling (ZIP, parts, relationships)
//! 2. **XML Tree** (`xml`): Mutable element tree that slide parts are edited through
//! 3. **PresentationML** (`pptx`): Presentations, slides, shapes, text frames and fonts
//!
//! # Example
//!
//! ```rust,no_run
//! use loquat::ooxml::pptx::Presentation;
//!
//! let bytes = std::fs::read("template.pptx")?;
//! let pres = Presentation::from_bytes(&bytes)?;
//! for slide in pres.slides() {
//!     for shape in slide.shapes() {
//!         println!("{}: {:?}", shape.name(), shape.text_frame().map(|tf| tf.text()));
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
pub mod error;
pub mod opc;
pub mod pptx;
pub mod xml;

pub use error::{OoxmlError, Result};
pub use opc::{OpcPackage, PackURI};
