//! PowerPoint (.pptx) presentation support.
//!
//! Just enough of PresentationML to find text in slides and edit it in
//! place:
//!
//! - [`Presentation`]: the opened package and its slides, in `p:sldIdLst`
//!   order
//! - [`Slide`]: one slide's shape tree, addressed by node index
//! - [`shapes`]: read-only and mutable views of shapes, text frames,
//!   paragraphs and runs, plus builders for picture and table shapes
//! - [`MediaSink`]: image parts added while editing a slide
//!
//! # Example
//!
//! ```rust,no_run
//! use loquat::ooxml::pptx::Presentation;
//!
//! let bytes = std::fs::read("deck.pptx")?;
//! let pres = Presentation::from_bytes(&bytes)?;
//! for slide in pres.slides() {
//!     for shape in slide.shapes() {
//!         if let Some(tf) = shape.text_frame() {
//!             println!("{}: {}", shape.name(), tf.text());
//!         }
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod format;
pub mod media;
pub mod presentation;
pub mod shapes;
pub mod slide;

pub use format::ImageFormat;
pub use media::MediaSink;
pub use presentation::Presentation;
pub use slide::Slide;
