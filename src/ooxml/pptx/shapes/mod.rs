/// Shapes module for PowerPoint presentations.
///
/// This module provides types for working with shapes on slides, including:
/// - Text shapes with text frames, paragraphs and runs
/// - Character formatting (fonts and colours)
/// - Markup for inserted pictures and tables
pub mod base;
pub mod font;
pub mod paragraph;
pub mod picture;
pub mod table;
pub mod textframe;

pub use base::{PlaceholderRef, Shape, ShapeFrame, ShapeKind};
pub use font::{ColorFormat, Font};
pub use paragraph::{Paragraph, ParagraphMut, Run, RunMut, clone_paragraph_properties};
pub use textframe::{AutoSize, TextFrame, TextFrameMut};
