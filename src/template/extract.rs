//! Placeholder discovery.

use crate::common::error::Result;
use crate::ooxml::pptx::Presentation;
use crate::template::placeholder::{Placeholder, tokens};
use std::collections::BTreeSet;
use tracing::debug;

/// Open a template and list the distinct placeholders it contains, sorted
/// by name.
///
/// Fails with [`crate::Error::MalformedDocument`] when the bytes are not a
/// presentation.
pub fn extract_placeholders(template: &[u8]) -> Result<Vec<Placeholder>> {
    let pres = Presentation::from_bytes(template)?;
    Ok(collect_placeholders(&pres))
}

/// Distinct placeholders of an opened presentation, sorted by name.
///
/// Slides, shapes and paragraphs are visited in document order; shapes
/// without a text frame are skipped.
pub fn collect_placeholders(pres: &Presentation) -> Vec<Placeholder> {
    let mut found = BTreeSet::new();

    for (number, slide) in pres.slides().iter().enumerate() {
        for shape in slide.shapes() {
            let Some(frame) = shape.text_frame() else {
                continue;
            };
            for paragraph in frame.paragraphs() {
                let text = paragraph.text();
                for token in tokens(&text) {
                    if found.insert(token.to_placeholder()) {
                        debug!(
                            slide = number + 1,
                            shape = shape.name(),
                            name = token.name,
                            kind = %token.kind(),
                            "found placeholder"
                        );
                    }
                }
            }
        }
    }

    found.into_iter().collect()
}
