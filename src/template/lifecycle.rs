//! Deferred removal of shapes during a slide pass.

use crate::ooxml::pptx::Slide;

/// Shapes scheduled for removal from one slide.
///
/// Marking never touches the slide, so shape indices recorded before the
/// pass stay valid until [`ShapeLifecycle::commit`] runs after the last
/// shape has been visited.
#[derive(Debug, Default)]
pub struct ShapeLifecycle {
    pending: Vec<usize>,
}

impl ShapeLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule the shape at `index` for removal.
    pub fn mark(&mut self, index: usize) {
        if !self.pending.contains(&index) {
            self.pending.push(index);
        }
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.pending.contains(&index)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Remove every marked shape and return how many were removed.
    pub fn commit(self, slide: &mut Slide) -> usize {
        slide.remove_shapes(&self.pending)
    }
}
