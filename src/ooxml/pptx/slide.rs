/// Slides and their shape trees.
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::pptx::shapes::base::{PlaceholderRef, Shape, ShapeFrame, ShapeKind};
use crate::ooxml::pptx::shapes::textframe::TextFrameMut;
use crate::ooxml::xml::{XmlDocument, XmlElement};

/// A slide in a presentation.
///
/// Owns the parsed slide part. Shapes are addressed by their node index in
/// `p:cSld/p:spTree`; appending a shape never moves an existing one, and
/// [`Slide::remove_shapes`] is the only operation that does.
#[derive(Debug, Clone)]
pub struct Slide {
    partname: PackURI,
    document: XmlDocument,
    /// Geometry of the layout placeholders this slide's placeholders inherit
    inherited: Vec<(PlaceholderRef, ShapeFrame)>,
}

impl Slide {
    pub fn new(
        partname: PackURI,
        document: XmlDocument,
        inherited: Vec<(PlaceholderRef, ShapeFrame)>,
    ) -> Self {
        Self {
            partname,
            document,
            inherited,
        }
    }

    #[inline]
    pub fn partname(&self) -> &PackURI {
        &self.partname
    }

    #[inline]
    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    fn sp_tree(&self) -> Option<&XmlElement> {
        self.document.root().descendant(&["cSld", "spTree"])
    }

    fn sp_tree_mut(&mut self) -> Option<&mut XmlElement> {
        self.document.root_mut().descendant_mut(&["cSld", "spTree"])
    }

    /// Top-level shapes in z-order.
    pub fn shapes(&self) -> impl Iterator<Item = Shape<'_>> {
        self.sp_tree()
            .into_iter()
            .flat_map(|tree| tree.children().iter().enumerate())
            .filter_map(|(idx, node)| {
                let el = node.as_element()?;
                ShapeKind::from_element(el).map(|kind| Shape::new(el, kind, idx))
            })
    }

    /// Indices of the current shapes, for traversal that mutates the tree.
    pub fn shape_indices(&self) -> Vec<usize> {
        self.shapes().map(|s| s.index()).collect()
    }

    pub fn shape(&self, idx: usize) -> Option<Shape<'_>> {
        let el = self.sp_tree()?.element_at(idx)?;
        ShapeKind::from_element(el).map(|kind| Shape::new(el, kind, idx))
    }

    /// Position and size of a shape, falling back to the layout placeholder
    /// it inherits from when the shape states none itself.
    pub fn shape_frame(&self, shape: &Shape<'_>) -> Option<ShapeFrame> {
        shape.frame().or_else(|| {
            let ph = shape.placeholder()?;
            self.inherited
                .iter()
                .find(|(layout_ph, _)| layout_ph.idx == ph.idx)
                .or_else(|| self.inherited.iter().find(|(layout_ph, _)| layout_ph.kind == ph.kind))
                .map(|(_, frame)| *frame)
        })
    }

    /// Text frame of the `p:sp` at `idx`, for editing.
    pub fn text_frame_mut(&mut self, idx: usize) -> Option<TextFrameMut<'_>> {
        let el = self.sp_tree_mut()?.element_at_mut(idx)?;
        if ShapeKind::from_element(el) != Some(ShapeKind::Shape) {
            return None;
        }
        el.child_mut("txBody").map(TextFrameMut::new)
    }

    /// One more than the largest shape id anywhere on the slide.
    pub fn next_shape_id(&self) -> u32 {
        fn max_id(el: &XmlElement) -> u32 {
            let own = if el.is("cNvPr") {
                el.attr("id")
                    .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
                    .unwrap_or(0)
            } else {
                0
            };
            el.elements().map(max_id).fold(own, u32::max)
        }

        self.sp_tree().map(max_id).unwrap_or(0).saturating_add(1)
    }

    /// Whether the slide has a `p:cSld/p:spTree` to hold shapes.
    pub fn has_shape_tree(&self) -> bool {
        self.sp_tree().is_some()
    }

    /// Append a shape at the top of the z-order and return its index.
    ///
    /// Returns `None` when the slide has no shape tree.
    pub fn append_shape(&mut self, shape: XmlElement) -> Option<usize> {
        let tree = self.sp_tree_mut()?;
        let idx = tree.position("extLst").unwrap_or(tree.children().len());
        tree.insert(idx, shape);
        Some(idx)
    }

    /// Remove the shapes at the given indices.
    ///
    /// Indices are processed from highest to lowest so each one still
    /// refers to the node it named when it was recorded.
    pub fn remove_shapes(&mut self, indices: &[usize]) -> usize {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();

        let Some(tree) = self.sp_tree_mut() else {
            return 0;
        };
        sorted
            .into_iter()
            .filter_map(|idx| tree.remove(idx))
            .count()
    }

    /// Declare the `r:` prefix on the slide root if it is missing, so
    /// generated `r:embed` attributes resolve.
    pub fn ensure_relationships_namespace(&mut self) {
        let root = self.document.root_mut();
        if root.attr("xmlns:r").is_none() {
            root.set_attr("xmlns:r", namespace::OFC_RELATIONSHIPS);
        }
    }

    /// Serialized slide XML.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.document.to_bytes()
    }
}

/// Placeholders of a layout or master part with their stated geometry.
pub(crate) fn placeholder_frames(doc: &XmlDocument) -> Vec<(PlaceholderRef, Option<ShapeFrame>)> {
    let Some(tree) = doc.root().descendant(&["cSld", "spTree"]) else {
        return Vec::new();
    };

    tree.elements()
        .filter_map(|el| {
            let shape = Shape::new(el, ShapeKind::from_element(el)?, 0);
            Some((shape.placeholder()?, shape.frame()))
        })
        .collect()
}
