/// Base shape types for PowerPoint presentations.
use crate::ooxml::pptx::shapes::textframe::TextFrame;
use crate::ooxml::xml::XmlElement;

/// Shape type enumeration.
///
/// Indicates what kind of element a member of the shape tree is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// An autoshape or text box (p:sp)
    Shape,
    /// A picture shape (p:pic)
    Picture,
    /// A graphic frame containing a table or chart (p:graphicFrame)
    GraphicFrame,
    /// A group shape (p:grpSp)
    GroupShape,
    /// A connector shape (p:cxnSp)
    Connector,
    /// Markup-compatibility wrapper (mc:AlternateContent)
    AlternateContent,
}

impl ShapeKind {
    /// Kind for a shape tree child, `None` for non-shape children such as
    /// `p:nvGrpSpPr`, `p:grpSpPr` or `p:extLst`.
    pub fn from_element(el: &XmlElement) -> Option<Self> {
        match el.local_name() {
            "sp" => Some(Self::Shape),
            "pic" => Some(Self::Picture),
            "graphicFrame" => Some(Self::GraphicFrame),
            "grpSp" => Some(Self::GroupShape),
            "cxnSp" => Some(Self::Connector),
            "AlternateContent" => Some(Self::AlternateContent),
            _ => None,
        }
    }
}

/// Position and size of a shape, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeFrame {
    /// X position (left edge)
    pub x: i64,
    /// Y position (top edge)
    pub y: i64,
    /// Width
    pub cx: i64,
    /// Height
    pub cy: i64,
}

impl ShapeFrame {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Read `a:off` and `a:ext` from an `a:xfrm` / `p:xfrm` element.
    pub fn from_xfrm(xfrm: &XmlElement) -> Option<Self> {
        let coord = |local: &str, attr: &str| -> Option<i64> {
            xfrm.child(local)?.attr(attr)?.parse::<i64>().ok()
        };

        Some(Self {
            x: coord("off", "x")?,
            y: coord("off", "y")?,
            cx: coord("ext", "cx")?,
            cy: coord("ext", "cy")?,
        })
    }
}

/// Reference from a placeholder shape to its counterpart on the layout or
/// master (`p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRef {
    /// `@type`, `obj` when absent
    pub kind: String,
    /// `@idx`, 0 when absent
    pub idx: u32,
}

/// A read-only view of one shape in a slide's shape tree.
///
/// `index` is the node position inside `p:spTree`; it stays valid while
/// shapes are only appended, which is what makes snapshot traversal safe.
#[derive(Debug, Clone, Copy)]
pub struct Shape<'a> {
    element: &'a XmlElement,
    kind: ShapeKind,
    index: usize,
}

impl<'a> Shape<'a> {
    pub fn new(element: &'a XmlElement, kind: ShapeKind, index: usize) -> Self {
        Self {
            element,
            kind,
            index,
        }
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn element(&self) -> &'a XmlElement {
        self.element
    }

    /// The `p:cNvPr` inside whichever non-visual properties block this
    /// shape kind uses (`p:nvSpPr`, `p:nvPicPr`, ...).
    fn c_nv_pr(&self) -> Option<&'a XmlElement> {
        self.element
            .elements()
            .find(|e| e.local_name().starts_with("nv"))
            .and_then(|nv| nv.child("cNvPr"))
    }

    /// The layout placeholder this shape inherits from, if it is one.
    pub fn placeholder(&self) -> Option<PlaceholderRef> {
        let ph = self
            .element
            .elements()
            .find(|e| e.local_name().starts_with("nv"))?
            .descendant(&["nvPr", "ph"])?;

        Some(PlaceholderRef {
            kind: ph.attr("type").unwrap_or("obj").to_string(),
            idx: ph
                .attr("idx")
                .and_then(|idx| atoi_simd::parse::<u32>(idx.as_bytes()).ok())
                .unwrap_or(0),
        })
    }

    /// Shape id from `p:cNvPr/@id`.
    pub fn id(&self) -> Option<u32> {
        self.c_nv_pr()
            .and_then(|c| c.attr("id"))
            .and_then(|id| atoi_simd::parse::<u32>(id.as_bytes()).ok())
    }

    /// Shape name from `p:cNvPr/@name`, empty when unnamed.
    pub fn name(&self) -> &'a str {
        self.c_nv_pr().and_then(|c| c.attr("name")).unwrap_or("")
    }

    /// Position and size, when the shape states them itself.
    ///
    /// Placeholder shapes that inherit their geometry from the layout
    /// return `None`.
    pub fn frame(&self) -> Option<ShapeFrame> {
        let xfrm = match self.kind {
            ShapeKind::GraphicFrame => self.element.child("xfrm"),
            ShapeKind::GroupShape => self.element.descendant(&["grpSpPr", "xfrm"]),
            _ => self.element.descendant(&["spPr", "xfrm"]),
        }?;
        ShapeFrame::from_xfrm(xfrm)
    }

    /// Whether this shape carries a text body.
    pub fn has_text_frame(&self) -> bool {
        self.text_frame().is_some()
    }

    /// The text frame of a `p:sp`; other shape kinds have none.
    pub fn text_frame(&self) -> Option<TextFrame<'a>> {
        if self.kind != ShapeKind::Shape {
            return None;
        }
        self.element.child("txBody").map(TextFrame::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_shape() {
        let el = XmlElement::parse_fragment(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="4" name="Title 3"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="838200" y="365125"/><a:ext cx="10515600" cy="1325563"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{{title}}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        )
        .unwrap();
        let kind = ShapeKind::from_element(&el).unwrap();
        let shape = Shape::new(&el, kind, 3);

        assert_eq!(shape.kind(), ShapeKind::Shape);
        assert_eq!(shape.id(), Some(4));
        assert_eq!(shape.name(), "Title 3");
        assert_eq!(shape.index(), 3);
        assert_eq!(
            shape.frame(),
            Some(ShapeFrame::new(838200, 365125, 10515600, 1325563))
        );
        assert_eq!(shape.text_frame().unwrap().text(), "{{title}}");
        assert_eq!(shape.placeholder(), None);
    }

    #[test]
    fn test_placeholder_ref() {
        let el = XmlElement::parse_fragment(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Content Placeholder 1"/><p:cNvSpPr/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody/></p:sp>"#,
        )
        .unwrap();
        let shape = Shape::new(&el, ShapeKind::Shape, 0);

        assert_eq!(
            shape.placeholder(),
            Some(PlaceholderRef {
                kind: "obj".to_string(),
                idx: 1
            })
        );
        assert_eq!(shape.frame(), None);
    }

    #[test]
    fn test_picture_has_no_text_frame() {
        let el = XmlElement::parse_fragment(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="7" name="Picture 6"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill/><p:spPr/></p:pic>"#,
        )
        .unwrap();
        let shape = Shape::new(&el, ShapeKind::Picture, 0);

        assert_eq!(shape.name(), "Picture 6");
        assert!(!shape.has_text_frame());
        assert_eq!(shape.frame(), None);
    }

    #[test]
    fn test_graphic_frame_geometry() {
        let el = XmlElement::parse_fragment(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="9" name="Table 8"/></p:nvGraphicFramePr><p:xfrm><a:off x="1" y="2"/><a:ext cx="3" cy="4"/></p:xfrm></p:graphicFrame>"#,
        )
        .unwrap();
        let shape = Shape::new(&el, ShapeKind::GraphicFrame, 0);
        assert_eq!(shape.frame(), Some(ShapeFrame::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_non_shape_children() {
        let el = XmlElement::new("p:nvGrpSpPr");
        assert_eq!(ShapeKind::from_element(&el), None);
    }
}
