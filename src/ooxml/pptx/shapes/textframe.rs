//! Text frame for accessing and editing the text body of a shape.

use crate::ooxml::pptx::shapes::paragraph::{Paragraph, ParagraphMut};
use crate::ooxml::xml::XmlElement;
use serde::Deserialize;

/// Auto-fit children of `a:bodyPr`; at most one may be present.
const AUTOFIT_ELEMENTS: &[&str] = &["noAutofit", "normAutofit", "spAutoFit"];

/// `a:bodyPr` children that follow the auto-fit choice in schema order.
const AFTER_AUTOFIT: &[&str] = &["scene3d", "sp3d", "flatTx", "extLst"];

/// How a text frame reconciles its text with the shape's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoSize {
    /// No auto-fit element; inherited from the layout
    #[default]
    None,
    /// `a:spAutoFit`: the shape grows to fit its text
    ShapeToFitText,
    /// `a:normAutofit`: the text shrinks to fit the shape
    TextToFitShape,
    /// `a:noAutofit`: text may overflow
    NoAutofit,
}

impl AutoSize {
    fn element_name(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::ShapeToFitText => Some("a:spAutoFit"),
            Self::TextToFitShape => Some("a:normAutofit"),
            Self::NoAutofit => Some("a:noAutofit"),
        }
    }

    fn from_body_pr(body_pr: &XmlElement) -> Self {
        body_pr
            .elements()
            .find_map(|e| match e.local_name() {
                "spAutoFit" => Some(Self::ShapeToFitText),
                "normAutofit" => Some(Self::TextToFitShape),
                "noAutofit" => Some(Self::NoAutofit),
                _ => None,
            })
            .unwrap_or(Self::None)
    }
}

/// A read-only view of a `p:txBody`.
#[derive(Debug, Clone, Copy)]
pub struct TextFrame<'a> {
    body: &'a XmlElement,
}

impl<'a> TextFrame<'a> {
    pub fn new(body: &'a XmlElement) -> Self {
        Self { body }
    }

    /// Paragraphs in document order.
    pub fn paragraphs(self) -> impl Iterator<Item = Paragraph<'a>> {
        self.body.elements().filter(|e| e.is("p")).map(Paragraph::new)
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Paragraph texts joined with `\n`.
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn auto_size(&self) -> AutoSize {
        self.body
            .child("bodyPr")
            .map(AutoSize::from_body_pr)
            .unwrap_or_default()
    }

    /// `Some(true)` for `wrap="square"`, `Some(false)` for `wrap="none"`,
    /// `None` when inherited.
    pub fn word_wrap(&self) -> Option<bool> {
        match self.body.child("bodyPr")?.attr("wrap")? {
            "square" => Some(true),
            "none" => Some(false),
            _ => None,
        }
    }
}

/// A mutable `p:txBody`.
#[derive(Debug)]
pub struct TextFrameMut<'a> {
    body: &'a mut XmlElement,
}

impl<'a> TextFrameMut<'a> {
    pub fn new(body: &'a mut XmlElement) -> Self {
        Self { body }
    }

    pub fn view(&self) -> TextFrame<'_> {
        TextFrame::new(self.body)
    }

    /// Node index of the `idx`-th paragraph.
    fn paragraph_node(&self, idx: usize) -> Option<usize> {
        self.body
            .children()
            .iter()
            .enumerate()
            .filter(|(_, n)| n.as_element().is_some_and(|e| e.is("p")))
            .nth(idx)
            .map(|(node, _)| node)
    }

    pub fn paragraph_mut(&mut self, idx: usize) -> Option<ParagraphMut<'_>> {
        let node = self.paragraph_node(idx)?;
        self.body.element_at_mut(node).map(ParagraphMut::new)
    }

    /// Read-only access to the `idx`-th paragraph's element.
    pub fn paragraph_element(&self, idx: usize) -> Option<&XmlElement> {
        self.paragraph_node(idx)
            .and_then(|node| self.body.element_at(node))
    }

    /// Insert an empty paragraph directly after paragraph `idx` and return
    /// it. Returns `None` when there is no such paragraph.
    pub fn insert_paragraph_after(&mut self, idx: usize) -> Option<ParagraphMut<'_>> {
        let node = self.paragraph_node(idx)? + 1;
        self.body.insert(node, XmlElement::new("a:p"));
        self.body.element_at_mut(node).map(ParagraphMut::new)
    }

    /// The `a:bodyPr`, created as the first child when missing.
    fn body_pr_mut(&mut self) -> &mut XmlElement {
        self.body.get_or_insert_first("a:bodyPr")
    }

    pub fn set_auto_size(&mut self, auto_size: AutoSize) {
        let body_pr = self.body_pr_mut();
        body_pr.remove_elements_where(|e| AUTOFIT_ELEMENTS.contains(&e.local_name()));

        if let Some(name) = auto_size.element_name() {
            let idx = body_pr
                .children()
                .iter()
                .position(|n| {
                    n.as_element()
                        .is_some_and(|e| AFTER_AUTOFIT.contains(&e.local_name()))
                })
                .unwrap_or(body_pr.children().len());
            body_pr.insert(idx, XmlElement::new(name));
        }
    }

    pub fn set_word_wrap(&mut self, wrap: Option<bool>) {
        let body_pr = self.body_pr_mut();
        match wrap {
            Some(true) => body_pr.set_attr("wrap", "square"),
            Some(false) => body_pr.set_attr("wrap", "none"),
            None => {
                body_pr.remove_attr("wrap");
            },
        }
    }

    /// Replace all text with a single paragraph holding one run.
    ///
    /// The first paragraph's properties survive and the new run takes the
    /// font of the frame's first run, so a marker written over a
    /// placeholder looks like the text it replaced.
    pub fn set_text(&mut self, text: &str) {
        let font = self
            .view()
            .paragraphs()
            .flat_map(|p| p.runs())
            .next()
            .map(|run| run.font());

        let mut first = true;
        self.body.remove_elements_where(|e| {
            if !e.is("p") {
                return false;
            }
            let remove = !first;
            first = false;
            remove
        });

        if self.paragraph_node(0).is_none() {
            self.body.push(XmlElement::new("a:p"));
        }

        if let Some(mut para) = self.paragraph_mut(0) {
            para.clear();
            let mut run = para.add_run(text);
            if let Some(font) = font {
                run.apply_font(&font);
            }
        }
    }
}
