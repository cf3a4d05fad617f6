//! Paragraphs and runs of a DrawingML text body.
//!
//! An `a:p` holds an optional `a:pPr`, its content (`a:r` runs, `a:br` line
//! breaks and `a:fld` fields) and an optional trailing `a:endParaRPr`.
//! [`Paragraph`] and [`Run`] are read-only views; [`ParagraphMut`] and
//! [`RunMut`] edit the underlying elements in place.

use crate::ooxml::pptx::shapes::font::Font;
use crate::ooxml::xml::XmlElement;

/// Whether an `a:p` child is paragraph content (as opposed to properties).
#[inline]
fn is_content(el: &XmlElement) -> bool {
    el.is("r") || el.is("br") || el.is("fld")
}

/// Text of one content child: runs and fields give their `a:t`, breaks a newline.
fn content_text(el: &XmlElement) -> String {
    if el.is("br") {
        return "\n".to_string();
    }
    el.child("t").map(XmlElement::text).unwrap_or_default()
}

/// A read-only paragraph view.
#[derive(Debug, Clone, Copy)]
pub struct Paragraph<'a> {
    element: &'a XmlElement,
}

impl<'a> Paragraph<'a> {
    pub fn new(element: &'a XmlElement) -> Self {
        Self { element }
    }

    #[inline]
    pub fn element(&self) -> &'a XmlElement {
        self.element
    }

    /// Text of all runs and fields, with line breaks as `\n`.
    pub fn text(&self) -> String {
        self.element
            .elements()
            .filter(|e| is_content(e))
            .map(content_text)
            .collect()
    }

    /// The `a:r` runs in order (fields and breaks excluded).
    pub fn runs(self) -> impl Iterator<Item = Run<'a>> {
        self.element.elements().filter(|e| e.is("r")).map(Run::new)
    }

    pub fn run_count(&self) -> usize {
        self.runs().count()
    }

    /// Paragraph property block (`a:pPr`), if any.
    pub fn properties(&self) -> Option<&'a XmlElement> {
        self.element.child("pPr")
    }

    /// Outline / bullet level, 0 when not set.
    pub fn level(&self) -> u32 {
        self.properties()
            .and_then(|ppr| ppr.attr("lvl"))
            .and_then(|lvl| atoi_simd::parse::<u32>(lvl.as_bytes()).ok())
            .unwrap_or(0)
    }

    /// Font of the first run; the style donor for collapsed text.
    pub fn first_run_font(&self) -> Option<Font> {
        self.runs().next().map(|run| run.font())
    }
}

/// A read-only run view.
#[derive(Debug, Clone, Copy)]
pub struct Run<'a> {
    element: &'a XmlElement,
}

impl<'a> Run<'a> {
    pub fn new(element: &'a XmlElement) -> Self {
        Self { element }
    }

    pub fn text(&self) -> String {
        content_text(self.element)
    }

    pub fn font(&self) -> Font {
        Font::from_rpr(self.element.child("rPr"))
    }

    /// The raw `a:rPr`, if present.
    pub fn properties(&self) -> Option<&'a XmlElement> {
        self.element.child("rPr")
    }
}

/// A mutable paragraph.
#[derive(Debug)]
pub struct ParagraphMut<'a> {
    element: &'a mut XmlElement,
}

impl<'a> ParagraphMut<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    /// Read-only view of the same paragraph.
    pub fn view(&self) -> Paragraph<'_> {
        Paragraph::new(self.element)
    }

    pub fn element_mut(&mut self) -> &mut XmlElement {
        self.element
    }

    /// Remove all runs, fields and breaks; properties stay.
    pub fn clear(&mut self) {
        self.element.remove_elements_where(is_content);
    }

    /// Append a run holding `text`, before any `a:endParaRPr`.
    pub fn add_run(&mut self, text: &str) -> RunMut<'_> {
        let mut t = XmlElement::new("a:t");
        t.set_text(text);
        let run = XmlElement::new("a:r").with_child(t);

        let idx = self
            .element
            .position("endParaRPr")
            .unwrap_or(self.element.children().len());
        self.element.insert(idx, run);

        match self.element.element_at_mut(idx) {
            Some(el) => RunMut::new(el),
            None => unreachable!("run was just inserted at {}", idx),
        }
    }

    /// Mutable access to the `idx`-th run.
    pub fn run_mut(&mut self, idx: usize) -> Option<RunMut<'_>> {
        self.element
            .elements_mut()
            .filter(|e| e.is("r"))
            .nth(idx)
            .map(RunMut::new)
    }

    /// Apply `f` to every run in order.
    pub fn for_each_run(&mut self, mut f: impl FnMut(&mut RunMut<'_>)) {
        for el in self.element.elements_mut().filter(|e| e.is("r")) {
            f(&mut RunMut::new(el));
        }
    }
}

/// A mutable run.
#[derive(Debug)]
pub struct RunMut<'a> {
    element: &'a mut XmlElement,
}

impl<'a> RunMut<'a> {
    pub fn new(element: &'a mut XmlElement) -> Self {
        Self { element }
    }

    pub fn view(&self) -> Run<'_> {
        Run::new(self.element)
    }

    pub fn text(&self) -> String {
        self.view().text()
    }

    /// Replace the run's text; formatting is untouched.
    pub fn set_text(&mut self, text: &str) {
        self.element.get_or_add_child("a:t").set_text(text);
    }

    /// The run's `a:rPr`, created as the first child when missing.
    pub fn properties_mut(&mut self) -> &mut XmlElement {
        self.element.get_or_insert_first("a:rPr")
    }

    /// Copy `font` onto this run.
    pub fn apply_font(&mut self, font: &Font) {
        font.apply_to(self.properties_mut());
    }
}

/// Copy the paragraph property block of `source` onto `dest`.
///
/// The destination's `a:pPr` is replaced wholesale: its attributes and
/// children become verbatim copies of the source's. A source without
/// `a:pPr` leaves the destination untouched.
pub fn clone_paragraph_properties(source: &XmlElement, dest: &mut XmlElement) {
    let Some(src_ppr) = source.child("pPr") else {
        return;
    };

    let dest_ppr = dest.get_or_insert_first("a:pPr");
    dest_ppr.clear_attributes();
    dest_ppr.clear_children();
    for (key, value) in src_ppr.attributes() {
        dest_ppr.set_attr(key, value.as_str());
    }
    for child in src_ppr.children() {
        dest_ppr.push(child.clone());
    }
}
