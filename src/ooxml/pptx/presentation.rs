/// Main presentation object - the high-level API for opening, editing and
/// saving a presentation.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::{content_type as ct, relationship_type};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::Part;
use crate::ooxml::pptx::media::MediaSink;
use crate::ooxml::pptx::shapes::base::{PlaceholderRef, ShapeFrame};
use crate::ooxml::pptx::slide::{Slide, placeholder_frames};
use crate::ooxml::xml::{XmlDocument, XmlElement};
use tracing::debug;

/// A PowerPoint presentation held in memory.
///
/// Slides are parsed once on open and edited in place; every other part
/// of the package is carried through to [`Presentation::to_bytes`]
/// untouched.
///
/// # Examples
///
/// ```rust,no_run
/// use loquat::ooxml::pptx::Presentation;
///
/// let bytes = std::fs::read("deck.pptx")?;
/// let pres = Presentation::from_bytes(&bytes)?;
/// println!("Slide count: {}", pres.slide_count());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Presentation {
    package: OpcPackage,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Open a presentation from the bytes of a `.pptx` file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = OpcPackage::from_bytes(bytes)?;
        let main = package.main_document_part()?;

        if !ct::PML_MAIN_PARTS.contains(&main.content_type()) {
            return Err(OoxmlError::InvalidContentType {
                expected: ct::PML_PRESENTATION_MAIN.to_string(),
                got: main.content_type().to_string(),
            });
        }

        let pres_doc = XmlDocument::parse(main.blob())?;
        let mut slides = Vec::new();

        if let Some(sld_id_lst) = pres_doc.root().child("sldIdLst") {
            for sld_id in sld_id_lst.elements().filter(|e| e.is("sldId")) {
                let r_id = relationship_id(sld_id).ok_or_else(|| {
                    OoxmlError::InvalidFormat("p:sldId without relationship id".to_string())
                })?;
                let partname = main.related_partname(r_id)?;
                let part = package.get_part(&partname)?;
                let document = XmlDocument::parse(part.blob())?;
                let inherited = inherited_frames(&package, part);
                slides.push(Slide::new(partname, document, inherited));
            }
        }

        debug!(slides = slides.len(), "opened presentation");
        Ok(Self { package, slides })
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide_mut(&mut self, idx: usize) -> Option<&mut Slide> {
        self.slides.get_mut(idx)
    }

    /// A slide together with a sink for images inserted into it.
    pub fn slide_and_media(&mut self, idx: usize) -> Option<(&mut Slide, MediaSink<'_>)> {
        let slide = self.slides.get_mut(idx)?;
        let sink = MediaSink::new(&mut self.package, slide.partname().clone());
        Some((slide, sink))
    }

    /// Write every slide back into its part and serialize the package.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        for slide in &self.slides {
            self.package
                .get_part_mut(slide.partname())?
                .set_blob(slide.to_bytes());
        }
        Ok(self.package.to_bytes()?)
    }
}

/// The `r:id` attribute of a `p:sldId`, whatever prefix the document binds
/// to the relationships namespace.
fn relationship_id(sld_id: &XmlElement) -> Option<&str> {
    sld_id
        .attributes()
        .iter()
        .find(|(name, _)| name.ends_with(":id") && !name.starts_with("xmlns"))
        .map(|(_, value)| value.as_str())
}

/// Part related from `part` by a relationship of `reltype`.
fn related_part<'p>(package: &'p OpcPackage, part: &dyn Part, reltype: &str) -> Option<&'p dyn Part> {
    let partname: PackURI = part
        .rels()
        .part_with_reltype(reltype)
        .and_then(|rel| rel.target_partname())
        .ok()?;
    package.get_part(&partname).ok()
}

/// Master placeholder type a layout placeholder of `kind` inherits from.
fn master_kind(kind: &str) -> &str {
    match kind {
        "title" | "ctrTitle" => "title",
        "dt" => "dt",
        "ftr" => "ftr",
        "sldNum" => "sldNum",
        _ => "body",
    }
}

/// Geometry of the slide layout's placeholders, with geometry the layout
/// leaves to the master filled in from the master.
fn inherited_frames(package: &OpcPackage, slide_part: &dyn Part) -> Vec<(PlaceholderRef, ShapeFrame)> {
    let Some(layout) = related_part(package, slide_part, relationship_type::SLIDE_LAYOUT) else {
        debug!(slide = %slide_part.partname(), "slide has no layout");
        return Vec::new();
    };
    let Ok(layout_doc) = XmlDocument::parse(layout.blob()) else {
        debug!(layout = %layout.partname(), "layout is not well-formed, ignoring");
        return Vec::new();
    };

    let master_frames = related_part(package, layout, relationship_type::SLIDE_MASTER)
        .and_then(|master| XmlDocument::parse(master.blob()).ok())
        .map(|doc| placeholder_frames(&doc))
        .unwrap_or_default();

    placeholder_frames(&layout_doc)
        .into_iter()
        .filter_map(|(ph, frame)| {
            let frame = frame.or_else(|| {
                let kind = master_kind(&ph.kind);
                master_frames
                    .iter()
                    .find(|(master_ph, _)| master_ph.kind == kind)
                    .and_then(|(_, frame)| *frame)
            })?;
            Some((ph, frame))
        })
        .collect()
}
