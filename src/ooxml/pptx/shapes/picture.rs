/// Picture (image) shape markup.
use crate::common::xml::escape_xml;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::pptx::shapes::base::ShapeFrame;
use crate::ooxml::xml::XmlElement;
use std::fmt::Write as FmtWrite;

/// Build a `p:pic` element showing the image related as `r_id`, stretched
/// over `frame`.
pub fn new_picture(shape_id: u32, name: &str, r_id: &str, frame: &ShapeFrame) -> Result<XmlElement> {
    let mut xml = String::with_capacity(640);

    xml.push_str("<p:pic>");
    xml.push_str("<p:nvPicPr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}" descr=""/>"#,
        shape_id,
        escape_xml(name)
    )
    .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvPicPr>");

    xml.push_str("<p:blipFill>");
    write!(xml, r#"<a:blip r:embed="{}"/>"#, escape_xml(r_id))
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
    xml.push_str("</p:blipFill>");

    xml.push_str("<p:spPr>");
    xml.push_str("<a:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, frame.x, frame.y)
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, frame.cx, frame.cy)
        .map_err(|e| OoxmlError::Xml(e.to_string()))?;
    xml.push_str("</a:xfrm>");
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
    xml.push_str("</p:spPr>");
    xml.push_str("</p:pic>");

    XmlElement::parse_fragment(&xml)
}

/// The `r:embed` of a picture's blip, if any.
pub fn image_r_id(pic: &XmlElement) -> Option<&str> {
    pic.descendant(&["blipFill", "blip"])?.attr("r:embed")
}

/// Point a picture's blip at another image relationship.
///
/// Returns `false` when the element has no `p:blipFill/a:blip`.
pub fn set_image_r_id(pic: &mut XmlElement, r_id: &str) -> bool {
    match pic.descendant_mut(&["blipFill", "blip"]) {
        Some(blip) => {
            blip.set_attr("r:embed", r_id);
            true
        },
        None => false,
    }
}
