/// Table graphic frame markup.
use crate::common::xml::{escape_text, escape_xml};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::constants::namespace;
use crate::ooxml::pptx::shapes::base::ShapeFrame;
use crate::ooxml::pptx::shapes::textframe::TextFrame;
use crate::ooxml::xml::XmlElement;
use std::fmt::Write as FmtWrite;

/// Build a `p:graphicFrame` holding an `a:tbl` with one cell per value.
///
/// Columns share the frame's width evenly and rows share its height, with
/// any remainder going to the last column / row. Short rows are padded
/// with empty cells. The first row is flagged as a header row.
pub fn new_table(
    shape_id: u32,
    name: &str,
    rows: &[Vec<String>],
    frame: &ShapeFrame,
) -> Result<XmlElement> {
    let col_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    if rows.is_empty() || col_count == 0 {
        return Err(OoxmlError::InvalidFormat(
            "a table needs at least one row and one column".to_string(),
        ));
    }

    let widths = split_evenly(frame.cx, col_count);
    let heights = split_evenly(frame.cy, rows.len());

    let mut xml = String::with_capacity(1024 + 160 * rows.len() * col_count);
    let fmt_err = |e: std::fmt::Error| OoxmlError::Xml(e.to_string());

    xml.push_str("<p:graphicFrame>");
    xml.push_str("<p:nvGraphicFramePr>");
    write!(
        xml,
        r#"<p:cNvPr id="{}" name="{}"/>"#,
        shape_id,
        escape_xml(name)
    )
    .map_err(fmt_err)?;
    xml.push_str(r#"<p:cNvGraphicFramePr><a:graphicFrameLocks noGrp="1"/></p:cNvGraphicFramePr>"#);
    xml.push_str("<p:nvPr/>");
    xml.push_str("</p:nvGraphicFramePr>");

    xml.push_str("<p:xfrm>");
    write!(xml, r#"<a:off x="{}" y="{}"/>"#, frame.x, frame.y).map_err(fmt_err)?;
    write!(xml, r#"<a:ext cx="{}" cy="{}"/>"#, frame.cx, frame.cy).map_err(fmt_err)?;
    xml.push_str("</p:xfrm>");

    xml.push_str("<a:graphic>");
    write!(xml, r#"<a:graphicData uri="{}">"#, namespace::DML_TABLE).map_err(fmt_err)?;
    xml.push_str("<a:tbl>");
    xml.push_str(r#"<a:tblPr firstRow="1" bandRow="1"/>"#);

    xml.push_str("<a:tblGrid>");
    for w in &widths {
        write!(xml, r#"<a:gridCol w="{}"/>"#, w).map_err(fmt_err)?;
    }
    xml.push_str("</a:tblGrid>");

    for (row, h) in rows.iter().zip(&heights) {
        write!(xml, r#"<a:tr h="{}">"#, h).map_err(fmt_err)?;
        for col in 0..col_count {
            xml.push_str("<a:tc><a:txBody><a:bodyPr/><a:lstStyle/><a:p>");
            match row.get(col).filter(|text| !text.is_empty()) {
                Some(text) => {
                    write!(
                        xml,
                        r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#,
                        escape_text(text)
                    )
                    .map_err(fmt_err)?;
                },
                None => xml.push_str(r#"<a:endParaRPr lang="en-US" dirty="0"/>"#),
            }
            xml.push_str("</a:p></a:txBody><a:tcPr/></a:tc>");
        }
        xml.push_str("</a:tr>");
    }

    xml.push_str("</a:tbl>");
    xml.push_str("</a:graphicData>");
    xml.push_str("</a:graphic>");
    xml.push_str("</p:graphicFrame>");

    XmlElement::parse_fragment(&xml)
}

/// Split `total` into `parts` non-negative integers that sum to `total`.
fn split_evenly(total: i64, parts: usize) -> Vec<i64> {
    let n = parts as i64;
    let base = total.max(0) / n;
    let mut sizes = vec![base; parts];
    if let Some(last) = sizes.last_mut() {
        *last += total.max(0) - base * n;
    }
    sizes
}

/// Cell texts of an `a:tbl` inside a graphic frame, row by row.
pub fn table_cells(graphic_frame: &XmlElement) -> Option<Vec<Vec<String>>> {
    let tbl = graphic_frame.descendant(&["graphic", "graphicData", "tbl"])?;
    Some(
        tbl.elements()
            .filter(|e| e.is("tr"))
            .map(|tr| {
                tr.elements()
                    .filter(|e| e.is("tc"))
                    .map(|tc| {
                        tc.child("txBody")
                            .map(|body| TextFrame::new(body).text())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect(),
    )
}
