//! Run-level character formatting.
//!
//! A [`Font`] is a detached snapshot of the styling carried by an `a:rPr`
//! element. Reading it never mutates the run, so a font can be taken from a
//! run before that run is cleared and applied to new runs afterwards.

use crate::ooxml::xml::XmlElement;

/// DrawingML percentages are stored in thousandths of a percent.
const PERCENT_SCALE: f64 = 100_000.0;

/// `a:rPr` children that must follow a fill element, in schema order.
const AFTER_FILL: &[&str] = &[
    "effectLst",
    "effectDag",
    "highlight",
    "uLnTx",
    "uLn",
    "uFillTx",
    "uFill",
    "latin",
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// `a:rPr` children that must follow `a:latin`.
const AFTER_LATIN: &[&str] = &[
    "ea",
    "cs",
    "sym",
    "hlinkClick",
    "hlinkMouseOver",
    "rtl",
    "extLst",
];

/// Fill choices allowed in `a:rPr`; at most one may be present.
const FILL_ELEMENTS: &[&str] = &[
    "noFill",
    "solidFill",
    "gradFill",
    "blipFill",
    "pattFill",
    "grpFill",
];

/// Text colour, one variant per DrawingML colour model.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorFormat {
    /// `a:srgbClr`, six hex digits such as `"1F4E79"`
    Rgb(String),
    /// `a:schemeClr` with a brightness adjustment in `-1.0..=1.0`
    Theme { value: String, brightness: f64 },
    /// `a:prstClr`, e.g. `"red"`
    Preset(String),
}

impl ColorFormat {
    /// Read the colour of an `a:solidFill` element.
    ///
    /// Returns `None` when the fill holds a colour model that is not
    /// modelled here (system colours, HSL) or lacks its `val`.
    pub fn from_solid_fill(fill: &XmlElement) -> Option<Self> {
        let clr = fill.elements().next()?;
        let value = clr.attr("val")?.to_string();

        match clr.local_name() {
            "srgbClr" => Some(Self::Rgb(value)),
            "schemeClr" => Some(Self::Theme {
                value,
                brightness: read_brightness(clr),
            }),
            "prstClr" => Some(Self::Preset(value)),
            _ => None,
        }
    }

    /// Build the `a:solidFill` element for this colour.
    pub fn to_solid_fill(&self) -> XmlElement {
        let clr = match self {
            Self::Rgb(value) => XmlElement::new("a:srgbClr").with_attr("val", value.as_str()),
            Self::Preset(value) => XmlElement::new("a:prstClr").with_attr("val", value.as_str()),
            Self::Theme { value, brightness } => {
                let mut clr = XmlElement::new("a:schemeClr").with_attr("val", value.as_str());
                write_brightness(&mut clr, *brightness);
                clr
            },
        };
        XmlElement::new("a:solidFill").with_child(clr)
    }
}

/// Brightness from `a:lumMod`/`a:lumOff`, the convention PowerPoint uses
/// for tints and shades of theme colours.
fn read_brightness(clr: &XmlElement) -> f64 {
    let percent = |local: &str| -> Option<f64> {
        clr.child(local)?
            .attr("val")?
            .parse::<f64>()
            .ok()
            .map(|v| v / PERCENT_SCALE)
    };

    if let Some(lum_off) = percent("lumOff") {
        return lum_off;
    }
    if let Some(lum_mod) = percent("lumMod") {
        return lum_mod - 1.0;
    }
    0.0
}

fn write_brightness(clr: &mut XmlElement, brightness: f64) {
    clr.remove_elements_where(|e| e.is("lumMod") || e.is("lumOff"));

    let scaled = |v: f64| ((v * PERCENT_SCALE).round() as i64).to_string();
    if brightness > 0.0 {
        clr.push(XmlElement::new("a:lumMod").with_attr("val", scaled(1.0 - brightness)));
        clr.push(XmlElement::new("a:lumOff").with_attr("val", scaled(brightness)));
    } else if brightness < 0.0 {
        clr.push(XmlElement::new("a:lumMod").with_attr("val", scaled(1.0 + brightness)));
    }
}

/// Character formatting of a run.
///
/// `None` means "inherited": the attribute is absent from the run and the
/// value comes from the paragraph, list style or master.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Font {
    /// Latin typeface (`a:latin/@typeface`)
    pub name: Option<String>,
    /// Size in hundredths of a point (`@sz`)
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// Underline style token (`@u`), e.g. `sng` or `none`
    pub underline: Option<String>,
    pub color: Option<ColorFormat>,
}

impl Font {
    /// Read a font from a run's `a:rPr`; a missing element is an empty font.
    pub fn from_rpr(rpr: Option<&XmlElement>) -> Self {
        let Some(rpr) = rpr else {
            return Self::default();
        };

        Self {
            name: rpr
                .child("latin")
                .and_then(|latin| latin.attr("typeface"))
                .map(str::to_string),
            size: rpr.attr("sz").and_then(|sz| atoi_simd::parse::<u32>(sz.as_bytes()).ok()),
            bold: rpr.attr("b").and_then(parse_bool),
            italic: rpr.attr("i").and_then(parse_bool),
            underline: rpr.attr("u").map(str::to_string),
            color: rpr.child("solidFill").and_then(ColorFormat::from_solid_fill),
        }
    }

    /// Copy this font onto a run's `a:rPr`.
    ///
    /// Face, size, bold, italic and underline are always transferred, so an
    /// inherited value in the source clears the target's explicit one. The
    /// colour moves as a whole: when the source has one, any existing fill
    /// on the target is replaced by it; when it has none, the target's fill
    /// is left alone.
    pub fn apply_to(&self, rpr: &mut XmlElement) {
        set_or_remove(rpr, "sz", self.size.map(|sz| sz.to_string()));
        set_or_remove(rpr, "b", self.bold.map(format_bool));
        set_or_remove(rpr, "i", self.italic.map(format_bool));
        set_or_remove(rpr, "u", self.underline.clone());

        if let Some(color) = &self.color {
            rpr.remove_elements_where(|e| FILL_ELEMENTS.contains(&e.local_name()));
            let idx = insertion_point(rpr, AFTER_FILL);
            rpr.insert(idx, color.to_solid_fill());
        }

        rpr.remove_elements_where(|e| e.is("latin"));
        if let Some(name) = &self.name {
            let idx = insertion_point(rpr, AFTER_LATIN);
            rpr.insert(idx, XmlElement::new("a:latin").with_attr("typeface", name.as_str()));
        }
    }
}

/// Node index before the first child whose local name is in `successors`.
fn insertion_point(parent: &XmlElement, successors: &[&str]) -> usize {
    parent
        .children()
        .iter()
        .position(|n| {
            n.as_element()
                .is_some_and(|e| successors.contains(&e.local_name()))
        })
        .unwrap_or(parent.children().len())
}

fn set_or_remove(el: &mut XmlElement, name: &str, value: Option<String>) {
    match value {
        Some(v) => el.set_attr(name, v),
        None => {
            el.remove_attr(name);
        },
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        _ => None,
    }
}

#[inline]
fn format_bool(b: bool) -> String {
    if b { "1" } else { "0" }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rpr(xml: &str) -> XmlElement {
        XmlElement::parse_fragment(xml).unwrap()
    }

    #[test]
    fn test_read_rgb_font() {
        let el = rpr(
            r#"<a:rPr lang="en-US" sz="2400" b="1" u="sng"><a:solidFill><a:srgbClr val="FF0000"/></a:solidFill><a:latin typeface="Calibri"/></a:rPr>"#,
        );
        let font = Font::from_rpr(Some(&el));

        assert_eq!(font.name.as_deref(), Some("Calibri"));
        assert_eq!(font.size, Some(2400));
        assert_eq!(font.bold, Some(true));
        assert_eq!(font.italic, None);
        assert_eq!(font.underline.as_deref(), Some("sng"));
        assert_eq!(font.color, Some(ColorFormat::Rgb("FF0000".to_string())));
    }

    #[test]
    fn test_theme_brightness() {
        let tint = rpr(
            r#"<a:rPr><a:solidFill><a:schemeClr val="accent1"><a:lumMod val="60000"/><a:lumOff val="40000"/></a:schemeClr></a:solidFill></a:rPr>"#,
        );
        let shade = rpr(
            r#"<a:rPr><a:solidFill><a:schemeClr val="tx1"><a:lumMod val="75000"/></a:schemeClr></a:solidFill></a:rPr>"#,
        );

        assert_eq!(
            Font::from_rpr(Some(&tint)).color,
            Some(ColorFormat::Theme {
                value: "accent1".to_string(),
                brightness: 0.4
            })
        );
        match Font::from_rpr(Some(&shade)).color {
            Some(ColorFormat::Theme { value, brightness }) => {
                assert_eq!(value, "tx1");
                assert!((brightness + 0.25).abs() < 1e-9);
            },
            other => panic!("unexpected colour {:?}", other),
        }
    }

    #[test]
    fn test_apply_theme_colour_round_trips() {
        let source = rpr(
            r#"<a:rPr sz="1800" i="1"><a:solidFill><a:schemeClr val="accent2"><a:lumMod val="60000"/><a:lumOff val="40000"/></a:schemeClr></a:solidFill><a:latin typeface="Georgia"/></a:rPr>"#,
        );
        let font = Font::from_rpr(Some(&source));

        let mut target = XmlElement::new("a:rPr").with_attr("lang", "en-US");
        font.apply_to(&mut target);

        assert_eq!(Font::from_rpr(Some(&target)), font);
        assert_eq!(
            target.to_xml_string(),
            r#"<a:rPr lang="en-US" sz="1800" i="1"><a:solidFill><a:schemeClr val="accent2"><a:lumMod val="60000"/><a:lumOff val="40000"/></a:schemeClr></a:solidFill><a:latin typeface="Georgia"/></a:rPr>"#
        );
    }

    #[test]
    fn test_preset_colour_replaces_existing_fill() {
        let font = Font {
            color: Some(ColorFormat::Preset("red".to_string())),
            ..Font::default()
        };
        let mut target = rpr(
            r#"<a:rPr b="1"><a:ln w="100"/><a:noFill/><a:latin typeface="Arial"/></a:rPr>"#,
        );
        font.apply_to(&mut target);

        assert_eq!(
            target.to_xml_string(),
            r#"<a:rPr><a:ln w="100"/><a:solidFill><a:prstClr val="red"/></a:solidFill></a:rPr>"#
        );
    }

    #[test]
    fn test_unmodelled_colour_is_not_partially_copied() {
        let source = rpr(
            r#"<a:rPr><a:solidFill><a:sysClr val="windowText" lastClr="000000"/></a:solidFill></a:rPr>"#,
        );
        let font = Font::from_rpr(Some(&source));
        assert_eq!(font.color, None);

        let incomplete = rpr(r#"<a:rPr><a:solidFill><a:srgbClr/></a:solidFill></a:rPr>"#);
        assert_eq!(Font::from_rpr(Some(&incomplete)).color, None);
    }

    #[test]
    fn test_missing_rpr_is_empty_font() {
        assert_eq!(Font::from_rpr(None), Font::default());
    }
}
