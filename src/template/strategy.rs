//! Choosing how a shape is rendered.
//!
//! A shape's text is scanned once and the strategies are tried in order;
//! the first one whose matcher accepts the scan handles the whole shape.

use crate::common::error::{Error, Result};
use crate::ooxml::pptx::shapes::table::new_table;
use crate::ooxml::pptx::shapes::{ShapeFrame, TextFrame};
use crate::ooxml::xml::XmlElement;
use crate::template::placeholder::{PlaceholderKind, has_open_delimiter, tokens};
use tracing::debug;

/// Builds the shape that replaces a table placeholder.
pub trait TableBuilder {
    /// Build a shape with id `shape_id` showing `rows` inside `frame`.
    fn build(&self, shape_id: u32, rows: &[Vec<String>], frame: &ShapeFrame) -> Result<XmlElement>;
}

/// Builds a DrawingML table (`a:tbl` in a graphic frame).
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawingTableBuilder;

impl TableBuilder for DrawingTableBuilder {
    fn build(&self, shape_id: u32, rows: &[Vec<String>], frame: &ShapeFrame) -> Result<XmlElement> {
        let name = format!("Table {}", shape_id.saturating_sub(1));
        new_table(shape_id, &name, rows, frame).map_err(|e| Error::TableBuild(e.to_string()))
    }
}

impl<F> TableBuilder for F
where
    F: Fn(u32, &[Vec<String>], &ShapeFrame) -> Result<XmlElement>,
{
    fn build(&self, shape_id: u32, rows: &[Vec<String>], frame: &ShapeFrame) -> Result<XmlElement> {
        self(shape_id, rows, frame)
    }
}

/// The text of one shape, read once before any strategy runs.
#[derive(Debug, Clone, Default)]
pub struct ShapeScan {
    /// Paragraph texts in order
    pub paragraphs: Vec<String>,
}

impl ShapeScan {
    pub fn new(frame: TextFrame<'_>) -> Self {
        Self {
            paragraphs: frame.paragraphs().map(|p| p.text()).collect(),
        }
    }

    /// Name of the first token of `kind` anywhere in the shape.
    fn first_name(&self, pred: impl Fn(PlaceholderKind) -> bool) -> Option<(usize, String)> {
        self.paragraphs.iter().enumerate().find_map(|(idx, text)| {
            tokens(text)
                .find(|t| pred(t.kind()))
                .map(|t| (idx, t.name.to_string()))
        })
    }
}

/// What to do with a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Replace the shape with a picture of the named image
    Image { name: String },
    /// Expand the named list into the paragraph at `paragraph`
    List { paragraph: usize, name: String },
    /// Replace the shape with a table of the named rows
    Table { name: String },
    /// Substitute text tokens paragraph by paragraph
    Text,
}

type Matcher = fn(&ShapeScan) -> Option<Plan>;

/// Strategies in priority order.
const STRATEGIES: &[(&str, Matcher)] = &[
    ("image", match_image),
    ("list", match_list),
    ("table", match_table),
    ("text", match_text),
];

fn match_image(scan: &ShapeScan) -> Option<Plan> {
    scan.first_name(PlaceholderKind::is_image)
        .map(|(_, name)| Plan::Image { name })
}

fn match_list(scan: &ShapeScan) -> Option<Plan> {
    scan.first_name(|kind| kind == PlaceholderKind::List)
        .map(|(paragraph, name)| Plan::List { paragraph, name })
}

fn match_table(scan: &ShapeScan) -> Option<Plan> {
    scan.first_name(|kind| kind == PlaceholderKind::Table)
        .map(|(_, name)| Plan::Table { name })
}

fn match_text(scan: &ShapeScan) -> Option<Plan> {
    scan.paragraphs
        .iter()
        .any(|text| has_open_delimiter(text))
        .then_some(Plan::Text)
}

/// Pick the strategy for a shape, `None` when it holds nothing to render.
pub fn plan(scan: &ShapeScan) -> Option<Plan> {
    STRATEGIES.iter().find_map(|(strategy, matcher)| {
        let plan = matcher(scan)?;
        debug!(strategy, "strategy selected");
        Some(plan)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::pptx::shapes::table::table_cells;

    fn scan(paragraphs: &[&str]) -> ShapeScan {
        ShapeScan {
            paragraphs: paragraphs.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_priority_order() {
        let all = scan(&["{{title}}", "{{list:items}}", "{{table:grid}}", "{{scrape:shot}}"]);
        assert_eq!(plan(&all), Some(Plan::Image { name: "shot".to_string() }));

        let no_image = scan(&["{{title}}", "{{table:grid}}", "{{list:items}}"]);
        assert_eq!(
            plan(&no_image),
            Some(Plan::List {
                paragraph: 2,
                name: "items".to_string()
            })
        );

        let table = scan(&["{{title}}", "{{table:grid}}"]);
        assert_eq!(plan(&table), Some(Plan::Table { name: "grid".to_string() }));
    }

    #[test]
    fn test_text_and_nothing() {
        assert_eq!(plan(&scan(&["Dear {{", "name}}"])), Some(Plan::Text));
        assert_eq!(plan(&scan(&["plain", "text"])), None);
        assert_eq!(plan(&scan(&[])), None);
    }

    #[test]
    fn test_drawing_table_builder() {
        let rows = vec![vec!["a".to_string(), "b".to_string()], vec!["1".to_string()]];
        let el = DrawingTableBuilder
            .build(5, &rows, &ShapeFrame::new(0, 0, 200, 100))
            .unwrap();
        assert_eq!(
            table_cells(&el).unwrap(),
            vec![vec!["a", "b"], vec!["1", ""]]
        );

        let err = DrawingTableBuilder
            .build(5, &[], &ShapeFrame::default())
            .unwrap_err();
        assert!(matches!(err, Error::TableBuild(_)));
    }
}
