//! The substitution pass.
//!
//! Each slide is walked over a snapshot of its shape indices. Strategies
//! may append shapes (pictures, tables) while the walk is in progress;
//! removals are only scheduled, and carried out by the slide's
//! [`ShapeLifecycle`] once every shape in the snapshot has been visited.

use crate::common::error::{Error, Result};
use crate::ooxml::pptx::shapes::picture::{new_picture, set_image_r_id};
use crate::ooxml::pptx::shapes::{Paragraph, ShapeFrame, TextFrameMut, clone_paragraph_properties};
use crate::ooxml::pptx::{MediaSink, Presentation, Slide};
use crate::template::assets::AssetResolver;
use crate::template::data::TemplateData;
use crate::template::lifecycle::ShapeLifecycle;
use crate::template::options::{Markers, RenderOptions};
use crate::template::placeholder::{has_open_delimiter, has_textual_token, substitute_textual};
use crate::template::report::{Outcome, RenderReport};
use crate::template::strategy::{self, DrawingTableBuilder, Plan, ShapeScan, TableBuilder};
use tracing::{debug, info, warn};

/// A rendered document and what happened while rendering it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

/// Renders templates against data.
///
/// # Examples
///
/// ```rust,no_run
/// use loquat::template::{MemoryAssets, Renderer, TemplateData};
///
/// let template = std::fs::read("template.pptx")?;
/// let data = TemplateData::from_json_str(r#"{"client": "Acme", "items": ["A", "B"]}"#)?;
/// let assets = MemoryAssets::new();
///
/// let rendered = Renderer::new(&assets).render(&template, &data)?;
/// std::fs::write("out.pptx", rendered.bytes)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Renderer<'r> {
    assets: &'r dyn AssetResolver,
    tables: &'r dyn TableBuilder,
    options: RenderOptions,
}

impl<'r> Renderer<'r> {
    pub fn new(assets: &'r dyn AssetResolver) -> Self {
        Self {
            assets,
            tables: &DrawingTableBuilder,
            options: RenderOptions::default(),
        }
    }

    pub fn with_table_builder(mut self, tables: &'r dyn TableBuilder) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Open `template`, resolve every placeholder against `data`, and
    /// serialize the result.
    ///
    /// Only a template that cannot be opened or written back is an error;
    /// problems with individual placeholders end up as markers in the
    /// document and entries in the report.
    pub fn render(&self, template: &[u8], data: &TemplateData) -> Result<Rendered> {
        let mut pres = Presentation::from_bytes(template)?;
        let report = self.render_presentation(&mut pres, data);
        let bytes = pres.to_bytes()?;
        Ok(Rendered { bytes, report })
    }

    /// Resolve placeholders in an already opened presentation.
    pub fn render_presentation(&self, pres: &mut Presentation, data: &TemplateData) -> RenderReport {
        let mut report = RenderReport {
            slides: pres.slide_count(),
            ..RenderReport::default()
        };

        for idx in 0..pres.slide_count() {
            let Some((slide, media)) = pres.slide_and_media(idx) else {
                continue;
            };
            let pass = SlidePass {
                renderer: self,
                data,
                slide,
                media,
                lifecycle: ShapeLifecycle::new(),
                report: &mut report,
                number: idx + 1,
            };
            pass.run();
        }

        info!(
            slides = report.slides,
            placeholders = report.entries.len(),
            markers = report.markers().count(),
            shapes_removed = report.shapes_removed,
            "rendered presentation"
        );
        report
    }
}

/// Render `template` with the default options and table builder.
pub fn render(template: &[u8], data: &TemplateData, assets: &dyn AssetResolver) -> Result<Vec<u8>> {
    Renderer::new(assets)
        .render(template, data)
        .map(|rendered| rendered.bytes)
}

/// One slide's walk.
struct SlidePass<'a> {
    renderer: &'a Renderer<'a>,
    data: &'a TemplateData,
    slide: &'a mut Slide,
    media: MediaSink<'a>,
    lifecycle: ShapeLifecycle,
    report: &'a mut RenderReport,
    /// 1-based slide number
    number: usize,
}

impl SlidePass<'_> {
    fn run(mut self) {
        for idx in self.slide.shape_indices() {
            let Some(shape) = self.slide.shape(idx) else {
                continue;
            };
            let Some(frame) = shape.text_frame() else {
                continue;
            };
            let shape_name = shape.name().to_string();
            let Some(plan) = strategy::plan(&ShapeScan::new(frame)) else {
                continue;
            };

            debug!(slide = self.number, shape = %shape_name, ?plan, "rendering shape");
            match plan {
                Plan::Image { name } => self.render_image(idx, &shape_name, &name),
                Plan::List { paragraph, name } => self.render_list(idx, &shape_name, paragraph, &name),
                Plan::Table { name } => self.render_table(idx, &shape_name, &name),
                Plan::Text => self.render_text(idx, &shape_name),
            }
        }

        let SlidePass {
            slide,
            lifecycle,
            report,
            ..
        } = self;
        report.shapes_removed += lifecycle.commit(slide);
    }

    fn markers(&self) -> &Markers {
        &self.renderer.options.markers
    }

    /// Replace the shape's text with `text` and record why.
    fn write_marker(&mut self, idx: usize, shape: &str, name: &str, text: String, reason: String) {
        if let Some(mut tf) = self.slide.text_frame_mut(idx) {
            tf.set_text(&text);
        }
        self.report
            .push(self.number, shape, name, Outcome::Marker { text, reason });
    }

    fn frame_of(&self, idx: usize) -> Result<ShapeFrame> {
        let shape = self
            .slide
            .shape(idx)
            .ok_or_else(|| Error::MalformedDocument(format!("no shape at index {}", idx)))?;
        self.slide.shape_frame(&shape).ok_or_else(|| {
            Error::MalformedDocument(format!("shape '{}' has no position", shape.name()))
        })
    }

    fn render_image(&mut self, idx: usize, shape: &str, name: &str) {
        let key = match self.data.image_key(name) {
            Ok(Some(key)) => key,
            Ok(None) => {
                warn!(placeholder = name, "no image data, writing marker");
                let text = Markers::render(&self.markers().image_missing, name);
                self.write_marker(idx, shape, name, text, "no data".to_string());
                return;
            },
            Err(e) => {
                warn!(placeholder = name, error = %e, "invalid image data, writing marker");
                let text = Markers::render(&self.markers().image_missing, name);
                self.write_marker(idx, shape, name, text, e.to_string());
                return;
            },
        };

        match self.insert_picture(idx, key) {
            Ok(()) => {
                self.lifecycle.mark(idx);
                self.report
                    .push(self.number, shape, name, Outcome::PictureInserted);
            },
            Err(e) => {
                warn!(placeholder = name, key, error = %e, "could not insert image");
                let text = Markers::render(&self.markers().image_error, name);
                self.write_marker(idx, shape, name, text, e.to_string());
            },
        }
    }

    /// Place the image for `key` over the shape at `idx`.
    ///
    /// The media part and its relationship are created last, once nothing
    /// else can fail, so a failed insertion leaves the package untouched.
    fn insert_picture(&mut self, idx: usize, key: &str) -> Result<()> {
        let frame = self.frame_of(idx)?;
        if !self.slide.has_shape_tree() {
            return Err(Error::MalformedDocument("slide has no shape tree".to_string()));
        }

        let shape_id = self.slide.next_shape_id();
        let name = format!("Picture {}", shape_id.saturating_sub(1));
        let mut pic = new_picture(shape_id, &name, "", &frame)?;
        let blob = self.renderer.assets.resolve(key)?;

        let r_id = self
            .media
            .add_image(blob)
            .map_err(|e| Error::asset_unavailable(key, e))?;
        set_image_r_id(&mut pic, &r_id);

        self.slide.ensure_relationships_namespace();
        self.slide.append_shape(pic);
        Ok(())
    }

    fn render_list(&mut self, idx: usize, shape: &str, paragraph: usize, name: &str) {
        let items = match self.data.list(name) {
            Ok(Some(items)) => items,
            Ok(None) => {
                warn!(placeholder = name, "no list data, writing marker");
                Vec::new()
            },
            Err(e) => {
                warn!(placeholder = name, error = %e, "invalid list data, writing marker");
                Vec::new()
            },
        };

        let options = &self.renderer.options;
        let Some(mut tf) = self.slide.text_frame_mut(idx) else {
            return;
        };
        expand_list(&mut tf, paragraph, &items, &options.markers.empty_list);
        tf.set_auto_size(options.list_auto_size);
        tf.set_word_wrap(Some(options.list_word_wrap));

        let outcome = if items.is_empty() {
            Outcome::Marker {
                text: options.markers.empty_list.clone(),
                reason: "no list items".to_string(),
            }
        } else {
            Outcome::ListExpanded { items: items.len() }
        };
        self.report.push(self.number, shape, name, outcome);
    }

    fn render_table(&mut self, idx: usize, shape: &str, name: &str) {
        let rows = match self.data.table(name) {
            Ok(Some(rows)) if !rows.is_empty() => rows,
            Ok(_) => {
                warn!(placeholder = name, "no table data, writing marker");
                let text = Markers::render(&self.markers().table_missing, name);
                self.write_marker(idx, shape, name, text, "no data".to_string());
                return;
            },
            Err(e) => {
                warn!(placeholder = name, error = %e, "invalid table data, writing marker");
                let text = Markers::render(&self.markers().table_missing, name);
                self.write_marker(idx, shape, name, text, e.to_string());
                return;
            },
        };

        match self.insert_table(idx, &rows) {
            Ok(()) => {
                self.lifecycle.mark(idx);
                self.report
                    .push(self.number, shape, name, Outcome::TableInserted);
            },
            Err(e) => {
                warn!(placeholder = name, error = %e, "could not build table");
                let text = Markers::render(&self.markers().table_error, name);
                self.write_marker(idx, shape, name, text, e.to_string());
            },
        }
    }

    fn insert_table(&mut self, idx: usize, rows: &[Vec<String>]) -> Result<()> {
        let frame = self.frame_of(idx)?;
        let shape_id = self.slide.next_shape_id();
        let table = self.renderer.tables.build(shape_id, rows, &frame)?;
        self.slide
            .append_shape(table)
            .ok_or_else(|| Error::MalformedDocument("slide has no shape tree".to_string()))?;
        Ok(())
    }

    fn render_text(&mut self, idx: usize, shape: &str) {
        let Some(mut tf) = self.slide.text_frame_mut(idx) else {
            return;
        };
        let substituted = substitute_text(&mut tf, self.data);

        for (name, collapsed) in substituted {
            if !self.data.contains(&name) {
                debug!(placeholder = %name, "no text data, substituting empty string");
            }
            let outcome = if collapsed {
                Outcome::Collapsed
            } else {
                Outcome::Substituted
            };
            self.report.push(self.number, shape, &name, outcome);
        }
    }
}

/// Write list `items` into the text frame, starting at paragraph `donor`.
///
/// The donor paragraph is reused for the first item and each further item
/// gets a new paragraph, inserted after the previous one, carrying a copy
/// of the donor's paragraph properties. Every new run takes the font of
/// the donor's first run. With no items the donor holds `empty_marker`.
pub(crate) fn expand_list(tf: &mut TextFrameMut<'_>, donor: usize, items: &[String], empty_marker: &str) {
    let Some(donor_el) = tf.paragraph_element(donor).cloned() else {
        return;
    };
    let font = Paragraph::new(&donor_el).first_run_font();

    let mut texts = items.iter().map(String::as_str);
    let first = texts.next().unwrap_or(empty_marker);

    if let Some(mut para) = tf.paragraph_mut(donor) {
        para.clear();
        let mut run = para.add_run(first);
        if let Some(font) = &font {
            run.apply_font(font);
        }
    }

    for (offset, text) in texts.enumerate() {
        let Some(mut para) = tf.insert_paragraph_after(donor + offset) else {
            break;
        };
        clone_paragraph_properties(&donor_el, para.element_mut());
        let mut run = para.add_run(text);
        if let Some(font) = &font {
            run.apply_font(font);
        }
    }
}

/// Substitute text tokens in every paragraph of the frame.
///
/// Tokens are first replaced run by run, which leaves formatting alone.
/// A paragraph where no run held a whole token but whose joined run text
/// does is collapsed into a single run carrying the first run's font.
/// Returns each substituted name with whether its paragraph was collapsed.
pub(crate) fn substitute_text(tf: &mut TextFrameMut<'_>, data: &TemplateData) -> Vec<(String, bool)> {
    let mut substituted = Vec::new();

    for p in 0..tf.view().paragraph_count() {
        let Some(mut para) = tf.paragraph_mut(p) else {
            continue;
        };
        if !has_open_delimiter(&para.view().text()) {
            continue;
        }

        let mut replaced = false;
        para.for_each_run(|run| {
            let text = run.text();
            let (new_text, count) = substitute_textual(&text, |name| {
                substituted.push((name.to_string(), false));
                data.text(name)
            });
            if count > 0 {
                run.set_text(&new_text);
                replaced = true;
            }
        });
        if replaced {
            continue;
        }

        let joined: String = para.view().runs().map(|r| r.text()).collect();
        if !has_textual_token(&joined) {
            continue;
        }

        let font = para.view().first_run_font();
        let (new_text, _) = substitute_textual(&joined, |name| {
            substituted.push((name.to_string(), true));
            data.text(name)
        });
        para.clear();
        let mut run = para.add_run(&new_text);
        if let Some(font) = &font {
            run.apply_font(font);
        }
    }

    substituted
}
