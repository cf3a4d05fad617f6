mod common;

use common::{Deck, PNG, body_placeholder, entry_names, para, read_entry, text_box};
use loquat::ooxml::pptx::Presentation;
use loquat::ooxml::pptx::shapes::picture::image_r_id;
use loquat::ooxml::pptx::shapes::table::table_cells;
use loquat::ooxml::pptx::shapes::{AutoSize, ShapeFrame, ShapeKind};
use loquat::ooxml::xml::XmlElement;
use loquat::template::{NoAssets, Outcome};
use loquat::{Error, MemoryAssets, RenderOptions, Renderer, TemplateData};

const BOX_FRAME: ShapeFrame = ShapeFrame {
    x: 914400,
    y: 457200,
    cx: 3657600,
    cy: 1828800,
};

fn data(json: &str) -> TemplateData {
    TemplateData::from_json_str(json).unwrap()
}

/// Paragraph texts of every text-bearing shape on slide `n` (0-based).
fn slide_texts(pres: &Presentation, n: usize) -> Vec<Vec<String>> {
    pres.slides()[n]
        .shapes()
        .filter_map(|s| s.text_frame())
        .map(|tf| tf.paragraphs().map(|p| p.text()).collect())
        .collect()
}

fn shape_kinds(pres: &Presentation, n: usize) -> Vec<ShapeKind> {
    pres.slides()[n].shapes().map(|s| s.kind()).collect()
}

#[test]
fn test_text_substitution_keeps_run_format() {
    let template = Deck::new()
        .slide(text_box(
            2,
            "Title",
            r#"<a:p><a:r><a:rPr lang="en-US" sz="2400" b="1"><a:solidFill><a:srgbClr val="1F4E79"/></a:solidFill><a:latin typeface="Georgia"/></a:rPr><a:t>Report for {{client}}</a:t></a:r><a:r><a:rPr i="1"/><a:t> ({{text:year}})</a:t></a:r></a:p>"#,
        ))
        .build();

    let rendered = Renderer::new(&NoAssets)
        .render(&template, &data(r#"{"client": "Acme", "year": 2024}"#))
        .unwrap();

    let before = Presentation::from_bytes(&template).unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(slide_texts(&after, 0), vec![vec!["Report for Acme (2024)"]]);

    let rpr = |pres: &Presentation| -> Vec<Option<XmlElement>> {
        let shape = pres.slides()[0].shapes().next().unwrap();
        let para = shape.text_frame().unwrap().paragraphs().next().unwrap();
        para.runs().map(|r| r.properties().cloned()).collect()
    };
    assert_eq!(rpr(&before), rpr(&after));
    assert!(rendered.report.is_clean());
    assert_eq!(
        rendered
            .report
            .entries
            .iter()
            .map(|e| (e.placeholder.as_str(), &e.outcome))
            .collect::<Vec<_>>(),
        vec![("client", &Outcome::Substituted), ("year", &Outcome::Substituted)]
    );
}

#[test]
fn test_unknown_names_become_empty() {
    let template = Deck::new()
        .slide(text_box(2, "Box", &para("[{{nobody}}] {{choice:tier}}")))
        .build();

    let rendered = Renderer::new(&NoAssets).render(&template, &TemplateData::new()).unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(slide_texts(&after, 0), vec![vec!["[] "]]);
}

#[test]
fn test_split_run_token_is_collapsed() {
    let template = Deck::new()
        .slide(text_box(
            2,
            "Box",
            r#"<a:p><a:r><a:rPr sz="2800"/><a:t>Dear {{</a:t></a:r><a:r><a:rPr b="1"/><a:t>client</a:t></a:r><a:r><a:t>}},</a:t></a:r></a:p>"#,
        ))
        .build();

    let rendered = Renderer::new(&NoAssets)
        .render(&template, &data(r#"{"client": "Acme"}"#))
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(slide_texts(&after, 0), vec![vec!["Dear Acme,"]]);

    let shape = after.slides()[0].shapes().next().unwrap();
    let para = shape.text_frame().unwrap().paragraphs().next().unwrap();
    assert_eq!(para.run_count(), 1);
    assert_eq!(para.first_run_font().unwrap().size, Some(2800));
    assert_eq!(rendered.report.entries[0].outcome, Outcome::Collapsed);
}

const LIST_SHAPE: &str = r#"<a:p><a:r><a:t>Agenda</a:t></a:r></a:p><a:p><a:pPr lvl="2" marL="685800"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr><a:r><a:rPr sz="1600" i="1"/><a:t>{{list:items}}</a:t></a:r></a:p><a:p><a:r><a:t>Thanks</a:t></a:r></a:p>"#;

#[test]
fn test_list_expansion() {
    let template = Deck::new().slide(text_box(2, "List", LIST_SHAPE)).build();

    let rendered = Renderer::new(&NoAssets)
        .render(&template, &data(r#"{"items": ["Intro", "  ", "Numbers", null, 3]}"#))
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(
        slide_texts(&after, 0),
        vec![vec!["Agenda", "Intro", "Numbers", "3", "Thanks"]]
    );

    let shape = after.slides()[0].shapes().next().unwrap();
    let tf = shape.text_frame().unwrap();
    for para in tf.paragraphs().skip(1).take(3) {
        assert_eq!(para.level(), 2);
        let ppr = para.properties().unwrap();
        assert_eq!(ppr.attr("marL"), Some("685800"));
        assert_eq!(ppr.child("buChar").and_then(|b| b.attr("char")), Some("\u{2022}"));
        let font = para.first_run_font().unwrap();
        assert_eq!(font.size, Some(1600));
        assert_eq!(font.italic, Some(true));
    }
    assert_eq!(tf.auto_size(), AutoSize::TextToFitShape);
    assert_eq!(tf.word_wrap(), Some(true));
    assert_eq!(
        rendered.report.entries[0].outcome,
        Outcome::ListExpanded { items: 3 }
    );
}

#[test]
fn test_missing_or_empty_list_writes_marker() {
    for json in [r#"{}"#, r#"{"items": []}"#, r#"{"items": ["", "   "]}"#, r#"{"items": 5}"#] {
        let template = Deck::new().slide(text_box(2, "List", LIST_SHAPE)).build();
        let rendered = Renderer::new(&NoAssets).render(&template, &data(json)).unwrap();
        let after = Presentation::from_bytes(&rendered.bytes).unwrap();
        assert_eq!(slide_texts(&after, 0), vec![vec!["Agenda", "None", "Thanks"]], "{}", json);
        assert!(!rendered.report.is_clean());
    }
}

#[test]
fn test_list_wins_over_text_in_the_same_shape() {
    let template = Deck::new()
        .slide(text_box(2, "Mixed", &format!("{}{}", para("{{title}}"), para("{{list:items}}"))))
        .build();
    let rendered = Renderer::new(&NoAssets)
        .render(&template, &data(r#"{"title": "T", "items": ["a", "b"]}"#))
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(slide_texts(&after, 0), vec![vec!["{{title}}", "a", "b"]]);
}

#[test]
fn test_image_replaces_shape_at_same_bounds() {
    let template = Deck::new()
        .slide(format!(
            "{}{}",
            text_box(2, "Logo", &para("{{image:logo}}")),
            text_box(3, "Caption", &para("{{caption}}")),
        ))
        .build();
    let assets = MemoryAssets::new().with("uploads/logo.png", PNG);

    let rendered = Renderer::new(&assets)
        .render(&template, &data(r#"{"logo": "uploads/logo.png", "caption": "Our logo"}"#))
        .unwrap();
    assert_eq!(rendered.report.shapes_removed, 1);
    assert!(rendered.report.is_clean());

    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(shape_kinds(&after, 0), vec![ShapeKind::Shape, ShapeKind::Picture]);
    assert_eq!(slide_texts(&after, 0), vec![vec!["Our logo"]]);

    let slide = &after.slides()[0];
    let pic = slide.shapes().nth(1).unwrap();
    assert_eq!(pic.frame(), Some(BOX_FRAME));
    assert_eq!(pic.id(), Some(4));
    assert_eq!(pic.name(), "Picture 3");

    let r_id = image_r_id(pic.element()).unwrap();
    let rels = read_entry(&rendered.bytes, "ppt/slides/_rels/slide1.xml.rels").unwrap();
    assert!(rels.contains(&format!(r#"Id="{}""#, r_id)), "{}", rels);
    assert!(rels.contains("media/image1.png"), "{}", rels);
    assert!(entry_names(&rendered.bytes).contains(&"ppt/media/image1.png".to_string()));

    let content_types = read_entry(&rendered.bytes, "[Content_Types].xml").unwrap();
    assert!(content_types.contains("image/png"));
    let slide_xml = read_entry(&rendered.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide_xml.contains("xmlns:r="));
}

#[test]
fn test_image_on_placeholder_uses_layout_geometry() {
    let template = Deck::new()
        .slide(body_placeholder(2, "Content Placeholder 1", &para("{{scrape:chart}}")))
        .build();
    let assets = MemoryAssets::new().with("chart.png", PNG);

    let rendered = Renderer::new(&assets)
        .render(&template, &data(r#"{"chart": "chart.png"}"#))
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    let pic = after.slides()[0].shapes().next().unwrap();
    assert_eq!(pic.kind(), ShapeKind::Picture);
    assert_eq!(pic.frame(), Some(ShapeFrame::new(838200, 1825625, 10515600, 4351338)));
}

#[test]
fn test_identical_images_share_one_media_part() {
    let template = Deck::new()
        .slide(text_box(2, "A", &para("{{image:first}}")))
        .slide(text_box(2, "B", &para("{{image:second}}")))
        .build();
    let assets = MemoryAssets::new().with("a.png", PNG).with("b.png", PNG);

    let rendered = Renderer::new(&assets)
        .render(&template, &data(r#"{"first": "a.png", "second": "b.png"}"#))
        .unwrap();
    let media: Vec<_> = entry_names(&rendered.bytes)
        .into_iter()
        .filter(|name| name.starts_with("ppt/media/"))
        .collect();
    assert_eq!(media, vec!["ppt/media/image1.png".to_string()]);
    assert_eq!(rendered.report.shapes_removed, 2);
}

#[test]
fn test_missing_image_keeps_shape_with_marker() {
    for json in [r#"{}"#, r#"{"logo": null}"#, r#"{"logo": ""}"#, r#"{"logo": 42}"#] {
        let template = Deck::new()
            .slide(text_box(2, "Logo", &para("{{image:logo}}")))
            .build();
        let rendered = Renderer::new(&NoAssets).render(&template, &data(json)).unwrap();
        let after = Presentation::from_bytes(&rendered.bytes).unwrap();

        assert_eq!(shape_kinds(&after, 0), vec![ShapeKind::Shape], "{}", json);
        assert_eq!(slide_texts(&after, 0), vec![vec!["Image Missing: logo"]], "{}", json);
        assert_eq!(rendered.report.shapes_removed, 0);
        assert!(!entry_names(&rendered.bytes).iter().any(|n| n.starts_with("ppt/media/")));
    }
}

#[test]
fn test_unusable_image_writes_error_marker() {
    let assets = MemoryAssets::new().with("notes.txt", b"plain text, not a picture".to_vec());
    for key in ["absent.png", "notes.txt"] {
        let template = Deck::new()
            .slide(text_box(2, "Logo", &para("{{image:logo}}")))
            .build();
        let rendered = Renderer::new(&assets)
            .render(&template, &TemplateData::new().with("logo", key))
            .unwrap();
        let after = Presentation::from_bytes(&rendered.bytes).unwrap();
        assert_eq!(slide_texts(&after, 0), vec![vec!["Image Error"]], "{}", key);

        let marker = rendered.report.markers().next().unwrap();
        assert_eq!(marker.placeholder, "logo");
        assert_eq!(marker.slide, 1);
        assert_eq!(marker.shape, "Logo");
    }
}

#[test]
fn test_failed_picture_insertion_leaves_no_media() {
    let unplaced = r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Logo"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{{image:logo}}</a:t></a:r></a:p></p:txBody></p:sp>"#;
    let template = Deck::new().slide(unplaced).build();
    let assets = MemoryAssets::new().with("logo.png", PNG);

    let rendered = Renderer::new(&assets)
        .render(&template, &TemplateData::new().with("logo", "logo.png"))
        .unwrap();

    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(shape_kinds(&after, 0), vec![ShapeKind::Shape]);
    assert_eq!(slide_texts(&after, 0), vec![vec!["Image Error"]]);
    assert!(!entry_names(&rendered.bytes).iter().any(|n| n.starts_with("ppt/media/")));

    let rels = read_entry(&rendered.bytes, "ppt/slides/_rels/slide1.xml.rels").unwrap();
    assert!(!rels.contains("relationships/image"), "{}", rels);
    assert!(!read_entry(&rendered.bytes, "[Content_Types].xml").unwrap().contains("image/png"));
}

#[test]
fn test_table_replaces_shape() {
    let template = Deck::new()
        .slide(format!(
            "{}{}",
            text_box(2, "Figures", &para("{{table:figures}}")),
            text_box(7, "Note", &para("static")),
        ))
        .build();
    let rendered = Renderer::new(&NoAssets)
        .render(
            &template,
            &data(r#"{"figures": [["Region", "Revenue"], ["North", 120], ["South", null]]}"#),
        )
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();

    assert_eq!(shape_kinds(&after, 0), vec![ShapeKind::Shape, ShapeKind::GraphicFrame]);
    let table = after.slides()[0].shapes().nth(1).unwrap();
    assert_eq!(table.frame(), Some(BOX_FRAME));
    assert_eq!(table.id(), Some(8));
    assert_eq!(
        table_cells(table.element()).unwrap(),
        vec![
            vec!["Region".to_string(), "Revenue".to_string()],
            vec!["North".to_string(), "120".to_string()],
            vec!["South".to_string(), String::new()],
        ]
    );
    assert_eq!(rendered.report.entries[0].outcome, Outcome::TableInserted);
}

#[test]
fn test_table_markers() {
    for json in [r#"{}"#, r#"{"figures": []}"#, r#"{"figures": "x"}"#] {
        let template = Deck::new()
            .slide(text_box(2, "Figures", &para("{{table:figures}}")))
            .build();
        let rendered = Renderer::new(&NoAssets).render(&template, &data(json)).unwrap();
        let after = Presentation::from_bytes(&rendered.bytes).unwrap();
        assert_eq!(slide_texts(&after, 0), vec![vec!["Table Missing: figures"]], "{}", json);
    }

    let failing = |_: u32, _: &[Vec<String>], _: &ShapeFrame| -> loquat::Result<XmlElement> {
        Err(Error::TableBuild("too wide".to_string()))
    };
    let template = Deck::new()
        .slide(text_box(2, "Figures", &para("{{table:figures}}")))
        .build();
    let rendered = Renderer::new(&NoAssets)
        .with_table_builder(&failing)
        .render(&template, &data(r#"{"figures": [["a"]]}"#))
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(shape_kinds(&after, 0), vec![ShapeKind::Shape]);
    assert_eq!(slide_texts(&after, 0), vec![vec!["Table Error"]]);
}

#[test]
fn test_configured_markers() {
    let options = RenderOptions::from_yaml_str(
        "list_word_wrap: false\nmarkers:\n  empty_list: \"(none)\"\n  image_missing: \"Upload {name}\"\n",
    )
    .unwrap();
    let template = Deck::new()
        .slide(format!(
            "{}{}",
            text_box(2, "List", &para("{{list:items}}")),
            text_box(3, "Logo", &para("{{image:logo}}")),
        ))
        .build();

    let rendered = Renderer::new(&NoAssets)
        .with_options(options)
        .render(&template, &TemplateData::new())
        .unwrap();
    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(slide_texts(&after, 0), vec![vec!["(none)"], vec!["Upload logo"]]);

    let list = after.slides()[0].shapes().next().unwrap();
    assert_eq!(list.text_frame().unwrap().word_wrap(), Some(false));
}

#[test]
fn test_untouched_parts_are_preserved() {
    let template = Deck::new()
        .slide(text_box(2, "Box", &para("{{client}}")))
        .slide(text_box(2, "Plain", &para("no tokens here")))
        .build();
    let rendered = Renderer::new(&NoAssets)
        .render(&template, &data(r#"{"client": "Acme"}"#))
        .unwrap();

    let layout = "ppt/slideLayouts/slideLayout1.xml";
    assert_eq!(read_entry(&template, layout), read_entry(&rendered.bytes, layout));

    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(after.slide_count(), 2);
    assert_eq!(slide_texts(&after, 1), vec![vec!["no tokens here"]]);
}

#[test]
fn test_render_is_stable_on_output() {
    let template = Deck::new()
        .slide(format!(
            "{}{}",
            text_box(2, "Box", &para("{{client}}")),
            text_box(3, "List", &para("{{list:items}}")),
        ))
        .build();
    let values = data(r#"{"client": "Acme", "items": ["one"]}"#);
    let first = loquat::render(&template, &values, &NoAssets).unwrap();
    let second = loquat::render(&first, &values, &NoAssets).unwrap();

    let a = Presentation::from_bytes(&first).unwrap();
    let b = Presentation::from_bytes(&second).unwrap();
    assert_eq!(slide_texts(&a, 0), slide_texts(&b, 0));
}

#[test]
fn test_control_characters_are_written_as_xstring_escapes() {
    let template = Deck::new().slide(text_box(2, "Box", &para("{{name}}"))).build();
    let values = TemplateData::new().with("name", "line1\u{000B}line2\u{0001}");
    let rendered = Renderer::new(&NoAssets).render(&template, &values).unwrap();

    let slide_xml = read_entry(&rendered.bytes, "ppt/slides/slide1.xml").unwrap();
    assert!(slide_xml.contains("line1_x000B_line2_x0001_</a:t>"), "{}", slide_xml);
    assert!(!slide_xml.contains('\u{000B}'));
    assert!(!slide_xml.contains('\u{0001}'));

    let after = Presentation::from_bytes(&rendered.bytes).unwrap();
    assert_eq!(slide_texts(&after, 0), vec![vec!["line1_x000B_line2_x0001_"]]);
}

#[test]
fn test_render_rejects_malformed_document() {
    let err = Renderer::new(&NoAssets)
        .render(b"not a presentation at all", &TemplateData::new())
        .unwrap_err();
    assert!(matches!(err, Error::MalformedDocument(_)), "{:?}", err);
}
