//! Strict tier: tree-based parse of sanitized markup.

use crate::images::collect_image_queries;
use crate::layout::extract_layout_content;
use crate::tree::Element;
use slidemark_core::{LayoutType, Result, SlideData, DEFAULT_SECTION_LAYOUT};
use std::borrow::Cow;

/// Declaration prepended when the markup has none.
pub const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Element holding one slide.
pub const SECTION_TAG: &str = "SECTION";

/// Parse sanitized markup as a tree and extract one slide per `SECTION`.
///
/// Sections are the document element's `SECTION` children, or the document
/// element itself when it is a `SECTION`. Any structural error fails the
/// whole call; no partial slide list is returned.
pub fn parse_strict(sanitized: &str) -> Result<Vec<SlideData>> {
    let document = if sanitized.starts_with("<?xml") {
        Cow::Borrowed(sanitized)
    } else {
        Cow::Owned(format!("{}\n{}", XML_DECLARATION, sanitized))
    };

    let root = Element::parse_document(&document)?;

    let sections: Vec<&Element> = if root.name() == SECTION_TAG {
        vec![&root]
    } else {
        root.find_all(SECTION_TAG).collect()
    };

    let slides = sections
        .into_iter()
        .enumerate()
        .map(|(idx, section)| slide_from_section(section, idx + 1, &document))
        .collect();

    Ok(slides)
}

fn slide_from_section(section: &Element, slide_number: usize, document: &str) -> SlideData {
    let section_layout = section.attr("layout").unwrap_or(DEFAULT_SECTION_LAYOUT);
    let slide = SlideData::new(slide_number, section_layout, section.source(document));

    let layout_child = section
        .elements()
        .find_map(|child| LayoutType::from_tag(child.name()).map(|layout| (layout, child)));

    let mut slide = match layout_child {
        Some((layout, child)) => {
            slide.with_layout(Some(layout), extract_layout_content(child, Some(section)))
        }
        // No layout body; keep whatever title the section itself carries
        None => slide.with_layout(None, extract_layout_content(section, None)),
    };

    slide.set_image_queries(collect_image_queries(section));

    log::debug!(
        "strict: slide {} layout={} type={:?} images={}",
        slide.slide_number,
        slide.section_layout,
        slide.layout_type,
        slide.img_queries.len()
    );

    slide
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidemark_core::{sanitize, Error};

    #[test]
    fn test_sections_numbered_in_order() {
        let markup = "<PRESENTATION>\
            <SECTION layout='left'><BULLETS><DIV><H3>A</H3></DIV></BULLETS></SECTION>\
            <SECTION layout='right'><CHART charttype='pie'><TABLE/></CHART></SECTION>\
            <SECTION><ICONS/></SECTION>\
            </PRESENTATION>";
        let slides = parse_strict(markup).unwrap();

        let numbers: Vec<usize> = slides.iter().map(|s| s.slide_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(slides[0].layout_type, Some(LayoutType::Bullets));
        assert_eq!(slides[1].layout_type, Some(LayoutType::Chart));
        assert_eq!(slides[2].section_layout, DEFAULT_SECTION_LAYOUT);
    }

    #[test]
    fn test_raw_markup_is_section_source() {
        let markup = "<PRESENTATION>\n  <SECTION layout='vertical'><H1>Intro</H1></SECTION>\n</PRESENTATION>";
        let slides = parse_strict(markup).unwrap();
        assert_eq!(
            slides[0].raw_markup,
            "<SECTION layout='vertical'><H1>Intro</H1></SECTION>"
        );
    }

    #[test]
    fn test_section_without_layout_child_keeps_title() {
        let slides =
            parse_strict("<PRESENTATION><SECTION layout='left'><H1>Intro</H1></SECTION></PRESENTATION>")
                .unwrap();
        assert_eq!(slides[0].layout_type, None);
        assert_eq!(slides[0].content.title.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_first_layout_child_wins() {
        let slides = parse_strict(
            "<SECTION layout='left'><COLUMNS><DIV><H3>A</H3></DIV></COLUMNS><BULLETS><DIV><H3>B</H3></DIV></BULLETS></SECTION>",
        )
        .unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].layout_type, Some(LayoutType::Columns));
    }

    #[test]
    fn test_image_flags() {
        let slides = parse_strict(
            "<PRESENTATION>\
             <SECTION layout='left'><IMG query='forest'/><BULLETS/></SECTION>\
             <SECTION layout='right'><BULLETS/></SECTION>\
             </PRESENTATION>",
        )
        .unwrap();

        assert!(slides[0].has_images);
        assert_eq!(slides[0].img_queries, vec!["forest"]);
        assert!(!slides[1].has_images);
        assert!(slides[1].img_queries.is_empty());
    }

    #[test]
    fn test_malformed_markup_fails() {
        let result = parse_strict("<PRESENTATION><SECTION layout='left'><BULLETS></SECTION></PRESENTATION>");
        assert!(matches!(result, Err(Error::XmlError(_))));
    }

    #[test]
    fn test_sanitized_defects_parse() {
        let raw = "<PRESENTATION><SECTION layout=\"left\"\"><H1>R & D</H1><IMG query=\"lab\"\"/></SECTION></PRESENTATION>";
        assert!(parse_strict(raw).is_err());

        let slides = parse_strict(&sanitize(raw)).unwrap();
        assert_eq!(slides[0].content.title.as_deref(), Some("R and D"));
        assert_eq!(slides[0].img_queries, vec!["lab"]);
    }
}
