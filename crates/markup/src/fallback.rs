//! Recovery tier: regex extraction for markup the strict tier rejected.

use crate::images::scan_image_queries;
use crate::layout::{extract_layout_content_from_markup, extract_title_from_markup};
use regex::Regex;
use slidemark_core::{LayoutType, SlideContent, SlideData, DEFAULT_SECTION_LAYOUT};
use std::sync::LazyLock;

/// A `SECTION` span, or a self-closing `SECTION` (no inner group).
static SECTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<SECTION\b([^>]*?)(?:/>|>(.*?)</SECTION>)").unwrap()
});

static LAYOUT_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\blayout=['"]([^'"]*)['"]"#).unwrap());

/// Extract slides from sanitized markup with regexes.
///
/// Each `<SECTION ...>...</SECTION>` span, or self-closing `<SECTION .../>`,
/// becomes one slide. Returns an empty
/// list when no section matches; never fails.
pub fn parse_fallback(sanitized: &str) -> Vec<SlideData> {
    SECTION_REGEX
        .captures_iter(sanitized)
        .enumerate()
        .map(|(idx, caps)| {
            let attributes = caps.get(1).map_or("", |m| m.as_str());
            let inner = caps.get(2).map_or("", |m| m.as_str());
            slide_from_span(idx + 1, attributes, inner)
        })
        .collect()
}

fn slide_from_span(slide_number: usize, attributes: &str, inner: &str) -> SlideData {
    let section_layout = LAYOUT_ATTR_REGEX
        .captures(attributes)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_SECTION_LAYOUT, |m| m.as_str());

    let raw_markup = format!("<SECTION layout='{}'>{}</SECTION>", section_layout, inner);
    let mut slide = SlideData::new(slide_number, section_layout, raw_markup);
    slide.set_image_queries(scan_image_queries(inner));

    let layout_type = detect_layout_type(inner);
    let content = match layout_type {
        Some(layout) => extract_layout_content_from_markup(inner, layout),
        None => SlideContent::titled(extract_title_from_markup(inner)),
    };

    log::debug!(
        "fallback: slide {} layout={} type={:?} images={}",
        slide_number,
        section_layout,
        layout_type,
        slide.img_queries.len()
    );

    slide.with_layout(layout_type, content)
}

/// First layout type, in [`LayoutType::DETECTION_ORDER`], whose opening tag
/// appears in the fragment.
pub fn detect_layout_type(fragment: &str) -> Option<LayoutType> {
    LayoutType::DETECTION_ORDER
        .into_iter()
        .find(|layout| has_opening_tag(fragment, layout.tag()))
}

fn has_opening_tag(fragment: &str, tag: &str) -> bool {
    let open = format!("<{}", tag);
    fragment.match_indices(&open).any(|(pos, _)| {
        match fragment[pos + open.len()..].chars().next() {
            Some(c) => c == '>' || c == '/' || c.is_whitespace(),
            None => false,
        }
    })
}
