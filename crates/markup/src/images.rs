//! Image search queries: collection from slides and fallback generation.

use crate::tree::Element;
use regex::Regex;
use slidemark_core::{LayoutType, SlideContent, SlideData};
use std::sync::LazyLock;

/// Image tag carrying a search query.
const IMG_TAG: &str = "IMG";

static IMG_QUERY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<IMG\b[^>]*?\bquery=['"]([^'"]*)['"][^>]*?/?>"#).unwrap()
});

/// Collect image queries from a section.
///
/// Queries on direct `IMG` children come first, then those nested inside the
/// section's other children. Blank queries are skipped.
pub fn collect_image_queries(section: &Element) -> Vec<String> {
    let direct = section.find_all(IMG_TAG).filter_map(image_query);

    let nested = section
        .elements()
        .filter(|child| child.name() != IMG_TAG)
        .flat_map(|child| child.descendants())
        .filter(|element| element.name() == IMG_TAG)
        .filter_map(image_query);

    direct.chain(nested).collect()
}

/// Scan raw section text for image queries, in document order.
pub fn scan_image_queries(fragment: &str) -> Vec<String> {
    IMG_QUERY_REGEX
        .captures_iter(fragment)
        .map(|caps| caps[1].trim().to_string())
        .filter(|query| !query.is_empty())
        .collect()
}

fn image_query(img: &Element) -> Option<String> {
    img.attr("query")
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_string)
}

/// Generate a deterministic image query for a slide that embedded none.
///
/// Uses a per-layout template around the presentation title. When the title
/// is blank, the slide's own content title seeds the template instead.
pub fn get_fallback_image_query(
    content: &SlideContent,
    layout_type: Option<LayoutType>,
    title: &str,
) -> String {
    let title = match title.trim() {
        "" => content.title.as_deref().unwrap_or_default().trim(),
        title => title,
    };

    match layout_type {
        Some(LayoutType::Columns) => {
            format!("comparison infographic {} business presentation", title)
        }
        Some(LayoutType::Bullets) => format!("key points checklist {} business meeting", title),
        Some(LayoutType::Icons) => format!("modern icons dashboard {} technology", title),
        Some(LayoutType::Timeline) => format!("timeline roadmap {} business planning", title),
        Some(LayoutType::Chart) => format!("data visualization charts {} analytics", title),
        Some(LayoutType::Cycle) => format!("process workflow diagram {} business", title),
        Some(LayoutType::Arrows) => format!("process flow arrows {} business strategy", title),
        Some(LayoutType::Pyramid) => {
            format!("hierarchy pyramid structure {} organization", title)
        }
        Some(LayoutType::Staircase) => {
            format!("progressive steps growth {} business success", title)
        }
        None => format!("professional presentation {}", title),
    }
}

/// The query an image resolver should use for a slide: its first embedded
/// query, or a generated fallback.
pub fn primary_image_query(slide: &SlideData, title: &str) -> String {
    match slide.img_queries.first() {
        Some(query) => query.clone(),
        None => get_fallback_image_query(&slide.content, slide.layout_type, title),
    }
}
