//! Best-available heading for a markup fragment.

use crate::layout::plain_text;
use crate::tree::Element;
use regex::Regex;
use slidemark_core::SlideData;
use std::sync::LazyLock;

/// Heading returned when a fragment has none.
pub const UNTITLED_SLIDE: &str = "Untitled Slide";

static H1_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<H1>(.*?)</H1>").unwrap());
static H2_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<H2>(.*?)</H2>").unwrap());
static H3_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<H3>(.*?)</H3>").unwrap());

/// Find the heading of a fragment.
///
/// Tries `H1`, `H2`, then `H3` as plain regex matches (so malformed markup
/// still works), then parses the fragment and searches the tree, including
/// `H3`s nested in `DIV` items. Falls back to [`UNTITLED_SLIDE`]; never fails.
pub fn extract_heading(fragment: &str) -> String {
    for regex in [&H1_REGEX, &H2_REGEX, &H3_REGEX] {
        let found = regex
            .captures_iter(fragment)
            .map(|caps| plain_text(&caps[1]))
            .find(|heading| !heading.is_empty());
        if let Some(heading) = found {
            return heading;
        }
    }

    match Element::parse_document(fragment) {
        Ok(root) => structural_heading(&root).unwrap_or_else(|| UNTITLED_SLIDE.to_string()),
        Err(e) => {
            log::debug!("heading fallback could not parse fragment: {}", e);
            UNTITLED_SLIDE.to_string()
        }
    }
}

fn structural_heading(root: &Element) -> Option<String> {
    let elements: Vec<&Element> = std::iter::once(root).chain(root.descendants()).collect();
    let non_empty = |element: &Element| {
        let text = element.text().trim().to_string();
        (!text.is_empty()).then_some(text)
    };

    ["H1", "H2", "H3"]
        .into_iter()
        .find_map(|tag| {
            elements
                .iter()
                .filter(|e| e.name() == tag)
                .find_map(|e| non_empty(*e))
        })
        .or_else(|| {
            elements
                .iter()
                .filter(|e| e.name() == "DIV")
                .filter_map(|div| div.find("H3"))
                .find_map(non_empty)
        })
}

/// Heading lookup on slide records.
pub trait SlideHeading {
    /// The heading shown for this slide in navigation and exports.
    fn heading(&self) -> String;
}

impl SlideHeading for SlideData {
    fn heading(&self) -> String {
        extract_heading(&self.raw_markup)
    }
}
