//! Presentation parser: sanitize, try the strict tier, fall back to regexes.

use crate::fallback::parse_fallback;
use crate::strict::parse_strict;
use serde::{Deserialize, Serialize};
use slidemark_core::{
    sanitize, ContentItem, Error, ItemFamily, LayoutType, Result, SlideContent, SlideData,
};

/// Section layout of synthesized placeholder slides.
const PLACEHOLDER_SECTION_LAYOUT: &str = "vertical";

/// Headings and ordinal words of the placeholder bullets.
const PLACEHOLDER_POINTS: [(&str, &str); 3] = [
    ("Key Point 1", "First"),
    ("Key Point 2", "Second"),
    ("Key Point 3", "Third"),
];

/// Which tier produced a parse result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseTier {
    Strict,
    Fallback,
}

/// Slides together with the tier that extracted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPresentation {
    pub tier: ParseTier,
    pub slides: Vec<SlideData>,
}

/// Parser for AI-generated presentation markup.
#[derive(Debug, Clone)]
pub struct PresentationParser {
    /// Whether the regex recovery tier runs after a strict failure.
    fallback: bool,
}

impl PresentationParser {
    /// Create a parser with the recovery tier enabled.
    pub fn new() -> Self {
        Self { fallback: true }
    }

    /// Enable or disable the regex recovery tier.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }

    /// Parse a whole presentation.
    ///
    /// Returns [`Error::ExtractionFailed`] when neither tier finds a slide.
    pub fn parse(&self, raw_markup: &str, title: &str) -> Result<Vec<SlideData>> {
        self.parse_detailed(raw_markup, title)
            .map(|parsed| parsed.slides)
    }

    /// Parse a whole presentation, reporting which tier succeeded.
    pub fn parse_detailed(&self, raw_markup: &str, title: &str) -> Result<ParsedPresentation> {
        let sanitized = sanitize(raw_markup);

        let strict_error = match parse_strict(&sanitized) {
            Ok(slides) if !slides.is_empty() => {
                log::debug!("strict tier extracted {} slides for '{}'", slides.len(), title);
                return Ok(ParsedPresentation {
                    tier: ParseTier::Strict,
                    slides,
                });
            }
            Ok(_) => {
                log::warn!("strict tier found no sections for '{}'", title);
                Error::ExtractionFailed
            }
            Err(e) => {
                log::warn!("strict tier failed for '{}': {}", title, e);
                e
            }
        };

        if !self.fallback {
            return Err(strict_error);
        }

        let slides = parse_fallback(&sanitized);
        if slides.is_empty() {
            log::warn!("fallback tier found no sections for '{}'", title);
            return Err(Error::ExtractionFailed);
        }

        log::debug!("fallback tier extracted {} slides for '{}'", slides.len(), title);
        Ok(ParsedPresentation {
            tier: ParseTier::Fallback,
            slides,
        })
    }

    /// Parse markup for one slide being added to an existing presentation.
    ///
    /// Never fails: when nothing can be extracted, a placeholder bullet slide
    /// seeded from `title` is returned instead.
    pub fn parse_single(&self, raw_markup: &str, slide_number: usize, title: &str) -> SlideData {
        let slide = match self.parse(raw_markup, title) {
            Ok(slides) => {
                if slides.len() > 1 {
                    log::warn!(
                        "expected one section for slide {}, found {}; keeping the first",
                        slide_number,
                        slides.len()
                    );
                }
                slides.into_iter().next()
            }
            Err(e) => {
                log::warn!("slide {} could not be parsed: {}", slide_number, e);
                None
            }
        };

        match slide {
            Some(mut slide) => {
                slide.slide_number = slide_number;
                slide
            }
            None => {
                log::warn!("synthesizing placeholder for slide {} ('{}')", slide_number, title);
                placeholder_slide(slide_number, title)
            }
        }
    }
}

impl Default for PresentationParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A generic three-point bullet slide seeded from `title`.
///
/// The title is normalized the way the sanitizer would normalize it, so the
/// slide's `raw_markup` parses back to the same content.
pub fn placeholder_slide(slide_number: usize, title: &str) -> SlideData {
    let title = markup_text(title);
    let title = title.trim();

    let items: Vec<ContentItem> = PLACEHOLDER_POINTS
        .iter()
        .filter_map(|(heading, ordinal)| {
            let text = format!("{} important aspect of {}", ordinal, title);
            ContentItem::from_parts(Some(*heading), [text], None)
        })
        .collect();

    let content = SlideContent::items(
        (!title.is_empty()).then(|| title.to_string()),
        ItemFamily::Bullets,
        items,
    );

    SlideData::new(
        slide_number,
        PLACEHOLDER_SECTION_LAYOUT,
        placeholder_markup(&content),
    )
    .with_layout(Some(LayoutType::Bullets), content)
}

/// Markup in the known vocabulary that parses back to `content`.
fn placeholder_markup(content: &SlideContent) -> String {
    let mut markup = format!("<SECTION layout='{}'><BULLETS>", PLACEHOLDER_SECTION_LAYOUT);

    if let Some(title) = &content.title {
        markup.push_str(&format!("<H1>{}</H1>", markup_text(title)));
    }

    for item in content.item_list() {
        markup.push_str("<DIV>");
        if let Some(heading) = &item.heading {
            markup.push_str(&format!("<H3>{}</H3>", markup_text(heading)));
        }
        markup.push_str(&format!("<P>{}</P></DIV>", markup_text(&item.text)));
    }

    markup.push_str("</BULLETS></SECTION>");
    markup
}

/// Text made safe for the markup vocabulary, the way the sanitizer would.
fn markup_text(text: &str) -> String {
    text.replace('"', "'")
        .replace('&', "and")
        .replace(['<', '>'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
        <PRESENTATION>\n\
          <SECTION layout=\"left\">\n\
            <BULLETS>\n\
              <H1>Goals</H1>\n\
              <DIV><H3>Grow</H3><P>Double users</P></DIV>\n\
            </BULLETS>\n\
            <IMG query=\"growth chart\"/>\n\
          </SECTION>\n\
          <SECTION layout=\"right\">\n\
            <TIMELINE><DIV><H3>Q1</H3><P>Launch</P></DIV></TIMELINE>\n\
          </SECTION>\n\
        </PRESENTATION>";

    #[test]
    fn test_well_formed_uses_strict_tier() {
        let parsed = PresentationParser::new()
            .parse_detailed(WELL_FORMED, "Plan")
            .unwrap();

        assert_eq!(parsed.tier, ParseTier::Strict);
        assert_eq!(parsed.slides.len(), 2);
        assert_eq!(parsed.slides[0].img_queries, vec!["growth chart"]);
        assert_eq!(parsed.slides[1].layout_type, Some(LayoutType::Timeline));
    }

    #[test]
    fn test_malformed_falls_back() {
        let raw = "Here is your deck:\n<SECTION layout='left'><BULLETS><DIV><H3>A</H3><P>a</P></DIV></BULLETS></SECTION>\
                   <SECTION layout='right'><COLUMNS><DIV><H3>B</H3></DIV></COLUMNS>";
        let parsed = PresentationParser::new().parse_detailed(raw, "Deck").unwrap();

        assert_eq!(parsed.tier, ParseTier::Fallback);
        assert_eq!(parsed.slides.len(), 1);
        assert_eq!(parsed.slides[0].layout_type, Some(LayoutType::Bullets));
    }

    #[test]
    fn test_fallback_disabled_returns_strict_error() {
        let raw = "<SECTION layout='left'><BULLETS></SECTION>";
        let result = PresentationParser::new().with_fallback(false).parse(raw, "Deck");
        assert!(matches!(result, Err(Error::XmlError(_))));
    }

    #[test]
    fn test_degenerate_input_fails() {
        let parser = PresentationParser::new();
        assert!(matches!(parser.parse("", "Deck"), Err(Error::ExtractionFailed)));
        assert!(matches!(
            parser.parse("<PRESENTATION><H1>Nothing</H1></PRESENTATION>", "Deck"),
            Err(Error::ExtractionFailed)
        ));
    }

    #[test]
    fn test_parse_single_renumbers() {
        let slide = PresentationParser::new().parse_single(
            "<SECTION layout='right'><ICONS><DIV><ICON query='star'/><H3>Win</H3></DIV></ICONS></SECTION>",
            7,
            "Awards",
        );

        assert_eq!(slide.slide_number, 7);
        assert_eq!(slide.section_layout, "right");
        assert_eq!(slide.layout_type, Some(LayoutType::Icons));
        assert_eq!(slide.content.item_list()[0].icon.as_deref(), Some("star"));
    }

    #[test]
    fn test_parse_single_placeholder_on_empty() {
        let slide = PresentationParser::new().parse_single("", 4, "Pricing");

        assert_eq!(slide.slide_number, 4);
        assert_eq!(slide.layout_type, Some(LayoutType::Bullets));
        assert_eq!(slide.section_layout, "vertical");
        assert!(!slide.has_images);
        assert_eq!(slide.content.title.as_deref(), Some("Pricing"));

        let items = slide.content.item_list();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].heading.as_deref(), Some("Key Point 1"));
        assert_eq!(items[2].text, "Third important aspect of Pricing");
    }

    #[test]
    fn test_placeholder_markup_reparses_to_same_content() {
        let parser = PresentationParser::new();

        for title in ["Market Fit", "  ", "", "Say \"hi\"", "R&D <beta> 'core'"] {
            let placeholder = placeholder_slide(2, title);
            let reparsed = parser.parse_single(&placeholder.raw_markup, 2, title);
            assert_eq!(reparsed.content, placeholder.content, "title {:?}", title);
            assert_eq!(reparsed.layout_type, placeholder.layout_type);
        }
    }

    #[test]
    fn test_placeholder_with_blank_title_has_trimmed_text() {
        let placeholder = placeholder_slide(1, "  ");

        assert_eq!(placeholder.content.title, None);
        assert_eq!(placeholder.content.item_list()[0].text, "First important aspect of");
    }

    #[test]
    fn test_placeholder_title_normalized_like_sanitizer() {
        let placeholder = placeholder_slide(1, "Say \"hi\" & wave");
        assert_eq!(placeholder.content.title.as_deref(), Some("Say 'hi' and wave"));
    }

    #[test]
    fn test_markup_text_strips_unsafe_characters() {
        assert_eq!(markup_text("R&D <beta>"), "RandD beta");
        assert_eq!(markup_text("\"quoted\""), "'quoted'");
    }
}
