//! Two-tier parser for AI-generated presentation markup.
//!
//! Markup is sanitized, then parsed as a tree. When the tree parse fails a
//! regex recovery tier extracts whatever sections it can find.

pub mod fallback;
pub mod heading;
pub mod images;
pub mod layout;
pub mod parser;
pub mod strict;
pub mod tree;

pub use fallback::parse_fallback;
pub use heading::{extract_heading, SlideHeading, UNTITLED_SLIDE};
pub use images::{
    collect_image_queries, get_fallback_image_query, primary_image_query, scan_image_queries,
};
pub use layout::{extract_layout_content, extract_layout_content_from_markup};
pub use parser::{placeholder_slide, ParseTier, ParsedPresentation, PresentationParser};
pub use strict::parse_strict;
pub use tree::Element;
