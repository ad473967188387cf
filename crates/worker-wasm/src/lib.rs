//! WASM-compatible wrapper for presentation markup parsing.
//!
//! This crate exposes the parser to JavaScript for use in the browser and
//! in Cloudflare Workers.

use serde::{Deserialize, Serialize};
use slidemark_core::{LayoutType, SlideContent, SlideData};
use slidemark_markup::{get_fallback_image_query, ParseTier, PresentationParser};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of parsing a presentation.
#[derive(Debug, Serialize, Deserialize)]
pub struct ParseResult {
    /// Which tier extracted the slides (`"strict"` or `"fallback"` in JS).
    pub tier: ParseTier,
    /// Number of slides extracted.
    pub slide_count: usize,
    /// The slide records.
    pub slides: Vec<SlideData>,
}

/// Parse generated presentation markup.
///
/// # Arguments
/// * `markup` - Raw markup produced by the generator
/// * `title` - The presentation title
///
/// # Returns
/// A JavaScript object with the parse result, or throws when no slide could
/// be extracted.
#[wasm_bindgen]
pub fn parse_presentation(markup: &str, title: &str) -> Result<JsValue, JsValue> {
    let result = parse_presentation_impl(markup, title).map_err(|e| JsValue::from_str(&e))?;
    to_js(&result)
}

fn parse_presentation_impl(markup: &str, title: &str) -> Result<ParseResult, String> {
    let parsed = PresentationParser::new()
        .parse_detailed(markup, title)
        .map_err(|e| e.to_string())?;

    Ok(ParseResult {
        tier: parsed.tier,
        slide_count: parsed.slides.len(),
        slides: parsed.slides,
    })
}

/// Parse markup for one new slide. Never throws for bad markup; a
/// placeholder slide is returned instead.
#[wasm_bindgen]
pub fn parse_single_slide(markup: &str, slide_number: usize, title: &str) -> Result<JsValue, JsValue> {
    let slide = PresentationParser::new().parse_single(markup, slide_number, title);
    to_js(&slide)
}

/// Best-available heading of a markup fragment ("Untitled Slide" if none).
#[wasm_bindgen]
pub fn extract_heading(fragment: &str) -> String {
    slidemark_markup::extract_heading(fragment)
}

/// Generated image query for a layout type (or none) and title.
#[wasm_bindgen]
pub fn fallback_image_query(layout_type: Option<String>, title: &str) -> Result<String, JsValue> {
    fallback_image_query_impl(layout_type.as_deref(), title).map_err(|e| JsValue::from_str(&e))
}

fn fallback_image_query_impl(layout_type: Option<&str>, title: &str) -> Result<String, String> {
    let layout_type = layout_type
        .filter(|name| !name.trim().is_empty())
        .map(str::parse::<LayoutType>)
        .transpose()
        .map_err(|e| e.to_string())?;

    Ok(get_fallback_image_query(
        &SlideContent::default(),
        layout_type,
        title,
    ))
}

/// Convert to a plain JS object (maps become objects, not `Map`s).
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
