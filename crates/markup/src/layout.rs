//! Semantic content extraction for the nine layout types.
//!
//! Both parser tiers produce the same [`SlideContent`] shape: the strict tier
//! walks an [`Element`], the recovery tier runs regexes over section text.
//! Missing pieces degrade to empty values; nothing here fails.

use crate::tree::Element;
use regex::Regex;
use slidemark_core::{
    ChartContent, ChartRow, ContentItem, ItemFamily, LayoutType, SlideContent, DEFAULT_CHART_TYPE,
};
use std::sync::LazyLock;

/// Item container of a container layout.
const ITEM_TAG: &str = "DIV";

/// Cell type used when a `TD` has no `type` attribute.
const DEFAULT_CELL_TYPE: &str = "data";

static DIV_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<DIV(?:\s[^>]*)?>(.*?)</DIV>").unwrap());

static H3_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<H3(?:\s[^>]*)?>(.*?)</H3>").unwrap());

static P_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<P(?:\s[^>]*)?>(.*?)</P>").unwrap());

static ICON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<ICON\b[^>]*?\bquery=['"]([^'"]*)['"]"#).unwrap());

static CHART_TYPE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<CHART\b[^>]*?\bcharttype=['"]([^'"]*)['"]"#).unwrap());

static TR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<TR(?:\s[^>]*)?>(.*?)</TR>").unwrap());

static TD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<TD((?:\s[^>]*)?)>\s*<VALUE(?:\s[^>]*)?>(.*?)</VALUE>\s*</TD>").unwrap()
});

static TYPE_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\btype=['"]([^'"]*)['"]"#).unwrap());

static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<H[12](?:\s[^>]*)?>(.*?)</H[12]>").unwrap());

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Extract content from a layout element isolated by the strict tier.
///
/// `container` is the enclosing section; charts look there for a title
/// when the chart element has none of its own. Unknown tags yield an empty
/// body with whatever title is found.
pub fn extract_layout_content(element: &Element, container: Option<&Element>) -> SlideContent {
    let layout = LayoutType::from_tag(element.name());

    let mut title = element_title(element);
    if title.is_none() && layout == Some(LayoutType::Chart) {
        title = container.and_then(element_title);
    }

    let Some(layout) = layout else {
        return SlideContent::titled(title);
    };

    match layout.item_family() {
        Some(family) => {
            let items = element
                .find_all(ITEM_TAG)
                .filter_map(|div| item_from_element(div, family))
                .collect();
            SlideContent::items(title, family, items)
        }
        None => SlideContent::chart(title, chart_from_element(element)),
    }
}

/// Extract content for `layout` from raw section text (recovery tier).
pub fn extract_layout_content_from_markup(fragment: &str, layout: LayoutType) -> SlideContent {
    let title = extract_title_from_markup(fragment);

    match layout.item_family() {
        Some(family) => {
            let items = DIV_REGEX
                .captures_iter(fragment)
                .filter_map(|caps| item_from_markup(&caps[1], family))
                .collect();
            SlideContent::items(title, family, items)
        }
        None => SlideContent::chart(title, chart_from_markup(fragment)),
    }
}

/// First non-empty `H1`/`H2` text anywhere in the fragment.
pub fn extract_title_from_markup(fragment: &str) -> Option<String> {
    TITLE_REGEX
        .captures_iter(fragment)
        .map(|caps| plain_text(&caps[1]))
        .find(|title| !title.is_empty())
}

/// Strip tags from a markup snippet and trim it.
pub(crate) fn plain_text(snippet: &str) -> String {
    TAG_REGEX.replace_all(snippet, "").trim().to_string()
}

/// Trimmed text of the first direct `H1`, else `H2`, child.
fn element_title(element: &Element) -> Option<String> {
    ["H1", "H2"].into_iter().find_map(|tag| {
        element
            .find(tag)
            .map(|heading| heading.text().trim().to_string())
            .filter(|text| !text.is_empty())
    })
}

fn item_from_element(div: &Element, family: ItemFamily) -> Option<ContentItem> {
    let heading = div.find("H3").map(Element::text);
    let paragraphs = div.find_all("P").map(Element::text);
    let icon = match family {
        ItemFamily::Icons => div.find("ICON").and_then(|icon| icon.attr("query")),
        _ => None,
    };

    ContentItem::from_parts(heading.as_deref(), paragraphs, icon)
}

fn item_from_markup(div: &str, family: ItemFamily) -> Option<ContentItem> {
    let heading = H3_REGEX.captures(div).map(|caps| plain_text(&caps[1]));
    let paragraphs = P_REGEX.captures_iter(div).map(|caps| plain_text(&caps[1]));
    let icon = match family {
        ItemFamily::Icons => ICON_REGEX.captures(div).map(|caps| caps[1].to_string()),
        _ => None,
    };

    ContentItem::from_parts(heading.as_deref(), paragraphs, icon.as_deref())
}

fn chart_from_element(chart: &Element) -> ChartContent {
    let chart_type = chart_type_or_default(chart.attr("charttype"));

    let rows = chart
        .find("TABLE")
        .map(|table| {
            table
                .find_all("TR")
                .filter_map(|tr| {
                    let cells = tr.find_all("TD").filter_map(|td| {
                        let value = td.find("VALUE")?.text();
                        Some((td.attr("type"), value))
                    });
                    chart_row(cells)
                })
                .collect()
        })
        .unwrap_or_default();

    ChartContent { chart_type, rows }
}

fn chart_from_markup(fragment: &str) -> ChartContent {
    let chart_type = chart_type_or_default(
        CHART_TYPE_REGEX
            .captures(fragment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str()),
    );

    let rows = TR_REGEX
        .captures_iter(fragment)
        .filter_map(|tr| {
            let cells = TD_REGEX.captures_iter(&tr[1]).map(|td| {
                let cell_type = TYPE_ATTR_REGEX
                    .captures(&td[1])
                    .map(|caps| caps[1].to_string());
                (cell_type, plain_text(&td[2]))
            });
            chart_row(cells)
        })
        .collect();

    ChartContent { chart_type, rows }
}

fn chart_type_or_default(chart_type: Option<&str>) -> String {
    chart_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_CHART_TYPE)
        .to_string()
}

/// Build a row from `(cell type, value)` pairs, dropping empty cells.
/// Returns `None` when no cell survives.
fn chart_row<I, S>(cells: I) -> Option<ChartRow>
where
    I: IntoIterator<Item = (Option<S>, String)>,
    S: AsRef<str>,
{
    let mut row = ChartRow::new();
    for (cell_type, value) in cells {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        let cell_type: &str = cell_type
            .as_ref()
            .map(|t| t.as_ref())
            .unwrap_or(DEFAULT_CELL_TYPE);
        row.insert(cell_type.to_string(), value.to_string());
    }

    (!row.is_empty()).then_some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use slidemark_core::ContentBody;

    fn parse(markup: &str) -> Element {
        Element::parse_document(markup).unwrap()
    }

    const BULLETS: &str = "<BULLETS>\
        <H2>Why it matters</H2>\
        <DIV><H3>Speed</H3><P>Faster</P><P>releases</P></DIV>\
        <DIV><H3>Cost</H3><P>Lower spend</P></DIV>\
        <DIV><H3>Focus</H3><P>Less toil</P></DIV>\
        </BULLETS>";

    #[test]
    fn test_bullets_from_element() {
        let content = extract_layout_content(&parse(BULLETS), None);

        assert_eq!(content.title.as_deref(), Some("Why it matters"));
        let items = content.item_list();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].heading.as_deref(), Some("Speed"));
        assert_eq!(items[0].text, "Faster releases");
        assert!(matches!(
            content.body,
            ContentBody::Items { family: ItemFamily::Bullets, .. }
        ));
    }

    #[test]
    fn test_bullets_from_markup_match_element() {
        let from_tree = extract_layout_content(&parse(BULLETS), None);
        let from_regex = extract_layout_content_from_markup(BULLETS, LayoutType::Bullets);
        assert_eq!(from_tree, from_regex);
    }

    #[test]
    fn test_items_without_heading_or_text_are_dropped() {
        let columns = parse(
            "<COLUMNS><DIV><H3>Kept</H3></DIV><DIV><P>  </P></DIV><DIV><P>Also kept</P></DIV></COLUMNS>",
        );
        let content = extract_layout_content(&columns, None);

        let items = content.item_list();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "");
        assert_eq!(items[1].heading, None);
    }

    #[test]
    fn test_icons_capture_icon_query() {
        let markup = "<ICONS><DIV><ICON query='rocket'/><H3>Launch</H3><P>Go live</P></DIV></ICONS>";

        for content in [
            extract_layout_content(&parse(markup), None),
            extract_layout_content_from_markup(markup, LayoutType::Icons),
        ] {
            assert_eq!(content.item_list()[0].icon.as_deref(), Some("rocket"));
            assert_eq!(content.item_list()[0].heading.as_deref(), Some("Launch"));
        }
    }

    #[test]
    fn test_icon_ignored_outside_icons_layout() {
        let markup = "<BULLETS><DIV><ICON query='rocket'/><H3>Launch</H3></DIV></BULLETS>";
        let content = extract_layout_content(&parse(markup), None);
        assert_eq!(content.item_list()[0].icon, None);
    }

    #[rstest]
    #[case("CYCLE")]
    #[case("ARROWS")]
    #[case("TIMELINE")]
    #[case("PYRAMID")]
    #[case("STAIRCASE")]
    fn test_step_layouts_produce_steps(#[case] tag: &str) {
        let markup = format!("<{tag}><DIV><H3>Plan</H3><P>Scope the work</P></DIV></{tag}>");
        let content = extract_layout_content(&parse(&markup), None);

        match &content.body {
            ContentBody::Items { family, items } => {
                assert_eq!(*family, ItemFamily::Steps);
                assert_eq!(items[0].heading.as_deref(), Some("Plan"));
                assert_eq!(items[0].text, "Scope the work");
            }
            other => panic!("expected steps, got {:?}", other),
        }
    }

    const CHART: &str = "<CHART charttype='pie'><TABLE>\
        <TR><TD type='label'><VALUE>North</VALUE></TD><TD type='data'><VALUE>40</VALUE></TD></TR>\
        <TR><TD type='label'><VALUE> </VALUE></TD></TR>\
        <TR><TD><VALUE>60</VALUE></TD></TR>\
        </TABLE></CHART>";

    #[test]
    fn test_chart_rows_from_element() {
        let content = extract_layout_content(&parse(CHART), None);
        let chart = content.chart_content().unwrap();

        assert_eq!(chart.chart_type, "pie");
        assert_eq!(chart.rows.len(), 2);
        assert_eq!(chart.rows[0]["label"], "North");
        assert_eq!(chart.rows[0]["data"], "40");
        assert_eq!(chart.rows[1]["data"], "60");
    }

    #[test]
    fn test_chart_rows_from_markup_match_element() {
        assert_eq!(
            extract_layout_content_from_markup(CHART, LayoutType::Chart),
            extract_layout_content(&parse(CHART), None)
        );
    }

    #[test]
    fn test_chart_defaults_type_and_uses_section_title() {
        let section = parse("<SECTION><H1>Revenue</H1><CHART><TABLE/></CHART></SECTION>");
        let chart = section.find("CHART").unwrap();
        let content = extract_layout_content(chart, Some(&section));

        assert_eq!(content.title.as_deref(), Some("Revenue"));
        assert_eq!(content.chart_content().unwrap().chart_type, DEFAULT_CHART_TYPE);
        assert!(content.chart_content().unwrap().rows.is_empty());
    }

    #[test]
    fn test_unknown_tag_yields_title_only() {
        let content = extract_layout_content(&parse("<GALLERY><H1>Pics</H1><DIV><H3>x</H3></DIV></GALLERY>"), None);
        assert_eq!(content, SlideContent::titled(Some("Pics".to_string())));
    }

    #[test]
    fn test_title_prefers_h1_over_h2() {
        let content = extract_layout_content(&parse("<BULLETS><H2>Second</H2><H1>First</H1></BULLETS>"), None);
        assert_eq!(content.title.as_deref(), Some("First"));
    }

    #[test]
    fn test_plain_text_strips_inline_tags() {
        assert_eq!(plain_text("  Grow <B>fast</B> "), "Grow fast");
    }
}
