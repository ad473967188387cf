//! Domain types for slides extracted from generated presentation markup.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Section layout used when a `SECTION` carries no `layout` attribute.
pub const DEFAULT_SECTION_LAYOUT: &str = "left";

/// Chart type used when a `CHART` element has no `charttype` attribute.
pub const DEFAULT_CHART_TYPE: &str = "vertical-bar";

/// One slide extracted from a presentation document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideData {
    /// 1-based slide number, assigned in extraction order.
    pub slide_number: usize,

    /// Image placement (`left`, `right`, `vertical`, or whatever the markup said).
    pub section_layout: String,

    /// Which content shape the slide body uses, if one was recognized.
    pub layout_type: Option<LayoutType>,

    /// Semantic content of the slide body.
    pub content: SlideContent,

    /// Image search queries in discovery order.
    pub img_queries: Vec<String>,

    /// Always equal to `!img_queries.is_empty()`.
    pub has_images: bool,

    /// Markup of this one section, as it appeared in the parsed text.
    #[serde(alias = "xml_content")]
    pub raw_markup: String,
}

impl SlideData {
    /// Create an empty slide shell with no layout type and no images.
    pub fn new(
        slide_number: usize,
        section_layout: impl Into<String>,
        raw_markup: impl Into<String>,
    ) -> Self {
        Self {
            slide_number,
            section_layout: section_layout.into(),
            layout_type: None,
            content: SlideContent::default(),
            img_queries: Vec::new(),
            has_images: false,
            raw_markup: raw_markup.into(),
        }
    }

    /// Set the recognized layout type together with its extracted content.
    pub fn with_layout(mut self, layout_type: Option<LayoutType>, content: SlideContent) -> Self {
        self.layout_type = layout_type;
        self.content = content;
        self
    }

    /// Replace the image queries, keeping `has_images` in sync.
    pub fn set_image_queries(&mut self, queries: Vec<String>) {
        self.img_queries = queries;
        self.has_images = !self.img_queries.is_empty();
    }

    /// Append one image query.
    pub fn add_image_query(&mut self, query: impl Into<String>) {
        self.img_queries.push(query.into());
        self.has_images = true;
    }
}

/// The nine content shapes a section body can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutType {
    Columns,
    Bullets,
    Icons,
    Cycle,
    Arrows,
    Timeline,
    Pyramid,
    Staircase,
    Chart,
}

impl LayoutType {
    /// All layout types, in vocabulary order.
    pub const ALL: [LayoutType; 9] = [
        LayoutType::Columns,
        LayoutType::Bullets,
        LayoutType::Icons,
        LayoutType::Cycle,
        LayoutType::Arrows,
        LayoutType::Timeline,
        LayoutType::Pyramid,
        LayoutType::Staircase,
        LayoutType::Chart,
    ];

    /// Order in which the regex recovery tier probes for layout tags.
    /// The first tag present wins.
    pub const DETECTION_ORDER: [LayoutType; 9] = [
        LayoutType::Bullets,
        LayoutType::Columns,
        LayoutType::Icons,
        LayoutType::Timeline,
        LayoutType::Chart,
        LayoutType::Cycle,
        LayoutType::Arrows,
        LayoutType::Pyramid,
        LayoutType::Staircase,
    ];

    /// Look up a layout type by its markup tag name (`"BULLETS"`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|layout| layout.tag() == tag)
    }

    /// The markup tag for this layout type.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Columns => "COLUMNS",
            Self::Bullets => "BULLETS",
            Self::Icons => "ICONS",
            Self::Cycle => "CYCLE",
            Self::Arrows => "ARROWS",
            Self::Timeline => "TIMELINE",
            Self::Pyramid => "PYRAMID",
            Self::Staircase => "STAIRCASE",
            Self::Chart => "CHART",
        }
    }

    /// Lowercase name, as stored on slide records.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Columns => "columns",
            Self::Bullets => "bullets",
            Self::Icons => "icons",
            Self::Cycle => "cycle",
            Self::Arrows => "arrows",
            Self::Timeline => "timeline",
            Self::Pyramid => "pyramid",
            Self::Staircase => "staircase",
            Self::Chart => "chart",
        }
    }

    /// The item family for container-of-items layouts, `None` for charts.
    pub fn item_family(self) -> Option<ItemFamily> {
        match self {
            Self::Columns => Some(ItemFamily::Columns),
            Self::Bullets => Some(ItemFamily::Bullets),
            Self::Icons => Some(ItemFamily::Icons),
            Self::Cycle | Self::Arrows | Self::Timeline | Self::Pyramid | Self::Staircase => {
                Some(ItemFamily::Steps)
            }
            Self::Chart => None,
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = Error;

    /// Accepts either the record name or the tag name, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|layout| layout.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownLayoutType(name.to_string()))
    }
}

/// How the items of a container layout are named in slide records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemFamily {
    Columns,
    Bullets,
    Icons,
    /// Cycle, arrows, timeline, pyramid and staircase share this shape.
    Steps,
}

impl ItemFamily {
    /// The content field holding the items.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Columns => "columns",
            Self::Bullets => "bullets",
            Self::Icons => "icons",
            Self::Steps => "steps",
        }
    }
}

/// One item of a container layout (a column, bullet, icon, or step).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentItem {
    /// Short heading (`title` for steps).
    pub heading: Option<String>,

    /// Body paragraphs joined with single spaces (`description` for most families).
    pub text: String,

    /// Icon query, only present for icon layouts.
    pub icon: Option<String>,
}

impl ContentItem {
    /// Build an item from its raw parts.
    ///
    /// Heading and paragraphs are trimmed and empty paragraphs are skipped.
    /// Returns `None` when the item has neither heading nor body text.
    pub fn from_parts<I, S>(heading: Option<&str>, paragraphs: I, icon: Option<&str>) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let heading = heading
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string);

        let text = paragraphs
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if heading.is_none() && text.is_empty() {
            return None;
        }

        let icon = icon
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .map(str::to_string);

        Some(Self { heading, text, icon })
    }
}

/// One chart row: cell type (`label`, `data`, ...) to cell value.
pub type ChartRow = BTreeMap<String, String>;

/// Tabular content of a chart layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartContent {
    pub chart_type: String,
    pub rows: Vec<ChartRow>,
}

impl Default for ChartContent {
    fn default() -> Self {
        Self {
            chart_type: DEFAULT_CHART_TYPE.to_string(),
            rows: Vec::new(),
        }
    }
}

/// Body of a slide, by structural family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentBody {
    /// No recognized layout, or nothing extractable.
    #[default]
    Empty,
    /// Ordered items of a container layout.
    Items {
        family: ItemFamily,
        items: Vec<ContentItem>,
    },
    /// A chart with its table.
    Chart(ChartContent),
}

/// Semantic content of one slide.
///
/// Serializes to the record shape the rendering layer reads: `title` plus
/// one of `bullets`, `columns`, `icons`, `steps`, or `chart_type` and `data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "ContentRecord", from = "ContentRecord")]
pub struct SlideContent {
    pub title: Option<String>,
    pub body: ContentBody,
}

impl SlideContent {
    /// Content with only a (possibly absent) title.
    pub fn titled(title: Option<String>) -> Self {
        Self {
            title,
            body: ContentBody::Empty,
        }
    }

    /// Content for a container layout.
    pub fn items(title: Option<String>, family: ItemFamily, items: Vec<ContentItem>) -> Self {
        Self {
            title,
            body: ContentBody::Items { family, items },
        }
    }

    /// Content for a chart layout.
    pub fn chart(title: Option<String>, chart: ChartContent) -> Self {
        Self {
            title,
            body: ContentBody::Chart(chart),
        }
    }

    /// Items of a container layout, empty for charts and empty bodies.
    pub fn item_list(&self) -> &[ContentItem] {
        match &self.body {
            ContentBody::Items { items, .. } => items,
            _ => &[],
        }
    }

    /// The chart, if this is chart content.
    pub fn chart_content(&self) -> Option<&ChartContent> {
        match &self.body {
            ContentBody::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    /// True when there is neither a title nor any body data.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body == ContentBody::Empty
    }
}

/// Wire shape of [`SlideContent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ContentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bullets: Option<Vec<ItemRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<ItemRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icons: Option<Vec<ItemRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<ItemRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chart_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Vec<ChartRow>>,
}

/// Wire shape of [`ContentItem`]; key names vary by family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    heading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl ItemRecord {
    fn from_item(item: ContentItem, family: ItemFamily) -> Self {
        let mut record = Self::default();
        match family {
            ItemFamily::Bullets => {
                record.heading = item.heading;
                record.text = Some(item.text);
            }
            ItemFamily::Columns => {
                record.heading = item.heading;
                record.description = Some(item.text);
            }
            ItemFamily::Icons => {
                record.icon = item.icon;
                record.heading = item.heading;
                record.description = Some(item.text);
            }
            ItemFamily::Steps => {
                record.title = item.heading;
                record.description = Some(item.text);
            }
        }
        record
    }

    fn into_item(self) -> ContentItem {
        ContentItem {
            heading: self.heading.or(self.title),
            text: self.text.or(self.description).unwrap_or_default(),
            icon: self.icon,
        }
    }
}

impl From<SlideContent> for ContentRecord {
    fn from(content: SlideContent) -> Self {
        let mut record = ContentRecord {
            title: content.title,
            ..Default::default()
        };

        match content.body {
            ContentBody::Empty => {}
            ContentBody::Items { family, items } => {
                let items = items
                    .into_iter()
                    .map(|item| ItemRecord::from_item(item, family))
                    .collect();
                match family {
                    ItemFamily::Bullets => record.bullets = Some(items),
                    ItemFamily::Columns => record.columns = Some(items),
                    ItemFamily::Icons => record.icons = Some(items),
                    ItemFamily::Steps => record.steps = Some(items),
                }
            }
            ContentBody::Chart(chart) => {
                record.chart_type = Some(chart.chart_type);
                record.data = Some(chart.rows);
            }
        }

        record
    }
}

impl From<ContentRecord> for SlideContent {
    fn from(record: ContentRecord) -> Self {
        let items = [
            (ItemFamily::Bullets, record.bullets),
            (ItemFamily::Columns, record.columns),
            (ItemFamily::Icons, record.icons),
            (ItemFamily::Steps, record.steps),
        ]
        .into_iter()
        .find_map(|(family, items)| items.map(|items| (family, items)));

        let body = if let Some((family, items)) = items {
            ContentBody::Items {
                family,
                items: items.into_iter().map(ItemRecord::into_item).collect(),
            }
        } else if record.chart_type.is_some() || record.data.is_some() {
            ContentBody::Chart(ChartContent {
                chart_type: record
                    .chart_type
                    .unwrap_or_else(|| DEFAULT_CHART_TYPE.to_string()),
                rows: record.data.unwrap_or_default(),
            })
        } else {
            ContentBody::Empty
        };

        SlideContent {
            title: record.title,
            body,
        }
    }
}
