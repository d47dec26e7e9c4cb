use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    #[default]
    Unordered,
    Ordered,
    Checklist,
}

impl ListStyle {
    pub fn name(self) -> &'static str {
        match self {
            ListStyle::Unordered => "unordered",
            ListStyle::Ordered => "ordered",
            ListStyle::Checklist => "checklist",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "unordered" => Some(ListStyle::Unordered),
            "ordered" => Some(ListStyle::Ordered),
            "checklist" => Some(ListStyle::Checklist),
            _ => None,
        }
    }
}

/// Numbering scheme of an ordered list level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CounterType {
    #[default]
    Numeric,
    UpperRoman,
    LowerRoman,
    UpperAlpha,
    LowerAlpha,
}

/// Style specific metadata of a single item.
///
/// The variant always matches the style of the list the item belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemMeta {
    Ordered {
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u32>,
        #[serde(rename = "counterType", skip_serializing_if = "Option::is_none")]
        counter_type: Option<CounterType>,
    },
    Checklist {
        checked: bool,
    },
    Unordered {},
}

impl ItemMeta {
    pub fn default_for(style: ListStyle) -> Self {
        match style {
            ListStyle::Unordered => ItemMeta::Unordered {},
            ListStyle::Ordered => ItemMeta::Ordered {
                start: None,
                counter_type: None,
            },
            ListStyle::Checklist => ItemMeta::Checklist { checked: false },
        }
    }

    pub fn style(&self) -> ListStyle {
        match self {
            ItemMeta::Unordered {} => ListStyle::Unordered,
            ItemMeta::Ordered { .. } => ListStyle::Ordered,
            ItemMeta::Checklist { .. } => ListStyle::Checklist,
        }
    }

    /// Reads a persisted meta record for the given style. Fields that do not
    /// belong to the style are ignored, malformed values fall back to defaults.
    pub fn from_value(style: ListStyle, value: &Value) -> Self {
        match style {
            ListStyle::Unordered => ItemMeta::Unordered {},
            ListStyle::Ordered => ItemMeta::Ordered {
                start: value
                    .get("start")
                    .and_then(Value::as_u64)
                    .and_then(|start| u32::try_from(start).ok()),
                counter_type: value
                    .get("counterType")
                    .cloned()
                    .and_then(|raw| serde_json::from_value(raw).ok()),
            },
            ListStyle::Checklist => ItemMeta::Checklist {
                checked: value
                    .get("checked")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
        }
    }

    pub fn checked(&self) -> Option<bool> {
        match self {
            ItemMeta::Checklist { checked } => Some(*checked),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub content: String,
    pub meta: ItemMeta,
    pub items: Vec<ListItem>,
}

impl ListItem {
    pub fn new(content: impl Into<String>, meta: ItemMeta) -> Self {
        Self {
            content: content.into(),
            meta,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<ListItem>) -> Self {
        self.items = items;
        self
    }

    /// Number of nesting levels below and including this item.
    pub fn depth(&self) -> usize {
        1 + self.items.iter().map(ListItem::depth).max().unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        1 + self.items.iter().map(ListItem::count).sum::<usize>()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawListData")]
pub struct ListData {
    pub style: ListStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    #[serde(rename = "counterType", skip_serializing_if = "Option::is_none")]
    pub counter_type: Option<CounterType>,
    pub items: Vec<ListItem>,
}

impl ListData {
    pub fn new(style: ListStyle) -> Self {
        Self {
            style,
            start: None,
            counter_type: None,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<ListItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = Some(start);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("failed to parse list data")
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize list data")
    }

    pub fn depth(&self) -> usize {
        self.items.iter().map(ListItem::depth).max().unwrap_or(0)
    }

    pub fn item_count(&self) -> usize {
        self.items.iter().map(ListItem::count).sum()
    }

    /// Converts the list to another style. Structure and content are kept,
    /// every item gets the default meta of the new style.
    pub fn restyle(&self, style: ListStyle) -> ListData {
        fn convert(items: &[ListItem], style: ListStyle) -> Vec<ListItem> {
            items
                .iter()
                .map(|item| ListItem {
                    content: item.content.clone(),
                    meta: if item.meta.style() == style {
                        item.meta.clone()
                    } else {
                        ItemMeta::default_for(style)
                    },
                    items: convert(&item.items, style),
                })
                .collect()
        }

        let ordered = style == ListStyle::Ordered;
        ListData {
            style,
            start: if ordered { self.start } else { None },
            counter_type: if ordered { self.counter_type } else { None },
            items: convert(&self.items, style),
        }
    }
}

#[derive(Deserialize)]
struct RawListData {
    style: ListStyle,
    #[serde(default)]
    start: Option<u32>,
    #[serde(default, rename = "counterType")]
    counter_type: Option<CounterType>,
    #[serde(default)]
    items: Vec<RawListItem>,
}

#[derive(Deserialize)]
struct RawListItem {
    #[serde(default)]
    content: String,
    #[serde(default)]
    meta: Value,
    #[serde(default)]
    items: Vec<RawListItem>,
}

impl RawListItem {
    fn into_item(self, style: ListStyle) -> ListItem {
        ListItem {
            meta: ItemMeta::from_value(style, &self.meta),
            content: self.content,
            items: self
                .items
                .into_iter()
                .map(|child| child.into_item(style))
                .collect(),
        }
    }
}

impl From<RawListData> for ListData {
    fn from(raw: RawListData) -> Self {
        let style = raw.style;
        let ordered = style == ListStyle::Ordered;
        ListData {
            style,
            start: if ordered { raw.start } else { None },
            counter_type: if ordered { raw.counter_type } else { None },
            items: raw
                .items
                .into_iter()
                .map(|item| item.into_item(style))
                .collect(),
        }
    }
}
