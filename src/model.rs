use serde::{Deserialize, Serialize};

// ============================================================================
// ORDER RECORDS
// ============================================================================

/// One order. Each record is printed as a standalone packing slip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "customerName", alias = "customer_name", default)]
    pub customer_name: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// A product line within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Type tag, only used to resolve the display label
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Unresolved locator for product image bytes. Dimensions are unknown until fetched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // data: URLs can be megabytes long
        match self.0.char_indices().nth(96) {
            Some((cut, _)) => write!(f, "{}...", &self.0[..cut]),
            None => f.write_str(&self.0),
        }
    }
}

// ============================================================================
// LABELS
// ============================================================================

/// Display label for an item type tag.
pub fn label_for(kind: &str) -> String {
    let kind = kind.trim();
    let known = match kind.to_ascii_lowercase().as_str() {
        "mug" => Some("Mug"),
        "cup" => Some("Cup"),
        "bowl" => Some("Bowl"),
        "plate" => Some("Plate"),
        "platter" => Some("Serving Platter"),
        "vase" => Some("Vase"),
        "planter" => Some("Planter"),
        "tile" => Some("Tile"),
        "" => Some("Item"),
        _ => None,
    };
    if let Some(label) = known {
        return label.to_string();
    }

    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Item".to_string(),
    }
}
