use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Icon/category attached to an insight, assigned by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Precipitation,
    Trend,
    Moisture,
}

impl InsightCategory {
    /// Rotating category for the insight at `index` (0-based)
    pub fn for_position(index: usize) -> Self {
        match index % 3 {
            0 => InsightCategory::Precipitation,
            1 => InsightCategory::Trend,
            _ => InsightCategory::Moisture,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightCategory::Precipitation => "Precipitation",
            InsightCategory::Trend => "Trend",
            InsightCategory::Moisture => "Moisture",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            InsightCategory::Precipitation => "☁",
            InsightCategory::Trend => "↗",
            InsightCategory::Moisture => "💧",
        }
    }
}

impl std::fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightItem {
    pub title: String,
    pub description: String,
    pub category: InsightCategory,
}

impl InsightItem {
    /// Build the insight at `index` with its positional title and category
    pub fn positional(index: usize, description: impl Into<String>) -> Self {
        Self {
            title: format!("Insight {}", index + 1),
            description: description.into(),
            category: InsightCategory::for_position(index),
        }
    }
}

/// A persisted insight list for one region
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightLogEntry {
    pub id: i64,
    pub region: String,
    pub insights: Vec<InsightItem>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_rotate_by_position() {
        assert_eq!(InsightCategory::for_position(0), InsightCategory::Precipitation);
        assert_eq!(InsightCategory::for_position(1), InsightCategory::Trend);
        assert_eq!(InsightCategory::for_position(2), InsightCategory::Moisture);
        assert_eq!(InsightCategory::for_position(3), InsightCategory::Precipitation);
    }

    #[test]
    fn positional_item_titles_are_one_based() {
        let item = InsightItem::positional(2, "Soil moisture stable.");
        assert_eq!(item.title, "Insight 3");
        assert_eq!(item.category, InsightCategory::Moisture);
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&InsightCategory::Trend).unwrap();
        assert_eq!(json, "\"trend\"");
    }
}
