use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// POI categories the preference mapper can ask for. Each one corresponds to
/// a single provider query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    /// Parks and open water
    Scenic,
    /// Commercial areas, attractions, stadiums
    Urban,
    /// Lit, staffed places (convenience stores). Selected by proximity.
    Proximity,
    /// Libraries, places of worship, gardens, forests
    Quiet,
    /// Rivers and water bodies, which tend to be flat
    Waterside,
    /// Cycleways, paths and living streets with few signals
    LowTraffic,
}

impl PoiCategory {
    /// Proximity categories take the provider's nearest result instead of a
    /// random one.
    pub fn selects_nearest(&self) -> bool {
        matches!(self, PoiCategory::Proximity)
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PoiCategory::Scenic => "scenic",
            PoiCategory::Urban => "urban",
            PoiCategory::Proximity => "proximity",
            PoiCategory::Quiet => "quiet",
            PoiCategory::Waterside => "waterside",
            PoiCategory::LowTraffic => "low_traffic",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Poi {
    pub position: Coordinates,
    pub category: PoiCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Poi {
    pub fn new(position: Coordinates, category: PoiCategory) -> Self {
        Poi {
            position,
            category,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
