use crate::models::{Coordinates, PoiCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteShape {
    /// Start and finish at the same point
    #[default]
    Loop,
    /// Finish somewhere else, either chosen by the engine or given explicitly
    OneWay,
}

impl fmt::Display for RouteShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteShape::Loop => write!(f, "loop"),
            RouteShape::OneWay => write!(f, "one_way"),
        }
    }
}

impl FromStr for RouteShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loop" => Ok(RouteShape::Loop),
            "one_way" | "one-way" | "oneway" => Ok(RouteShape::OneWay),
            _ => Err(format!("Invalid route shape: '{}'", s)),
        }
    }
}

/// Soft preferences a runner can ask for.
///
/// Declaration order is the order in which POI queries are issued.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Scenery,
    Urban,
    Safety,
    Quiet,
    Flat,
    FewLights,
    MinimizeTurns,
}

impl Preference {
    /// POI category queried for this preference. `MinimizeTurns` only affects
    /// candidate selection and contributes no waypoint.
    pub fn poi_category(&self) -> Option<PoiCategory> {
        match self {
            Preference::Scenery => Some(PoiCategory::Scenic),
            Preference::Urban => Some(PoiCategory::Urban),
            Preference::Safety => Some(PoiCategory::Proximity),
            Preference::Quiet => Some(PoiCategory::Quiet),
            Preference::Flat => Some(PoiCategory::Waterside),
            Preference::FewLights => Some(PoiCategory::LowTraffic),
            Preference::MinimizeTurns => None,
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Preference::Scenery => "scenery",
            Preference::Urban => "urban",
            Preference::Safety => "safety",
            Preference::Quiet => "quiet",
            Preference::Flat => "flat",
            Preference::FewLights => "few_lights",
            Preference::MinimizeTurns => "minimize_turns",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "scenery" | "scenic" => Ok(Preference::Scenery),
            "urban" => Ok(Preference::Urban),
            "safety" | "safe" => Ok(Preference::Safety),
            "quiet" => Ok(Preference::Quiet),
            "flat" => Ok(Preference::Flat),
            "few_lights" => Ok(Preference::FewLights),
            "minimize_turns" | "few_turns" => Ok(Preference::MinimizeTurns),
            _ => Err(format!("Invalid preference: '{}'", s)),
        }
    }
}

/// The set of active preferences, iterated in query order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PreferenceSet(BTreeSet<Preference>);

impl PreferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, preference: Preference) -> bool {
        self.0.contains(&preference)
    }

    pub fn iter(&self) -> impl Iterator<Item = Preference> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<Preference> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = Preference>>(iter: I) -> Self {
        PreferenceSet(iter.into_iter().collect())
    }
}

/// A runner's declarative request. Immutable for the duration of one synthesis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Coordinates,
    pub target_distance_km: f64,
    #[serde(default)]
    pub shape: RouteShape,
    #[serde(default)]
    pub preferences: PreferenceSet,
    #[serde(default = "default_avoid_repetition")]
    pub avoid_repetition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_destination: Option<Coordinates>,
}

fn default_avoid_repetition() -> bool {
    true
}

impl RouteRequest {
    pub fn new(start: Coordinates, target_distance_km: f64, shape: RouteShape) -> Self {
        RouteRequest {
            start,
            target_distance_km,
            shape,
            preferences: PreferenceSet::new(),
            avoid_repetition: default_avoid_repetition(),
            explicit_destination: None,
        }
    }

    pub fn with_preferences(mut self, preferences: PreferenceSet) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_avoid_repetition(mut self, avoid_repetition: bool) -> Self {
        self.avoid_repetition = avoid_repetition;
        self
    }

    pub fn with_destination(mut self, destination: Coordinates) -> Self {
        self.explicit_destination = Some(destination);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        Coordinates::new(self.start.lat, self.start.lng)?;
        if let Some(destination) = self.explicit_destination {
            Coordinates::new(destination.lat, destination.lng)?;
        }
        if !self.target_distance_km.is_finite() || self.target_distance_km <= 0.0 {
            return Err("target_distance_km must be a positive number".to_string());
        }
        Ok(())
    }

    /// One-way requests with a fixed destination skip the iterative search.
    pub fn is_direct(&self) -> bool {
        self.shape == RouteShape::OneWay && self.explicit_destination.is_some()
    }
}

/// One scored result of a single routing call. Never mutated once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub coordinates: Vec<Coordinates>,
    pub distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevation_gain_m: Option<f64>,
    pub turn_count: u32,
    pub waypoints_used: Vec<Coordinates>,
}

impl Candidate {
    /// Absolute distance error against a target
    pub fn distance_error(&self, target_distance_km: f64) -> f64 {
        (self.distance_km - target_distance_km).abs()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisStatus {
    /// The search finished within its budget and produced a route
    Converged,
    /// The time budget expired; the route is the best found so far
    TimedOut,
    /// Every attempt and fallback failed
    NoRoute,
}

/// Terminal outcome of one synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub status: SynthesisStatus,
    pub route: Option<Candidate>,
    /// Primary attempts started (0 for direct routes)
    pub attempts: u32,
}

impl SynthesisResult {
    pub fn no_route(attempts: u32) -> Self {
        SynthesisResult {
            status: SynthesisStatus::NoRoute,
            route: None,
            attempts,
        }
    }
}

// Request/Response types for API endpoints

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub id: Uuid,
    pub status: SynthesisStatus,
    /// Distance differs from the target enough to warn the runner
    pub approximate_distance: bool,
    pub attempts: u32,
    pub route: Candidate,
}

/// Body of the export endpoints: a previously returned route path.
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub coordinates: Vec<Coordinates>,
    pub distance_km: f64,
}

impl ExportRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.coordinates.len() < 2 {
            return Err("coordinates must contain at least 2 points".to_string());
        }
        if !self.distance_km.is_finite() || self.distance_km < 0.0 {
            return Err("distance_km must be a non-negative number".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MapsLinkResponse {
    pub url: String,
}
