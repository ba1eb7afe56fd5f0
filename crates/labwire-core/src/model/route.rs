// ── Route descriptor model ──
//
// Routes, endpoints, and the flat endpoint batches the connect and
// disconnect operations take.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ── EndpointPath ────────────────────────────────────────────────────

/// Slash-delimited path to a connectable port, e.g. `sw1/blade1/port3`.
///
/// The first segment names the device that owns the port.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointPath(String);

impl EndpointPath {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The owning device id (first path segment).
    pub fn device(&self) -> &str {
        self.0.split('/').next().unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EndpointPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ── MappingType ─────────────────────────────────────────────────────

/// Link semantics of a route.
///
/// `Other` absorbs any type string the backend reports that is not one of
/// the three known kinds; such routes are never batched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MappingType {
    Bi,
    Uni,
    Cable,
    Other,
}

impl MappingType {
    /// Parse a backend route type, mapping unknown strings to `Other`.
    pub fn from_wire(raw: &str) -> Self {
        raw.trim().parse().unwrap_or(Self::Other)
    }

    /// Whether routes of this type go through connect/disconnect batches.
    pub fn is_batchable(self) -> bool {
        matches!(self, Self::Bi | Self::Uni)
    }

    /// Label used in operator-facing progress lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Bi => "Bi-Dir",
            Self::Uni => "Uni-Dir",
            Self::Cable => "Cable",
            Self::Other => "Other",
        }
    }
}

// ── RouteDescriptor ─────────────────────────────────────────────────

/// One route as read from a reservation snapshot. Immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    pub source: EndpointPath,
    pub target: EndpointPath,
    pub mapping_type: MappingType,
}

impl RouteDescriptor {
    pub fn new(
        source: impl Into<EndpointPath>,
        target: impl Into<EndpointPath>,
        mapping_type: MappingType,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            mapping_type,
        }
    }
}

impl fmt::Display for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <---> {}", self.source, self.target)
    }
}

/// Ordered routes from a reservation snapshot. Duplicates are kept.
pub type RouteTopology = Vec<RouteDescriptor>;

// ── EndpointBatch ───────────────────────────────────────────────────

/// Flat `[source1, target1, source2, target2, ...]` endpoint list.
///
/// Only whole pairs can be pushed, so the length is always even.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EndpointBatch(Vec<EndpointPath>);

impl EndpointBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_pair(&mut self, source: EndpointPath, target: EndpointPath) {
        self.0.push(source);
        self.0.push(target);
    }

    pub fn push_route(&mut self, route: &RouteDescriptor) {
        self.push_pair(route.source.clone(), route.target.clone());
    }

    /// Number of (source, target) pairs.
    pub fn pair_count(&self) -> usize {
        self.0.len() / 2
    }

    /// Number of endpoints (always `2 * pair_count()`).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn endpoints(&self) -> &[EndpointPath] {
        &self.0
    }

    /// Iterate `(source, target)` pairs in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&EndpointPath, &EndpointPath)> {
        self.0.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// The endpoint strings in wire order.
    pub fn to_wire(&self) -> Vec<String> {
        self.0.iter().map(|e| e.0.clone()).collect()
    }
}

impl<'a> FromIterator<&'a RouteDescriptor> for EndpointBatch {
    fn from_iter<I: IntoIterator<Item = &'a RouteDescriptor>>(iter: I) -> Self {
        let mut batch = Self::new();
        for route in iter {
            batch.push_route(route);
        }
        batch
    }
}
