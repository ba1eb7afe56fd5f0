// ── Device inventory model ──

use serde::{Deserialize, Serialize};

/// A reserved device with the attributes device selection works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    pub family_name: String,
    pub model_name: String,
}

impl DeviceRecord {
    pub fn new(
        id: impl Into<String>,
        family_name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            family_name: family_name.into(),
            model_name: model_name.into(),
        }
    }

    /// A record known only by id (no inventory lookup performed).
    pub fn unresolved(id: impl Into<String>) -> Self {
        Self::new(id, "", "")
    }
}

/// Device selection rule.
///
/// All fields are stored upper-cased; blank input means "unset". Which
/// field decides a match follows a fixed precedence, see
/// [`filter_devices`](crate::filter::filter_devices).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    exact_name: Option<String>,
    family_name: Option<String>,
    model_name: Option<String>,
}

impl MatchRule {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn exact_name(mut self, name: &str) -> Self {
        self.exact_name = normalize(name);
        self
    }

    #[must_use]
    pub fn family(mut self, family: &str) -> Self {
        self.family_name = normalize(family);
        self
    }

    #[must_use]
    pub fn model(mut self, model: &str) -> Self {
        self.model_name = normalize(model);
        self
    }

    pub fn exact_name_value(&self) -> Option<&str> {
        self.exact_name.as_deref()
    }

    pub fn family_value(&self) -> Option<&str> {
        self.family_name.as_deref()
    }

    pub fn model_value(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    /// No field set: the rule selects nothing.
    pub fn is_unscoped(&self) -> bool {
        self.exact_name.is_none() && self.family_name.is_none() && self.model_name.is_none()
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_uppercase())
}
