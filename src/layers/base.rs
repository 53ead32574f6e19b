use crate::engine::{LayerSpec, SourceSpec};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Source,
    Layer,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Source => write!(f, "source"),
            FeatureKind::Layer => write!(f, "layer"),
        }
    }
}

/// Declared data source: `{id, type, data}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: String,
    pub data: Value,
}

impl SourceDescriptor {
    pub fn new(id: impl Into<String>, source_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            source_type: source_type.into(),
            data,
        }
    }

    pub fn geojson(id: impl Into<String>, data: Value) -> Self {
        Self::new(id, "geojson", data)
    }

    pub fn to_spec(&self) -> SourceSpec {
        SourceSpec {
            source_type: self.source_type.clone(),
            data: self.data.clone(),
        }
    }
}

/// Declared rendered layer: `{id, type, source, paint, layout}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    pub source: String,
    #[serde(default = "empty_object")]
    pub paint: Value,
    #[serde(default = "empty_object")]
    pub layout: Value,
}

fn empty_object() -> Value {
    json!({})
}

impl LayerDescriptor {
    pub fn new(
        id: impl Into<String>,
        layer_type: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            layer_type: layer_type.into(),
            source: source.into(),
            paint: empty_object(),
            layout: empty_object(),
        }
    }

    pub fn with_paint(mut self, paint: Value) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_layout(mut self, layout: Value) -> Self {
        self.layout = layout;
        self
    }

    pub fn to_spec(&self) -> LayerSpec {
        LayerSpec {
            id: self.id.clone(),
            layer_type: self.layer_type.clone(),
            source: self.source.clone(),
            paint: self.paint.clone(),
            layout: self.layout.clone(),
        }
    }
}

/// A declared feature of either kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeatureDescriptor {
    Source(SourceDescriptor),
    Layer(LayerDescriptor),
}

impl FeatureDescriptor {
    pub fn id(&self) -> &str {
        match self {
            FeatureDescriptor::Source(s) => &s.id,
            FeatureDescriptor::Layer(l) => &l.id,
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureDescriptor::Source(_) => FeatureKind::Source,
            FeatureDescriptor::Layer(_) => FeatureKind::Layer,
        }
    }
}

impl From<SourceDescriptor> for FeatureDescriptor {
    fn from(value: SourceDescriptor) -> Self {
        FeatureDescriptor::Source(value)
    }
}

impl From<LayerDescriptor> for FeatureDescriptor {
    fn from(value: LayerDescriptor) -> Self {
        FeatureDescriptor::Layer(value)
    }
}

/// What one reconciliation did to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// No engine instance is published yet; nothing to reconcile against
    Detached,
    /// Declared state already matches the engine, no call made
    Unchanged,
    /// The engine object was created
    Created,
    /// The existing source's data was replaced in place
    Updated,
    /// The layer already exists and was left as is. `style_pending` is set when
    /// the declared paint/layout differ from what the engine holds.
    Retained { style_pending: bool },
    /// The id is taken by an object of a different type
    Rejected { reason: String },
}

impl ReconcileOutcome {
    /// Whether the engine was mutated
    pub fn touched_engine(&self) -> bool {
        matches!(self, ReconcileOutcome::Created | ReconcileOutcome::Updated)
    }
}
