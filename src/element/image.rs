use serde::{Deserialize, Serialize};

/// Where an image came from. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Payload of an image element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub src: String,
    /// Size at insertion time; the aspect-ratio and reset-size reference
    pub original_width: f32,
    pub original_height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Provenance>,
}

impl ImageData {
    pub fn aspect_ratio(&self) -> f32 {
        self.original_width / self.original_height
    }
}
