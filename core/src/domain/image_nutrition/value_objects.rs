/// Raw upload as received at the boundary. The declared content type is
/// kept as-is; validation happens in the service.
#[derive(Debug, Clone)]
pub struct AnalyzeImageInput {
    pub image_data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Handle to an image uploaded to the model's file store, valid for the
/// duration of one request and referenced by subsequent model calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: i32,
}

impl SamplingConfig {
    /// Low-temperature configuration for the labeling and disambiguation
    /// calls, pinned for run-to-run stability.
    pub const LABELING: Self = Self {
        temperature: 0.2,
        top_p: 0.9,
        top_k: 40,
    };

    /// Slightly warmer configuration for recipe generation.
    pub const COACHING: Self = Self {
        temperature: 0.4,
        top_p: 0.9,
        top_k: 40,
    };
}
