//! Rendering constants.

/// Overlay batch constants.
pub mod overlay {
    /// Fixed alpha baked into fill vertex colors; the per-object overlay
    /// alpha multiplies on top of this in the shader.
    pub const FILL_ALPHA: f32 = 0.5;

    /// Fill color for untagged faces and stale tags. Zero alpha makes the
    /// fragment shader discard these pixels.
    pub const TRANSPARENT_FILL: [f32; 4] = [1.0, 1.0, 1.0, 0.0];

    /// Wireframe line color (alpha comes from the overlay alpha setting).
    pub const WIRE_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

    /// Offset of wireframe vertices along their normal, avoiding z-fighting
    /// with the fill layer. Only holds up for near view ranges.
    pub const WIRE_NORMAL_OFFSET: f32 = 0.0035;

    /// A vertex with more incident edges than this is a pole.
    pub const POLE_VALENCE_LIMIT: u32 = 4;

    /// Pole spike length as a fraction of the object's smallest bounding-box
    /// dimension, before the user's pole size factor.
    pub const POLE_LENGTH_FACTOR: f32 = 0.5;
}

/// Viewport constants.
pub mod viewport {
    /// MSAA sample count for overlay pipelines.
    pub const SAMPLE_COUNT: u32 = 1;
}
