//! Point material.
//!
//! Galaxy points are drawn as camera-facing sprites whose colors add up
//! where they overlap, so dense arm cores glow.

use serde::{Deserialize, Serialize};

use crate::params::GalaxyParameters;

/// How overlapping particles combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Additive blending (default).
    ///
    /// Overlapping points become brighter.
    #[default]
    Additive,

    /// Standard alpha blending.
    Alpha,
}

impl BlendMode {
    /// The wgpu blend state for this mode.
    pub fn to_wgpu_blend_state(self) -> wgpu::BlendState {
        match self {
            BlendMode::Additive => wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
            },
            BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        }
    }
}

/// Material settings handed to the renderer with each field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Sprite size in world units.
    pub size: f32,
    pub blend_mode: BlendMode,
    /// Shrink sprites with distance.
    pub size_attenuation: bool,
    /// Points never write depth; with additive blending order doesn't matter.
    pub depth_write: bool,
    /// Use per-point colors rather than a flat tint.
    pub vertex_colors: bool,
}

impl PointMaterial {
    pub fn for_parameters(params: &GalaxyParameters, blend_mode: BlendMode) -> Self {
        Self {
            size: params.size,
            blend_mode,
            size_attenuation: true,
            depth_write: false,
            vertex_colors: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_from_parameters() {
        let params = GalaxyParameters {
            size: 0.05,
            ..Default::default()
        };
        let m = PointMaterial::for_parameters(&params, BlendMode::default());
        assert_eq!(m.size, 0.05);
        assert_eq!(m.blend_mode, BlendMode::Additive);
        assert!(!m.depth_write);
        assert!(m.vertex_colors && m.size_attenuation);
    }

    #[test]
    fn test_additive_adds_destination() {
        let state = BlendMode::Additive.to_wgpu_blend_state();
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
    }
}
