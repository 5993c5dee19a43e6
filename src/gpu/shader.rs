//! WGSL for the point sprite pipeline.
//!
//! One instance per point, six vertices per instance forming a quad.
//! With size attenuation the quad is offset in view space, so sprites
//! have a fixed world size and shrink with distance; without it the
//! offset is applied in clip space and sprites keep a fixed screen size.

pub const SHADER_SOURCE: &str = r#"
struct Uniforms {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    point_size: f32,
    size_attenuation: f32,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@group(1) @binding(0)
var sprite: texture_2d<f32>;
@group(1) @binding(1)
var sprite_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

// Point colors are authored in sRGB; the surface expects linear.
fn srgb_to_linear(c: vec3<f32>) -> vec3<f32> {
    let low = c / 12.92;
    let high = pow((c + vec3<f32>(0.055)) / 1.055, vec3<f32>(2.4));
    return select(high, low, c <= vec3<f32>(0.04045));
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );
    let corner = quad_vertices[vertex_index];
    let half_size = uniforms.point_size * 0.5;

    let view_pos = uniforms.view * vec4<f32>(position, 1.0);
    var clip_pos: vec4<f32>;
    if uniforms.size_attenuation > 0.5 {
        clip_pos = uniforms.proj * (view_pos + vec4<f32>(corner * half_size, 0.0, 0.0));
    } else {
        clip_pos = uniforms.proj * view_pos;
        clip_pos.x += corner.x * half_size * clip_pos.w;
        clip_pos.y += corner.y * half_size * clip_pos.w;
    }

    var out: VertexOutput;
    out.clip_position = clip_pos;
    out.color = srgb_to_linear(color);
    out.uv = vec2<f32>(corner.x * 0.5 + 0.5, 0.5 - corner.y * 0.5);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(sprite, sprite_sampler, in.uv);
    return vec4<f32>(in.color * texel.rgb, texel.a);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use naga::front::wgsl;
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    #[test]
    fn test_shader_validates() {
        let module = match wgsl::parse_str(SHADER_SOURCE) {
            Ok(module) => module,
            Err(err) => panic!("{}", err.emit_to_string(SHADER_SOURCE)),
        };
        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
        if let Err(err) = validator.validate(&module) {
            panic!("Render shader error: {:?}", err);
        }
    }

    #[test]
    fn test_entry_points_present() {
        let module = wgsl::parse_str(SHADER_SOURCE).unwrap();
        let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"vs_main"));
        assert!(names.contains(&"fs_main"));
    }
}
