//! Shared base quad geometry, drawn once per particle instance.

/// Quad-local vertex: position and UV.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
}

/// Byte offset of `texcoord` within a [`QuadVertex`].
pub const TEXCOORD_OFFSET: u64 = 12;

/// Unit quad centred on the origin in the XY plane.
pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex {
        position: [-0.5, -0.5, 0.0],
        texcoord: [0.0, 1.0],
    }, // bottom-left
    QuadVertex {
        position: [0.5, -0.5, 0.0],
        texcoord: [1.0, 1.0],
    }, // bottom-right
    QuadVertex {
        position: [0.5, 0.5, 0.0],
        texcoord: [1.0, 0.0],
    }, // top-right
    QuadVertex {
        position: [-0.5, 0.5, 0.0],
        texcoord: [0.0, 0.0],
    }, // top-left
];

/// Two counter-clockwise triangles.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
