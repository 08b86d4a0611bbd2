use bytemuck::{Pod, Zeroable};

/// Vertex of the shared plane mesh.
///
/// `pos` spans the unit square with (0, 0) at the bottom-left; the vertex
/// shader re-centers and scales it to plane size. `uv` is pre-flipped for
/// top-row-first texture data.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct PlaneVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Builds a `cols × rows` grid over the unit square.
///
/// Interior vertices are what the card shader's wobble displacement deforms;
/// a 2-triangle quad would stay rigid. Captions use a 1×1 grid.
pub fn build_grid(cols: u32, rows: u32) -> (Vec<PlaneVertex>, Vec<u16>) {
    debug_assert!((cols + 1) * (rows + 1) <= u16::MAX as u32 + 1);

    let mut vertices = Vec::with_capacity(((cols + 1) * (rows + 1)) as usize);
    for y in 0..=rows {
        for x in 0..=cols {
            let u = x as f32 / cols as f32;
            let v = y as f32 / rows as f32;
            vertices.push(PlaneVertex {
                pos: [u, v],
                uv: [u, 1.0 - v],
            });
        }
    }

    let mut indices = Vec::with_capacity((cols * rows * 6) as usize);
    for y in 0..rows {
        for x in 0..cols {
            let i0 = (y * (cols + 1) + x) as u16;
            let i1 = i0 + 1;
            let i2 = i0 + (cols + 1) as u16;
            let i3 = i2 + 1;
            indices.extend_from_slice(&[i0, i1, i3, i0, i3, i2]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_counts() {
        let (vertices, indices) = build_grid(64, 32);
        assert_eq!(vertices.len(), 65 * 33);
        assert_eq!(indices.len(), 64 * 32 * 6);
    }

    #[test]
    fn unit_quad_counts() {
        let (vertices, indices) = build_grid(1, 1);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn indices_stay_in_bounds() {
        let (vertices, indices) = build_grid(16, 8);
        let max = *indices.iter().max().unwrap();
        assert!((max as usize) < vertices.len());
    }

    #[test]
    fn uv_is_flipped_vertically() {
        let (vertices, _) = build_grid(1, 1);
        // Bottom-left position carries the texture's bottom row (v = 1).
        assert_eq!(vertices[0].pos, [0.0, 0.0]);
        assert_eq!(vertices[0].uv, [0.0, 1.0]);
        // Top-right position samples the texture's top row (v = 0).
        assert_eq!(vertices[3].pos, [1.0, 1.0]);
        assert_eq!(vertices[3].uv, [1.0, 0.0]);
    }
}
