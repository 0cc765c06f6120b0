use foundation::bounds::Aabb3;
use foundation::math::{Vec3, surface_normal};

/// Indexed triangle mesh on an origin-centred sphere.
///
/// `indices.len() % 3 == 0` and `normals.len() == vertices.len()`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub normals: Vec<Vec3>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Appends one triangle with fresh, unshared vertices.
    pub fn push_triangle(&mut self, corners: [Vec3; 3]) {
        let base = self.vertices.len() as u32;
        for c in corners {
            self.vertices.push(c);
            self.normals.push(surface_normal(c));
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            [
                self.vertices[t[0] as usize],
                self.vertices[t[1] as usize],
                self.vertices[t[2] as usize],
            ]
        })
    }

    pub fn bounds(&self) -> Option<Aabb3> {
        Aabb3::from_points(self.vertices.iter().map(|v| v.as_array()))
    }

    /// Flat `xyz` positions for a GPU vertex buffer.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.as_f32_array()).collect()
    }

    pub fn normals_f32(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.as_f32_array()).collect()
    }

    pub fn to_gpu(&self) -> GpuMesh {
        GpuMesh {
            positions: self.positions_f32(),
            normals: self.normals_f32(),
            indices: self.indices.clone(),
        }
    }
}

/// `f32` vertex/index arrays ready for upload.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GpuMesh {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
}

impl GpuMesh {
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn normal_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.normals)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Aggregate line-segment buffer: vertices come in `(start, end)` pairs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BorderBuffer {
    pub positions: Vec<Vec3>,
}

impl BorderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_segment(&mut self, a: Vec3, b: Vec3) {
        self.positions.push(a);
        self.positions.push(b);
    }

    pub fn segment_count(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.positions.chunks_exact(2).map(|s| (s[0], s[1]))
    }

    pub fn positions_f32(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|v| v.as_f32_array()).collect()
    }
}
