use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use layers::Mesh;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Anything a screen ray can hit on the globe: the analytic sphere, the
/// country fill meshes, or an external renderer's scene.
pub trait SphereSurface {
    /// Nearest intersection in front of the ray origin.
    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3>;
}

const HIT_EPS: f64 = 1e-9;

/// Origin-centred sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    pub radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl SphereSurface for Sphere {
    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        let ray = Ray::new(ray.origin, ray.dir.normalize()?);
        let b = ray.origin.dot(ray.dir);
        let c = ray.origin.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let (t0, t1) = (-b - sq, -b + sq);
        // From inside the sphere only the exit point lies ahead.
        let t = if t0 > HIT_EPS {
            t0
        } else if t1 > HIT_EPS {
            t1
        } else {
            return None;
        };
        Some(ray.at(t))
    }
}

/// Ray picking against triangle meshes, nearest hit wins.
#[derive(Debug, Clone)]
pub struct MeshSurface<'a> {
    meshes: &'a [Mesh],
    bounds: Vec<Option<Aabb3>>,
}

impl<'a> MeshSurface<'a> {
    pub fn new(meshes: &'a [Mesh]) -> Self {
        Self {
            meshes,
            bounds: meshes.iter().map(Mesh::bounds).collect(),
        }
    }

    /// Distance along the (normalized) ray and index of the mesh hit first.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<(f64, usize)> {
        let dir = ray.dir.normalize()?;
        let origin = ray.origin.as_array();
        let dir_a = dir.as_array();

        let mut best: Option<(f64, usize)> = None;
        for (i, (mesh, bounds)) in self.meshes.iter().zip(&self.bounds).enumerate() {
            let Some(bounds) = bounds else {
                continue;
            };
            let t_max = best.map_or(f64::INFINITY, |(t, _)| t);
            if ray_aabb_hit_t(origin, dir_a, bounds, 0.0, t_max).is_none() {
                continue;
            }
            for tri in mesh.triangles() {
                let closer = ray_triangle_t(ray.origin, dir, tri)
                    .filter(|&t| best.is_none_or(|(bt, _)| t < bt));
                if let Some(t) = closer {
                    best = Some((t, i));
                }
            }
        }
        best
    }
}

impl SphereSurface for MeshSurface<'_> {
    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        let (t, _) = self.nearest_hit(ray)?;
        Some(Ray::new(ray.origin, ray.dir.normalize()?).at(t))
    }
}

fn ray_aabb_hit_t(
    origin: [f64; 3],
    dir: [f64; 3],
    bounds: &Aabb3,
    mut t_min: f64,
    mut t_max: f64,
) -> Option<f64> {
    // Slabs intersection; returns entry distance.
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (min, max) = (bounds.min[axis], bounds.max[axis]);

        if d.abs() < 1e-12 {
            if o < min || o > max {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t1 = (min - o) * inv;
        let mut t2 = (max - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }

        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }

    Some(t_min.max(0.0))
}

/// Möller–Trumbore, two-sided.
fn ray_triangle_t(origin: Vec3, dir: Vec3, tri: [Vec3; 3]) -> Option<f64> {
    let e1 = tri[1] - tri[0];
    let e2 = tri[2] - tri[0];
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-14 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - tri[0];
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t > HIT_EPS).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::{MeshSurface, Ray, Sphere, SphereSurface, ray_aabb_hit_t};
    use foundation::bounds::Aabb3;
    use foundation::math::Vec3;
    use layers::Mesh;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn quad_at_x(x: f64) -> Mesh {
        let mut m = Mesh::new();
        m.push_triangle([
            Vec3::new(x, -1.0, -1.0),
            Vec3::new(x, 1.0, -1.0),
            Vec3::new(x, 1.0, 1.0),
        ]);
        m.push_triangle([
            Vec3::new(x, -1.0, -1.0),
            Vec3::new(x, 1.0, 1.0),
            Vec3::new(x, -1.0, 1.0),
        ]);
        m
    }

    #[test]
    fn sphere_hit_from_outside_is_the_near_side() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0));
        let hit = Sphere::new(1.0).intersect_ray(&ray).expect("hit");
        assert_close(hit.x, 1.0, 1e-12);
    }

    #[test]
    fn sphere_hit_from_inside_is_the_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        let hit = Sphere::new(2.0).intersect_ray(&ray).expect("hit");
        assert_close(hit.z, 2.0, 1e-12);
    }

    #[test]
    fn sphere_misses() {
        let sphere = Sphere::new(1.0);
        let away = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(sphere.intersect_ray(&away).is_none());
        let wide = Ray::new(Vec3::new(3.0, 2.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert!(sphere.intersect_ray(&wide).is_none());
        let zero = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO);
        assert!(sphere.intersect_ray(&zero).is_none());
    }

    #[test]
    fn mesh_picks_nearest_mesh() {
        let meshes = vec![quad_at_x(10.0), quad_at_x(5.0)];
        let surface = MeshSurface::new(&meshes);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.1, 0.1));
        let (t, index) = surface.nearest_hit(&ray).expect("hit");
        assert_eq!(index, 1);
        let hit = surface.intersect_ray(&ray).expect("hit");
        assert_close(hit.x, 5.0, 1e-9);
        assert!(t > 5.0);
    }

    #[test]
    fn mesh_misses_outside_triangles() {
        let meshes = vec![quad_at_x(5.0), Mesh::new()];
        let surface = MeshSurface::new(&meshes);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.5, 0.0));
        assert!(surface.intersect_ray(&ray).is_none());
        let behind = Ray::new(Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0));
        assert!(surface.intersect_ray(&behind).is_none());
    }

    #[test]
    fn slab_test_handles_axis_parallel_rays() {
        let b = Aabb3::new([4.0, -1.0, -1.0], [6.0, 1.0, 1.0]);
        let t = ray_aabb_hit_t([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], &b, 0.0, f64::INFINITY);
        assert_eq!(t, Some(4.0));
        let t = ray_aabb_hit_t([0.0, 2.0, 0.0], [1.0, 0.0, 0.0], &b, 0.0, f64::INFINITY);
        assert_eq!(t, None);
    }
}
