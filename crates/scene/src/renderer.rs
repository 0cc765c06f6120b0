//! Seam between the geometry core and whatever engine draws the globe.

use foundation::math::Vec3;
use layers::{BorderBuffer, CountryLayerSnapshot, Mesh};

use crate::picking::{MeshSurface, Ray, Sphere, SphereSurface};
use crate::selection::PolygonStyle;

/// Maps a country name to its draw style.
pub type PolygonStyleFn = Box<dyn Fn(&str) -> PolygonStyle>;

pub trait GlobeRenderer {
    /// Replaces all country geometry.
    fn set_polygons(&mut self, geometry: &CountryLayerSnapshot);
    fn set_polygon_style_fn(&mut self, style: PolygonStyleFn);
    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3>;
}

/// Lets the pointer resolver pick through any renderer.
pub struct RendererSurface<'r, R: GlobeRenderer + ?Sized>(pub &'r R);

impl<R: GlobeRenderer + ?Sized> SphereSurface for RendererSurface<'_, R> {
    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        self.0.intersect_ray(ray)
    }
}

/// In-memory renderer: keeps the geometry it is given and answers ray
/// queries against the fills first, then the base sphere.
pub struct HeadlessRenderer {
    sphere: Sphere,
    names: Vec<String>,
    meshes: Vec<Mesh>,
    borders: BorderBuffer,
    style: Option<PolygonStyleFn>,
}

impl HeadlessRenderer {
    pub fn new(sphere_radius: f64) -> Self {
        Self {
            sphere: Sphere::new(sphere_radius),
            names: Vec::new(),
            meshes: Vec::new(),
            borders: BorderBuffer::new(),
            style: None,
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn borders(&self) -> &BorderBuffer {
        &self.borders
    }

    /// Style of a country as the last style callback reports it.
    pub fn style_of(&self, name: &str) -> PolygonStyle {
        self.style.as_ref().map_or(PolygonStyle::Plain, |f| f(name))
    }

    /// Name of the country fill hit by `ray`, if any.
    pub fn country_hit(&self, ray: &Ray) -> Option<&str> {
        let (_, index) = MeshSurface::new(&self.meshes).nearest_hit(ray)?;
        self.names.get(index).map(String::as_str)
    }
}

impl GlobeRenderer for HeadlessRenderer {
    fn set_polygons(&mut self, geometry: &CountryLayerSnapshot) {
        self.names.clear();
        self.meshes.clear();
        for country in &geometry.countries {
            for mesh in &country.polygons {
                self.names.push(country.name.clone());
                self.meshes.push(mesh.clone());
            }
        }
        self.borders = geometry.borders.clone();
    }

    fn set_polygon_style_fn(&mut self, style: PolygonStyleFn) {
        self.style = Some(style);
    }

    fn intersect_ray(&self, ray: &Ray) -> Option<Vec3> {
        MeshSurface::new(&self.meshes)
            .intersect_ray(ray)
            .or_else(|| self.sphere.intersect_ray(ray))
    }
}
