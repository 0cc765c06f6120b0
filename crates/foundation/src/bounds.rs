/// Axis-aligned bounding boxes
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Tight box around `points`, or `None` when there are none.
    pub fn from_points(points: impl IntoIterator<Item = [f64; 2]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Aabb2::new(first, first);
        for p in iter {
            b.extend(p);
        }
        Some(b)
    }

    pub fn extend(&mut self, p: [f64; 2]) {
        for axis in 0..2 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    pub fn union(self, other: Self) -> Self {
        let mut out = self;
        out.extend(other.min);
        out.extend(other.max);
        out
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        p[0] >= self.min[0] && p[0] <= self.max[0] && p[1] >= self.min[1] && p[1] <= self.max[1]
    }
}
impl Aabb3 {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Aabb3 { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = [f64; 3]>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Aabb3::new(first, first);
        for p in iter {
            for axis in 0..3 {
                b.min[axis] = b.min[axis].min(p[axis]);
                b.max[axis] = b.max[axis].max(p[axis]);
            }
        }
        Some(b)
    }
}

#[cfg(test)]
mod tests {
    use super::{Aabb2, Aabb3};

    #[test]
    fn aabb2_from_points_and_contains() {
        let b = Aabb2::from_points([[0.0, 1.0], [4.0, -2.0], [2.0, 3.0]]).expect("non-empty");
        assert_eq!(b, Aabb2::new([0.0, -2.0], [4.0, 3.0]));
        assert!(b.contains([4.0, 3.0]));
        assert!(!b.contains([4.1, 0.0]));
        assert!(Aabb2::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn aabb2_union() {
        let a = Aabb2::new([0.0, 0.0], [1.0, 1.0]);
        let b = Aabb2::new([-1.0, 0.5], [0.5, 2.0]);
        assert_eq!(a.union(b), Aabb2::new([-1.0, 0.0], [1.0, 2.0]));
    }

    #[test]
    fn aabb3_from_points() {
        let b = Aabb3::from_points([[1.0, 2.0, 3.0], [-1.0, 5.0, 0.0]]).expect("non-empty");
        assert_eq!(b, Aabb3::new([-1.0, 2.0, 0.0], [1.0, 5.0, 3.0]));
    }
}
