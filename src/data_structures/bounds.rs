use cgmath::{Matrix4, Point3, Transform as _, Vector3};

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(point1: Point3<f32>, point2: Point3<f32>) -> Aabb {
        let min = Point3::new(
            point1.x.min(point2.x),
            point1.y.min(point2.y),
            point1.z.min(point2.z),
        );
        let max = Point3::new(
            point1.x.max(point2.x),
            point1.y.max(point2.y),
            point1.z.max(point2.z),
        );
        Aabb { min, max }
    }

    /// Smallest box containing all `points`, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Point3<f32>>) -> Option<Aabb> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Aabb::new(first, first), |aabb, p| aabb.expand(p)))
    }

    pub fn expand(&self, point: Point3<f32>) -> Aabb {
        Aabb {
            min: Point3::new(
                self.min.x.min(point.x),
                self.min.y.min(point.y),
                self.min.z.min(point.z),
            ),
            max: Point3::new(
                self.max.x.max(point.x),
                self.max.y.max(point.y),
                self.max.z.max(point.z),
            ),
        }
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        self.expand(other.min).expand(other.max)
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn corners(&self) -> [Point3<f32>; 8] {
        [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Bounds of this box after `matrix` is applied to all eight corners.
    pub fn transform(&self, matrix: &Matrix4<f32>) -> Aabb {
        let corners = self.corners().map(|corner| matrix.transform_point(corner));
        let first = corners[0];
        corners[1..]
            .iter()
            .fold(Aabb::new(first, first), |aabb, &p| aabb.expand(p))
    }
}
