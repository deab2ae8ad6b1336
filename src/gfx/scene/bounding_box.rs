//! Model-space bounding boxes and scene normalization

use cgmath::Vector3;

/// Floor for the largest bounding box extent when normalizing.
pub const NORMALIZATION_EPSILON: f32 = 1.0e-6;

/// Axis-aligned box in model space, computed once when geometry is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    /// Builds a box, swapping components so that `min <= max` holds.
    pub fn new(a: Vector3<f32>, b: Vector3<f32>) -> Self {
        Self {
            min: Vector3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Vector3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box around `points`, `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = [f32; 3]>,
    {
        let mut points = points.into_iter();
        let first = Vector3::from(points.next()?);
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (
                Vector3::new(min.x.min(p[0]), min.y.min(p[1]), min.z.min(p[2])),
                Vector3::new(max.x.max(p[0]), max.y.max(p[1]), max.z.max(p[2])),
            )
        });
        Some(Self { min, max })
    }

    pub fn union(&self, other: &BoundingBox) -> Self {
        Self {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}

/// Scale and centre that fit a scene's reference box into the view volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub center: Vector3<f32>,
    pub scale: f32,
}

impl Normalization {
    /// `scale = target_size / max(extent) * fudge`, with the extent floored
    /// at [`NORMALIZATION_EPSILON`].
    pub fn from_bounds(bounds: &BoundingBox, target_size: f32, fudge: f32) -> Self {
        Self {
            center: bounds.center(),
            scale: target_size / bounds.max_extent().max(NORMALIZATION_EPSILON) * fudge,
        }
    }

    /// True when the box needed the epsilon floor.
    pub fn is_degenerate(bounds: &BoundingBox) -> bool {
        bounds.max_extent() < NORMALIZATION_EPSILON
    }
}
