use serde::{Deserialize, Serialize};

/// A point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Center {
    /// Horizontal coordinate in pixels.
    pub x: f32,
    /// Vertical coordinate in pixels.
    pub y: f32,
}

impl Center {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis aligned box in left-top-width-height format, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl BoundingBox {
    /// Create a new box from its top-left corner and extent.
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rebuild a box from a centre and a `[width, height]` extent.
    ///
    /// The top-left corner is placed at `center - (size - 1) / 2`, which is the
    /// pixel-index convention the tracker reports boxes in.
    ///
    /// ```
    /// use siamtrack_tracker::{BoundingBox, Center};
    ///
    /// let bbox = BoundingBox::from_center_size(Center::new(50.0, 50.0), [21.0, 11.0]);
    /// assert_eq!(bbox, BoundingBox::new(40.0, 45.0, 21.0, 11.0));
    /// ```
    pub fn from_center_size(center: Center, size: [f32; 2]) -> Self {
        Self {
            x: center.x - (size[0] - 1.0) / 2.0,
            y: center.y - (size[1] - 1.0) / 2.0,
            w: size[0],
            h: size[1],
        }
    }

    /// Centre of the box, `(x + w / 2, y + h / 2)`.
    #[inline]
    pub fn center(&self) -> Center {
        Center::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Extent of the box as `[width, height]`.
    #[inline]
    pub fn size(&self) -> [f32; 2] {
        [self.w, self.h]
    }

    /// True when both sides are finite and strictly positive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.w > 0.0 && self.h > 0.0 && self.w.is_finite() && self.h.is_finite()
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x, bbox.y, bbox.w, bbox.h]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        BoundingBox::new(v[0], v[1], v[2], v[3])
    }
}
