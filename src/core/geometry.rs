// imgpress/src/core/geometry.rs

/// Width and height in pixels, with sub-pixel precision until `integral`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn from_dimensions((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    /// Rounds both axes to whole pixels, never below one.
    pub fn integral(&self) -> (u32, u32) {
        let round = |v: f64| v.round().max(1.0).min(u32::MAX as f64) as u32;
        (round(self.width), round(self.height))
    }
}

/// A 2-D affine transform in row-vector form:
/// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
///
/// `translated_by`, `rotated_by` and `scaled_by` prepend the new operation,
/// so the most recently added step is the first one applied to a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: AffineTransform = AffineTransform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// Counter-clockwise rotation in a y-up coordinate space.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Returns the transform that applies `self` first, then `other`.
    pub fn concatenating(&self, other: &AffineTransform) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.tx * other.a + self.ty * other.c + other.tx,
            ty: self.tx * other.b + self.ty * other.d + other.ty,
        }
    }

    pub fn translated_by(&self, tx: f64, ty: f64) -> Self {
        Self::translation(tx, ty).concatenating(self)
    }

    pub fn rotated_by(&self, radians: f64) -> Self {
        Self::rotation(radians).concatenating(self)
    }

    pub fn scaled_by(&self, sx: f64, sy: f64) -> Self {
        Self::scale(sx, sy).concatenating(self)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// `None` when the matrix is singular.
    pub fn inverted(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }

        Some(Self {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            tx: (self.c * self.ty - self.d * self.tx) / det,
            ty: (self.b * self.tx - self.a * self.ty) / det,
        })
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    pub fn approx_eq(&self, other: &AffineTransform, epsilon: f64) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.tx - other.tx,
            self.ty - other.ty,
        ]
        .iter()
        .all(|delta| delta.abs() <= epsilon)
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, 1e-9)
    }
}
