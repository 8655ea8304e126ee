// imgpress/src/processors/orientation.rs
//! Affine transforms that render stored pixels upright.
//!
//! Coordinates are y-up with the origin at the bottom-left of the target
//! canvas. The source is drawn into the canvas rectangle, or into the
//! transposed rectangle when [`is_transposed`] is true, and the transform maps
//! that drawing onto the canvas.

use crate::core::{AffineTransform, Orientation, Size};
use std::f64::consts::{FRAC_PI_2, PI};

/// True when the stored pixel grid is rotated a quarter turn from upright,
/// so the draw rectangle must have its width and height swapped.
pub fn is_transposed(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Left
            | Orientation::LeftMirrored
            | Orientation::Right
            | Orientation::RightMirrored
    )
}

pub fn transform_for(orientation: Orientation, target: Size) -> AffineTransform {
    let (w, h) = (target.width, target.height);
    let mut transform = AffineTransform::IDENTITY;

    match orientation {
        Orientation::Down | Orientation::DownMirrored => {
            transform = transform.translated_by(w, h).rotated_by(PI);
        }
        Orientation::Left | Orientation::LeftMirrored => {
            transform = transform.translated_by(w, 0.0).rotated_by(FRAC_PI_2);
        }
        Orientation::Right | Orientation::RightMirrored => {
            transform = transform.translated_by(0.0, h).rotated_by(-FRAC_PI_2);
        }
        Orientation::Up | Orientation::UpMirrored => {}
    }

    // Mirroring is appended after rotation so it acts on the unrotated drawing.
    match orientation {
        Orientation::UpMirrored | Orientation::DownMirrored => {
            transform = transform.translated_by(w, 0.0).scaled_by(-1.0, 1.0);
        }
        Orientation::LeftMirrored | Orientation::RightMirrored => {
            transform = transform.translated_by(h, 0.0).scaled_by(-1.0, 1.0);
        }
        _ => {}
    }

    transform
}
