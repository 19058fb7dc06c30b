use glam::{Quat, Vec3};

/// A keyframe value that can be blended between two samples.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    /// Spherical interpolation along the short arc. Callers normalize the
    /// result before building a matrix from it.
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t)
    }
}

/// A timestamped sample in one of a bone's channels.
pub trait Keyframe {
    type Value: Interpolatable;

    /// Time of the sample, in ticks.
    fn timestamp(&self) -> f32;
    fn value(&self) -> Self::Value;
}
