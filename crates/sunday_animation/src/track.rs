use std::sync::atomic::{AtomicBool, Ordering};

use glam::{Mat4, Quat, Vec3};
use sunday_core::scene::ImportedChannel;

use crate::values::{Interpolatable, Keyframe};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPosition {
    pub position: Vec3,
    pub timestamp: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyRotation {
    pub orientation: Quat,
    pub timestamp: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyScale {
    pub scale: Vec3,
    pub timestamp: f32,
}

impl Keyframe for KeyPosition {
    type Value = Vec3;

    fn timestamp(&self) -> f32 {
        self.timestamp
    }

    fn value(&self) -> Vec3 {
        self.position
    }
}

impl Keyframe for KeyRotation {
    type Value = Quat;

    fn timestamp(&self) -> f32 {
        self.timestamp
    }

    fn value(&self) -> Quat {
        self.orientation
    }
}

impl Keyframe for KeyScale {
    type Value = Vec3;

    fn timestamp(&self) -> f32 {
        self.timestamp
    }

    fn value(&self) -> Vec3 {
        self.scale
    }
}

/// Keyframes of one bone for one clip.
///
/// Position, rotation and scale are independent channels: they may have
/// different key counts and timestamps. A track is immutable once built;
/// sampling never writes into it, so a clip can be shared between animators.
#[derive(Debug)]
pub struct BoneTrack {
    name: String,
    id: u32,
    positions: Vec<KeyPosition>,
    rotations: Vec<KeyRotation>,
    scales: Vec<KeyScale>,
    /// Set once the past-the-end clamp has been reported.
    clamp_reported: AtomicBool,
}

impl Clone for BoneTrack {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            id: self.id,
            positions: self.positions.clone(),
            rotations: self.rotations.clone(),
            scales: self.scales.clone(),
            clamp_reported: AtomicBool::new(self.clamp_reported.load(Ordering::Relaxed)),
        }
    }
}

impl BoneTrack {
    /// Copies every key of `channel` in source order.
    #[must_use]
    pub fn new(name: &str, id: u32, channel: &ImportedChannel) -> Self {
        let positions = channel
            .position_keys
            .iter()
            .map(|key| KeyPosition {
                position: key.value,
                timestamp: key.time as f32,
            })
            .collect();

        let rotations = channel
            .rotation_keys
            .iter()
            .map(|key| KeyRotation {
                orientation: key.value,
                timestamp: key.time as f32,
            })
            .collect();

        let scales = channel
            .scaling_keys
            .iter()
            .map(|key| KeyScale {
                scale: key.value,
                timestamp: key.time as f32,
            })
            .collect();

        Self::from_keys(name, id, positions, rotations, scales)
    }

    #[must_use]
    pub fn from_keys(
        name: &str,
        id: u32,
        positions: Vec<KeyPosition>,
        rotations: Vec<KeyRotation>,
        scales: Vec<KeyScale>,
    ) -> Self {
        if positions.is_empty() || rotations.is_empty() || scales.is_empty() {
            log::warn!(
                "Bone track '{name}' has an empty channel \
                 (positions: {}, rotations: {}, scales: {})",
                positions.len(),
                rotations.len(),
                scales.len()
            );
        }
        if !is_ascending(&positions) || !is_ascending(&rotations) || !is_ascending(&scales) {
            log::warn!("Bone track '{name}' has keys out of timestamp order");
        }

        Self {
            name: name.to_string(),
            id,
            positions,
            rotations,
            scales,
            clamp_reported: AtomicBool::new(false),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn positions(&self) -> &[KeyPosition] {
        &self.positions
    }

    #[must_use]
    pub fn rotations(&self) -> &[KeyRotation] {
        &self.rotations
    }

    #[must_use]
    pub fn scales(&self) -> &[KeyScale] {
        &self.scales
    }

    /// `translation * rotation * scale` at `time` (in ticks).
    #[must_use]
    pub fn local_transform(&self, time: f32) -> Mat4 {
        self.interpolate_position(time)
            * self.interpolate_rotation(time)
            * self.interpolate_scaling(time)
    }

    /// Start index of the position segment containing `time`.
    #[must_use]
    pub fn position_index(&self, time: f32) -> usize {
        self.segment_or_last(&self.positions, time, "position")
    }

    /// Start index of the rotation segment containing `time`.
    #[must_use]
    pub fn rotation_index(&self, time: f32) -> usize {
        self.segment_or_last(&self.rotations, time, "rotation")
    }

    /// Start index of the scale segment containing `time`.
    #[must_use]
    pub fn scale_index(&self, time: f32) -> usize {
        self.segment_or_last(&self.scales, time, "scale")
    }

    #[must_use]
    pub fn translation_at(&self, time: f32) -> Vec3 {
        self.sample(&self.positions, time, "position")
            .unwrap_or(Vec3::ZERO)
    }

    /// Always a unit quaternion.
    #[must_use]
    pub fn rotation_at(&self, time: f32) -> Quat {
        self.sample(&self.rotations, time, "rotation")
            .map_or(Quat::IDENTITY, Quat::normalize)
    }

    #[must_use]
    pub fn scale_at(&self, time: f32) -> Vec3 {
        self.sample(&self.scales, time, "scale")
            .unwrap_or(Vec3::ONE)
    }

    #[must_use]
    pub fn interpolate_position(&self, time: f32) -> Mat4 {
        Mat4::from_translation(self.translation_at(time))
    }

    #[must_use]
    pub fn interpolate_rotation(&self, time: f32) -> Mat4 {
        Mat4::from_quat(self.rotation_at(time))
    }

    #[must_use]
    pub fn interpolate_scaling(&self, time: f32) -> Mat4 {
        Mat4::from_scale(self.scale_at(time))
    }

    fn sample<K: Keyframe>(&self, keys: &[K], time: f32, channel: &str) -> Option<K::Value> {
        match keys {
            [] => None,
            [only] => Some(only.value()),
            _ => {
                let i = self.segment_or_last(keys, time, channel);
                let (k0, k1) = (&keys[i], &keys[i + 1]);
                let factor = scale_factor(k0.timestamp(), k1.timestamp(), time);
                Some(<K::Value as Interpolatable>::interpolate_linear(
                    k0.value(),
                    k1.value(),
                    factor,
                ))
            }
        }
    }

    /// Recovers from `time` lying past the last key by falling back to the
    /// last segment. Only the first clamp of a track is reported at `warn`.
    fn segment_or_last<K: Keyframe>(&self, keys: &[K], time: f32, channel: &str) -> usize {
        if let Some(index) = find_segment(keys, time) {
            return index;
        }
        if let [.., last] = keys
            && keys.len() >= 2
            && time > last.timestamp()
        {
            let level = if self.clamp_reported.swap(true, Ordering::Relaxed) {
                log::Level::Debug
            } else {
                log::Level::Warn
            };
            log::log!(
                level,
                "Bone '{}': time {time} is past the last {channel} key ({}), clamping",
                self.name,
                last.timestamp()
            );
        }
        keys.len().saturating_sub(2)
    }
}

/// First `i` with `time < keys[i + 1].timestamp`, scanning from the start.
pub(crate) fn find_segment<K: Keyframe>(keys: &[K], time: f32) -> Option<usize> {
    keys.windows(2).position(|pair| time < pair[1].timestamp())
}

/// Normalized position of `time` inside `[last, next]`, clamped to `[0, 1]`.
pub(crate) fn scale_factor(last_timestamp: f32, next_timestamp: f32, time: f32) -> f32 {
    let frames_diff = next_timestamp - last_timestamp;
    if frames_diff <= f32::EPSILON {
        return 0.0;
    }
    ((time - last_timestamp) / frames_diff).clamp(0.0, 1.0)
}

fn is_ascending<K: Keyframe>(keys: &[K]) -> bool {
    keys.windows(2).all(|pair| pair[0].timestamp() <= pair[1].timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(times: &[f32]) -> Vec<KeyPosition> {
        times
            .iter()
            .map(|&timestamp| KeyPosition {
                position: Vec3::ZERO,
                timestamp,
            })
            .collect()
    }

    #[test]
    fn find_segment_picks_first_bracketing_pair() {
        let k = keys(&[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(find_segment(&k, 0.0), Some(0));
        assert_eq!(find_segment(&k, 0.5), Some(0));
        assert_eq!(find_segment(&k, 1.0), Some(1));
        assert_eq!(find_segment(&k, 2.99), Some(2));
    }

    #[test]
    fn find_segment_falls_through_past_the_end() {
        let k = keys(&[0.0, 1.0]);
        assert_eq!(find_segment(&k, 1.0), None);
        assert_eq!(find_segment(&k, 7.0), None);
    }

    #[test]
    fn clamp_past_the_end_is_reported_once_per_track() {
        let track = BoneTrack::from_keys(
            "Hip",
            0,
            keys(&[0.0, 2.0]),
            vec![KeyRotation {
                orientation: Quat::IDENTITY,
                timestamp: 0.0,
            }],
            vec![KeyScale {
                scale: Vec3::ONE,
                timestamp: 0.0,
            }],
        );
        assert!(!track.clamp_reported.load(Ordering::Relaxed));

        assert_eq!(track.position_index(1.0), 0);
        assert!(!track.clamp_reported.load(Ordering::Relaxed));

        for time in [5.0, 6.0, 9.0] {
            assert_eq!(track.position_index(time), 0);
        }
        assert!(track.clamp_reported.load(Ordering::Relaxed));
        assert!(track.clone().clamp_reported.load(Ordering::Relaxed));
    }

    #[test]
    fn scale_factor_handles_degenerate_segments() {
        assert_eq!(scale_factor(2.0, 2.0, 2.0), 0.0);
        assert_eq!(scale_factor(0.0, 4.0, 1.0), 0.25);
        assert_eq!(scale_factor(0.0, 4.0, 9.0), 1.0);
        assert_eq!(scale_factor(1.0, 4.0, 0.0), 0.0);
    }
}
