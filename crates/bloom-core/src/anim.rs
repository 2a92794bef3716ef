//! Turntable animation track.
//!
//! The turntable keys rotation at time 0 -> 0 and time 1 -> 137.647
//! with linear tangents and cyclic pre/post-infinity. One cycle is one
//! golden angle: advancing a phyllotaxis head by the golden angle maps
//! the pattern near-onto itself, so the per-cycle snap back to 0 reads
//! as continuous rotation.

/// One keyframe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Key {
    pub time: f64,
    pub value: f64,
}

/// Behavior outside the keyed range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infinity {
    /// Hold the boundary key's value.
    Constant,
    /// Repeat the keyed range.
    Cycle,
}

/// A keyframe track with linear interpolation.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Keys in ascending time order.
    pub keys: Vec<Key>,
    pub pre: Infinity,
    pub post: Infinity,
}

/// The turntable's rotation per cycle, degrees: a rounding of the
/// golden angle.
pub const TURNTABLE_STEP_DEGREES: f64 = 137.647;

/// Playback end time for one turntable cycle, seconds.
pub const TURNTABLE_END_TIME: f64 = 1.0;

impl Track {
    /// Build a track from keys, sorting them by time.
    pub fn new(mut keys: Vec<Key>, pre: Infinity, post: Infinity) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys, pre, post }
    }

    /// The standard turntable: 0 -> 137.647 over one second, cycling
    /// forever in both directions.
    pub fn turntable() -> Self {
        Self::new(
            vec![
                Key { time: 0.0, value: 0.0 },
                Key { time: TURNTABLE_END_TIME, value: TURNTABLE_STEP_DEGREES },
            ],
            Infinity::Cycle,
            Infinity::Cycle,
        )
    }

    /// Sample the track at a time.
    ///
    /// Inside the keyed range: linear interpolation between the
    /// surrounding keys. Outside: per the pre/post infinity setting.
    pub fn sample(&self, t: f64) -> f64 {
        let (Some(&first), Some(&last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        let span = last.time - first.time;

        let t = if t < first.time {
            match self.pre {
                Infinity::Constant => return first.value,
                Infinity::Cycle if span > 0.0 => {
                    first.time + (t - first.time).rem_euclid(span)
                }
                Infinity::Cycle => return first.value,
            }
        } else if t > last.time {
            match self.post {
                Infinity::Constant => return last.value,
                Infinity::Cycle if span > 0.0 => {
                    first.time + (t - first.time).rem_euclid(span)
                }
                Infinity::Cycle => return last.value,
            }
        } else {
            t
        };

        // Find the surrounding pair and interpolate.
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.time && t <= b.time {
                if b.time == a.time {
                    return b.value;
                }
                let alpha = (t - a.time) / (b.time - a.time);
                return a.value + (b.value - a.value) * alpha;
            }
        }
        first.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turntable_keys() {
        let track = Track::turntable();
        assert_eq!(track.keys[0], Key { time: 0.0, value: 0.0 });
        assert_eq!(track.keys[1], Key { time: 1.0, value: 137.647 });
    }

    #[test]
    fn linear_inside_range() {
        let track = Track::turntable();
        assert_eq!(track.sample(0.0), 0.0);
        assert!((track.sample(0.5) - 137.647 / 2.0).abs() < 1e-12);
        assert_eq!(track.sample(1.0), 137.647);
    }

    #[test]
    fn cycles_past_the_end() {
        let track = Track::turntable();
        // 2.25s = 0.25 into the third cycle
        assert!((track.sample(2.25) - track.sample(0.25)).abs() < 1e-9);
    }

    #[test]
    fn cycles_before_the_start() {
        let track = Track::turntable();
        // -0.25s = 0.75 into the previous cycle
        assert!((track.sample(-0.25) - track.sample(0.75)).abs() < 1e-9);
    }

    #[test]
    fn constant_infinity_holds_values() {
        let track = Track::new(
            vec![
                Key { time: 0.0, value: 3.0 },
                Key { time: 2.0, value: 7.0 },
            ],
            Infinity::Constant,
            Infinity::Constant,
        );
        assert_eq!(track.sample(-5.0), 3.0);
        assert_eq!(track.sample(99.0), 7.0);
    }

    #[test]
    fn empty_track_samples_zero() {
        let track = Track::new(Vec::new(), Infinity::Constant, Infinity::Constant);
        assert_eq!(track.sample(1.0), 0.0);
    }

    #[test]
    fn keys_are_sorted_on_construction() {
        let track = Track::new(
            vec![
                Key { time: 1.0, value: 10.0 },
                Key { time: 0.0, value: 0.0 },
            ],
            Infinity::Constant,
            Infinity::Constant,
        );
        assert_eq!(track.keys[0].time, 0.0);
        assert!((track.sample(0.5) - 5.0).abs() < 1e-12);
    }
}
