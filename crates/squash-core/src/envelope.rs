//! Level detector feeding the compressor's gain computer.

use libm::expf;

/// One-pole smoothing coefficient for a time constant, 0 for an instant
/// response.
fn smoothing(seconds: f32, sample_rate: f32) -> f32 {
    let samples = seconds * sample_rate;
    if samples > 0.0 {
        expf(-1.0 / samples)
    } else {
        0.0
    }
}

/// Rectifying one-pole follower that rises with the attack time and falls
/// with the release time.
///
/// ```rust
/// use squash_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::new(44100.0);
/// env.set_attack(0.0);
/// assert_eq!(env.process(-0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    sample_rate: f32,
    attack: f32,
    release: f32,
    rise: f32,
    fall: f32,
    level: f32,
}

impl EnvelopeFollower {
    /// A follower at rest with 3 ms attack and 250 ms release.
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            sample_rate,
            attack: 0.003,
            release: 0.25,
            rise: 0.0,
            fall: 0.0,
            level: 0.0,
        };
        env.update();
        env
    }

    /// Attack in seconds, negative taken as 0.
    pub fn set_attack(&mut self, seconds: f32) {
        let seconds = seconds.max(0.0);
        if seconds != self.attack {
            self.attack = seconds;
            self.rise = smoothing(seconds, self.sample_rate);
        }
    }

    /// Attack in seconds.
    pub fn attack(&self) -> f32 {
        self.attack
    }

    /// Release in seconds, negative taken as 0.
    pub fn set_release(&mut self, seconds: f32) {
        let seconds = seconds.max(0.0);
        if seconds != self.release {
            self.release = seconds;
            self.fall = smoothing(seconds, self.sample_rate);
        }
    }

    /// Release in seconds.
    pub fn release(&self) -> f32 {
        self.release
    }

    /// Change the rate the time constants are measured against.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update();
    }

    /// Feed one sample, get the new level.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let target = input.abs();
        let k = if target > self.level {
            self.rise
        } else {
            self.fall
        };
        self.level = crate::flush_denormal(target + k * (self.level - target));
        self.level
    }

    /// Level after the last sample.
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Drop back to silence.
    pub fn reset(&mut self) {
        self.level = 0.0;
    }

    fn update(&mut self) {
        self.rise = smoothing(self.attack, self.sample_rate);
        self.fall = smoothing(self.release, self.sample_rate);
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rises_within_a_few_time_constants() {
        let mut env = EnvelopeFollower::new(44100.0);
        env.set_attack(0.001);
        let level = (0..441).fold(0.0, |_, _| env.process(1.0));
        // ten time constants
        assert!(level > 0.99, "got {level}");
    }

    #[test]
    fn falls_with_release() {
        let mut env = EnvelopeFollower::new(44100.0);
        env.set_attack(0.0);
        env.set_release(0.01);
        env.process(1.0);
        let level = (0..882).fold(0.0, |_, _| env.process(0.0));
        // two time constants, e^-2
        assert!((0.12..0.15).contains(&level), "got {level}");
    }

    #[test]
    fn instant_attack_tracks_peaks() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.set_attack(-1.0);
        assert_eq!(env.attack(), 0.0);
        assert_eq!(env.process(-0.75), 0.75);
    }

    #[test]
    fn reset_returns_to_silence() {
        let mut env = EnvelopeFollower::new(48000.0);
        env.process(1.0);
        env.reset();
        assert_eq!(env.level(), 0.0);
    }
}
