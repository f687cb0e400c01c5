/// Motion clip handle as supplied by the asset side. The blender drives
/// playback time and influence; the clip only stores them.
pub trait MotionClip {
    /// Length of one playthrough in seconds
    fn duration(&self) -> f32;
    fn is_looping(&self) -> bool;
    fn current_time(&self) -> f32;
    fn set_current_time(&mut self, t: f32);
    fn weight(&self) -> f32;
    fn set_weight(&mut self, w: f32);

    /// Advance playback; looping clips wrap, others clamp at the end
    fn advance(&mut self, dt: f32) {
        let duration = self.duration();
        let mut t = self.current_time() + dt;
        if duration <= 0.0 {
            t = 0.0;
        } else if self.is_looping() {
            t = t.rem_euclid(duration);
        } else {
            t = t.min(duration);
        }
        self.set_current_time(t);
    }

    fn remaining(&self) -> f32 {
        (self.duration() - self.current_time()).max(0.0)
    }
}

/// Plain in-memory clip
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    duration: f32,
    looping: bool,
    time: f32,
    weight: f32,
}

impl Clip {
    pub fn looping(duration: f32) -> Self {
        Self { duration, looping: true, time: 0.0, weight: 0.0 }
    }

    pub fn once(duration: f32) -> Self {
        Self { duration, looping: false, time: 0.0, weight: 0.0 }
    }
}

impl MotionClip for Clip {
    fn duration(&self) -> f32 {
        self.duration
    }

    fn is_looping(&self) -> bool {
        self.looping
    }

    fn current_time(&self) -> f32 {
        self.time
    }

    fn set_current_time(&mut self, t: f32) {
        self.time = t;
    }

    fn weight(&self) -> f32 {
        self.weight
    }

    fn set_weight(&mut self, w: f32) {
        self.weight = w.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_looping_clip_wraps() {
        let mut clip = Clip::looping(1.0);
        clip.advance(0.75);
        clip.advance(0.5);
        assert_abs_diff_eq!(clip.current_time(), 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_one_shot_clip_clamps() {
        let mut clip = Clip::once(0.5);
        clip.advance(0.4);
        clip.advance(0.4);
        assert_eq!(clip.current_time(), 0.5);
        assert_eq!(clip.remaining(), 0.0);
    }
}
