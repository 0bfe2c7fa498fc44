//! Scripted contact-frame builders.
//!
//! Tests describe a touch as a stroke (where it starts, where it ends, how
//! many frames it takes) and get back the frame sequence a real trackpad
//! would deliver: one `start` frame, interpolated `move` frames, and a final
//! `released` frame with collapsed density.

use trackpal_core::contact::{ContactFrame, ContactState};

/// Default stroke frame rate.
pub const DEFAULT_FPS: f64 = 60.0;

/// Builder for one scripted single-finger stroke.
#[derive(Debug, Clone)]
pub struct TouchStroke {
    from: (f32, f32),
    to: (f32, f32),
    steps: usize,
    start_time: f64,
    fps: f64,
    density: f32,
    major_axis: f32,
    minor_axis: f32,
}

impl TouchStroke {
    /// A stroke from `from` to `to` over `steps` move frames, with ordinary
    /// fingertip geometry.
    pub fn new(from: (f32, f32), to: (f32, f32), steps: usize) -> Self {
        Self {
            from,
            to,
            steps,
            start_time: 0.0,
            fps: DEFAULT_FPS,
            density: 0.10,
            major_axis: 8.0,
            minor_axis: 7.0,
        }
    }

    /// A stationary tap held for `steps` frames.
    pub fn tap(at: (f32, f32), steps: usize) -> Self {
        Self::new(at, at, steps)
    }

    pub fn starting_at(mut self, time: f64) -> Self {
        self.start_time = time;
        self
    }

    pub fn fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    pub fn density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn contact_size(mut self, major: f32, minor: f32) -> Self {
        self.major_axis = major;
        self.minor_axis = minor;
        self
    }

    fn frame(&self, state: ContactState, x: f32, y: f32, timestamp: f64) -> ContactFrame {
        let lifting = state.is_lifting();
        ContactFrame {
            x,
            y,
            state,
            density: if lifting { 0.0 } else { self.density },
            major_axis: if lifting { 0.0 } else { self.major_axis },
            minor_axis: if lifting { 0.0 } else { self.minor_axis },
            timestamp,
        }
    }

    /// The full frame sequence: start, moves, released.
    pub fn frames(&self) -> Vec<ContactFrame> {
        let interval = 1.0 / self.fps;
        let mut frames =
            vec![self.frame(ContactState::Start, self.from.0, self.from.1, self.start_time)];
        for i in 1..=self.steps {
            let t = i as f32 / self.steps as f32;
            frames.push(self.frame(
                ContactState::Move,
                self.from.0 + (self.to.0 - self.from.0) * t,
                self.from.1 + (self.to.1 - self.from.1) * t,
                self.start_time + i as f64 * interval,
            ));
        }
        frames.push(self.frame(
            ContactState::Released,
            self.to.0,
            self.to.1,
            self.start_time + (self.steps + 1) as f64 * interval,
        ));
        frames
    }

    /// Timestamp of the stroke's released frame.
    pub fn end_time(&self) -> f64 {
        self.start_time + (self.steps + 1) as f64 / self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_shape() {
        let frames = TouchStroke::new((0.95, 0.5), (0.95, 0.35), 5).frames();
        assert_eq!(frames.len(), 7);
        assert_eq!(frames[0].state, ContactState::Start);
        assert_eq!(frames[6].state, ContactState::Released);
        assert!((frames[5].y - 0.35).abs() < 1e-6);
        // Timestamps advance at 60 Hz.
        assert!((frames[1].timestamp - frames[0].timestamp - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_release_frame_has_collapsed_density() {
        let frames = TouchStroke::tap((0.5, 0.5), 3).density(0.2).frames();
        assert_eq!(frames.last().unwrap().density, 0.0);
        assert_eq!(frames[1].density, 0.2);
    }
}
