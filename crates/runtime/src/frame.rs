use foundation::time::Time;

/// Per-frame metadata handed to the engine by the render driver.
///
/// Render loops rarely run at a fixed rate, so each frame carries its own
/// delta; `time` accumulates the deltas seen so far.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Engine time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn first(dt_s: f64) -> Self {
        Self {
            index: 0,
            dt_s,
            time: Time::ZERO,
        }
    }

    pub fn next(self, dt_s: f64) -> Self {
        Self {
            index: self.index + 1,
            dt_s,
            time: self.time.after(self.dt_s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Frame;
    use foundation::time::Time;

    #[test]
    fn first_frame_starts_at_zero() {
        let f = Frame::first(1.0 / 60.0);
        assert_eq!(f.index, 0);
        assert_eq!(f.time, Time::ZERO);
    }

    #[test]
    fn next_advances_index_and_time() {
        let f0 = Frame::first(0.5);
        let f1 = f0.next(0.25);
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
        assert_eq!(f1.dt_s, 0.25);

        let f2 = f1.next(0.25);
        assert_eq!(f2.time, Time(0.75));
    }
}
