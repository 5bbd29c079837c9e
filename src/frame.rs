/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Frame sequence bound to display refresh.
///
/// Yields forever until `cancel` is called, then never again: a cancelled
/// loop cannot be resumed, a new one has to be created.
pub struct RenderLoop {
    frame_number: u64,
    start_time: std::time::Instant,
    last_frame_time: std::time::Instant,
    cancelled: bool,
}

impl RenderLoop {
    pub fn new() -> Self {
        let now = std::time::Instant::now();
        Self {
            frame_number: 0,
            start_time: now,
            last_frame_time: now,
            cancelled: false,
        }
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_running(&self) -> bool {
        !self.cancelled
    }

    /// Frames produced so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for RenderLoop {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        if self.cancelled {
            return None;
        }

        let now = std::time::Instant::now();
        let delta = now.duration_since(self.last_frame_time).as_secs_f32();
        let time = now.duration_since(self.start_time).as_secs_f32();

        let info = FrameInfo::new(self.frame_number, time, delta);

        self.frame_number += 1;
        self.last_frame_time = now;

        Some(info)
    }
}

impl std::iter::FusedIterator for RenderLoop {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_numbered_in_order() {
        let mut frames = RenderLoop::new();
        let numbers: Vec<u64> = frames.by_ref().take(5).map(|f| f.number).collect();

        assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
        assert_eq!(frames.frame_number(), 5);
    }

    #[test]
    fn time_is_monotonic() {
        let mut frames = RenderLoop::new();
        let first = frames.next().unwrap();
        let second = frames.next().unwrap();

        assert!(second.time >= first.time);
        assert!(second.delta >= 0.0);
    }

    #[test]
    fn cancelled_loop_stays_cancelled() {
        let mut frames = RenderLoop::new();
        assert!(frames.next().is_some());

        frames.cancel();
        assert!(!frames.is_running());
        assert!(frames.next().is_none());
        assert!(frames.next().is_none());
        assert_eq!(frames.frame_number(), 1);
    }
}
