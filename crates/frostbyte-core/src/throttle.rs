//! Snow sampling stride: refresh the snow lookup only every `stride`
//! points and carry the last known value forward in between.
//!
//! This bounds outbound call volume and materially changes the
//! accumulated snow cost versus per-point querying, so the stride is an
//! explicit, testable piece of state rather than a loop counter.

use crate::models::SnowSample;

#[derive(Debug, Clone)]
pub struct SnowThrottle {
    stride: usize,
    last: Option<SnowSample>,
    points_since_refresh: usize,
}

impl SnowThrottle {
    pub const DEFAULT_STRIDE: usize = 20;

    pub fn new(stride: usize) -> Self {
        Self {
            stride: stride.max(1),
            last: None,
            points_since_refresh: 0,
        }
    }

    /// True when the next point should issue a fresh snow lookup:
    /// either nothing was sampled yet or `stride` points have passed.
    pub fn needs_refresh(&self) -> bool {
        self.last.is_none() || self.points_since_refresh >= self.stride
    }

    /// Store a freshly fetched sample and restart the stride window.
    pub fn refresh(&mut self, sample: SnowSample) {
        self.last = Some(sample);
        self.points_since_refresh = 0;
    }

    /// Consume one point and return the sample that applies to it.
    pub fn advance(&mut self) -> Option<SnowSample> {
        self.points_since_refresh += 1;
        self.last
    }
}

impl Default for SnowThrottle {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STRIDE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SnowSample, SnowStatus};

    fn sample(risk: f64) -> SnowSample {
        SnowSample {
            status: SnowStatus::Unknown,
            risk,
        }
    }

    #[test]
    fn refreshes_on_stride_boundaries() {
        let mut throttle = SnowThrottle::new(20);
        let mut refresh_points = Vec::new();

        for i in 0..44 {
            if throttle.needs_refresh() {
                refresh_points.push(i);
                throttle.refresh(sample(0.3));
            }
            assert!(throttle.advance().is_some());
        }

        // 45 sampled points = 44 segments: lookups land on points 0, 20, 40.
        assert_eq!(refresh_points, vec![0, 20, 40]);
    }

    #[test]
    fn carries_last_sample_forward() {
        let mut throttle = SnowThrottle::new(3);
        assert!(throttle.needs_refresh());
        throttle.refresh(sample(0.9));

        for _ in 0..3 {
            let current = throttle.advance().unwrap();
            assert_eq!(current.risk, 0.9);
        }
        assert!(throttle.needs_refresh());

        throttle.refresh(sample(0.1));
        assert_eq!(throttle.advance().unwrap().risk, 0.1);
    }

    #[test]
    fn stride_zero_is_clamped_to_one() {
        let mut throttle = SnowThrottle::new(0);
        throttle.refresh(sample(0.5));
        throttle.advance();
        assert!(throttle.needs_refresh());
    }
}
