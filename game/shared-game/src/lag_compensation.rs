pub mod lag_compensation {
    use std::collections::VecDeque;

    use math::math::vector::vec2;

    /// how much history every combat entity keeps
    pub const HISTORY_WINDOW_MS: u64 = 1000;
    /// the furthest back a hit check may be rewound, whatever the
    /// attacker's latency claims
    pub const MAX_REWIND_MS: u64 = 500;

    /// rolling `{timestamp, position}` samples, recorded once per tick
    #[derive(Debug, Default, Clone)]
    pub struct PositionHistory {
        samples: VecDeque<(u64, vec2)>,
    }

    impl PositionHistory {
        pub fn record(&mut self, time_ms: u64, pos: vec2) {
            self.samples.push_back((time_ms, pos));
            while let Some(&(t, _)) = self.samples.front() {
                if t + HISTORY_WINDOW_MS < time_ms {
                    self.samples.pop_front();
                } else {
                    break;
                }
            }
        }

        /// the recorded position nearest to `at_ms`, bounded to the
        /// rewind window ending at `now_ms`
        pub fn sample_at(&self, now_ms: u64, at_ms: u64) -> Option<vec2> {
            let at = at_ms.clamp(now_ms.saturating_sub(MAX_REWIND_MS), now_ms);
            self.samples
                .iter()
                .min_by_key(|(t, _)| t.abs_diff(at))
                .map(|(_, pos)| *pos)
        }

        pub fn clear(&mut self) {
            self.samples.clear();
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn history_is_pruned_to_the_window() {
            let mut history = PositionHistory::default();
            for i in 0..100u64 {
                history.record(i * 50, vec2::new(i as f32, 0.0));
            }
            // 100 ticks at 50 ms; only the last second (21 samples) survives
            assert!(history.samples.len() <= 21);
            assert!(history.samples.front().unwrap().0 >= 3900);
        }

        #[test]
        fn rewind_is_bounded_to_500_ms() {
            let mut history = PositionHistory::default();
            for i in 0..=20u64 {
                history.record(i * 50, vec2::new(i as f32, 0.0));
            }
            let now = 1000;
            // asking for 800 ms back gets clamped to 500 ms back
            assert_eq!(
                history.sample_at(now, 200),
                Some(vec2::new(10.0, 0.0))
            );
            // in-window requests hit the nearest sample
            assert_eq!(
                history.sample_at(now, 760),
                Some(vec2::new(15.0, 0.0))
            );
            assert_eq!(PositionHistory::default().sample_at(now, 900), None);
        }
    }
}
