pub mod anti_cheat {
    use std::collections::VecDeque;

    use serde::Serialize;

    /// inputs allowed inside the sliding one second window
    pub const INPUT_RATE_CAP: usize = 120;
    const INPUT_RATE_WINDOW_MS: u64 = 1000;

    /// client frame times must stay inside [1/240, 1/20] seconds
    pub const MIN_INPUT_DT: f32 = 1.0 / 240.0;
    pub const MAX_INPUT_DT: f32 = 1.0 / 20.0;

    /// slack on the per-input movement bound; legitimate clients never
    /// get near it, clock jitter must not trip it
    const MOVE_DELTA_SAFETY: f32 = 1.5;

    /// ability requests may arrive this much faster than the most
    /// permissive cooldown
    const ABILITY_RATE_MARGIN: u64 = 2;

    /// soft flags tolerated before the session is closed
    const DISCONNECT_THRESHOLD: u64 = 20;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum ViolationKind {
        InputRate,
        DeltaTime,
        MoveDelta,
        AbilityRate,
        Sequence,
        Malformed,
    }

    /// what the caller must do with the offending message
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub enum CheatVerdict {
        Ok,
        /// drop the message, keep the session
        Ignore,
        /// threshold exceeded, close the session
        Disconnect,
    }

    /// read-only counters, handed to the external debug endpoint
    #[derive(Debug, Default, Clone, Serialize)]
    pub struct AntiCheatStats {
        pub input_rate_violations: u64,
        pub delta_time_violations: u64,
        pub move_delta_violations: u64,
        pub ability_rate_violations: u64,
        pub sequence_violations: u64,
        pub malformed_messages: u64,
        pub total_violations: u64,
    }

    /// per-session validator state. owned by the player record,
    /// dropped with it on disconnect.
    #[derive(Debug, Default)]
    pub struct SessionAntiCheat {
        input_times: VecDeque<u64>,
        highest_sequence: Option<u64>,
        last_ability_ms: Option<u64>,
        stats: AntiCheatStats,
    }

    impl SessionAntiCheat {
        /// validates one input record. `move_delta_px` is the length the
        /// input wants to move this frame, `max_speed` the entity's
        /// per-frame speed ceiling.
        pub fn check_input(
            &mut self,
            now_ms: u64,
            sequence: u64,
            delta_time: f32,
            move_delta_px: f32,
            max_speed: f32,
        ) -> CheatVerdict {
            match self.highest_sequence {
                Some(highest) if sequence <= highest => {
                    return self.violation(ViolationKind::Sequence);
                }
                _ => self.highest_sequence = Some(sequence),
            }

            self.input_times.push_back(now_ms);
            while let Some(&t) = self.input_times.front() {
                if t + INPUT_RATE_WINDOW_MS < now_ms {
                    self.input_times.pop_front();
                } else {
                    break;
                }
            }
            if self.input_times.len() > INPUT_RATE_CAP {
                return self.violation(ViolationKind::InputRate);
            }

            if !delta_time.is_finite() || !(MIN_INPUT_DT..=MAX_INPUT_DT).contains(&delta_time) {
                return self.violation(ViolationKind::DeltaTime);
            }

            let allowed = max_speed * (MAX_INPUT_DT * 60.0) * MOVE_DELTA_SAFETY;
            if move_delta_px > allowed {
                return self.violation(ViolationKind::MoveDelta);
            }

            CheatVerdict::Ok
        }

        /// rate bound for ability requests, derived from the most
        /// permissive cooldown in the attack table
        pub fn check_ability(&mut self, now_ms: u64, min_cooldown_ms: u64) -> CheatVerdict {
            let floor = min_cooldown_ms / ABILITY_RATE_MARGIN;
            if let Some(last) = self.last_ability_ms {
                if now_ms.saturating_sub(last) < floor {
                    return self.violation(ViolationKind::AbilityRate);
                }
            }
            self.last_ability_ms = Some(now_ms);
            CheatVerdict::Ok
        }

        /// a message that did not decode at all
        pub fn note_malformed(&mut self) -> CheatVerdict {
            self.violation(ViolationKind::Malformed)
        }

        /// the input queue overflowed; counts like a rate violation
        pub fn note_queue_overflow(&mut self) -> CheatVerdict {
            self.violation(ViolationKind::InputRate)
        }

        pub fn stats(&self) -> &AntiCheatStats {
            &self.stats
        }

        fn violation(&mut self, kind: ViolationKind) -> CheatVerdict {
            let counter = match kind {
                ViolationKind::InputRate => &mut self.stats.input_rate_violations,
                ViolationKind::DeltaTime => &mut self.stats.delta_time_violations,
                ViolationKind::MoveDelta => &mut self.stats.move_delta_violations,
                ViolationKind::AbilityRate => &mut self.stats.ability_rate_violations,
                ViolationKind::Sequence => &mut self.stats.sequence_violations,
                ViolationKind::Malformed => &mut self.stats.malformed_messages,
            };
            *counter += 1;
            self.stats.total_violations += 1;
            if self.stats.total_violations > DISCONNECT_THRESHOLD {
                CheatVerdict::Disconnect
            } else {
                CheatVerdict::Ignore
            }
        }
    }

    #[cfg(test)]
    mod test {
        use super::*;

        #[test]
        fn sequence_must_increase() {
            let mut cheat = SessionAntiCheat::default();
            assert_eq!(cheat.check_input(0, 1, 0.05, 5.0, 10.0), CheatVerdict::Ok);
            // gaps are fine
            assert_eq!(cheat.check_input(50, 5, 0.05, 5.0, 10.0), CheatVerdict::Ok);
            // duplicates and regressions are flagged
            assert_eq!(
                cheat.check_input(100, 5, 0.05, 5.0, 10.0),
                CheatVerdict::Ignore
            );
            assert_eq!(
                cheat.check_input(150, 2, 0.05, 5.0, 10.0),
                CheatVerdict::Ignore
            );
            assert_eq!(cheat.stats().sequence_violations, 2);
        }

        #[test]
        fn delta_time_bounds() {
            let mut cheat = SessionAntiCheat::default();
            assert_eq!(
                cheat.check_input(0, 1, 0.5, 5.0, 10.0),
                CheatVerdict::Ignore
            );
            assert_eq!(
                cheat.check_input(10, 2, 0.001, 5.0, 10.0),
                CheatVerdict::Ignore
            );
            assert_eq!(cheat.check_input(20, 3, 0.05, 5.0, 10.0), CheatVerdict::Ok);
        }

        #[test]
        fn input_rate_cap_over_sliding_window() {
            let mut cheat = SessionAntiCheat::default();
            let mut verdict = CheatVerdict::Ok;
            for seq in 0..200u64 {
                // 200 inputs within one second
                verdict = cheat.check_input(seq * 5, seq + 1, 0.05, 5.0, 10.0);
            }
            assert_eq!(verdict, CheatVerdict::Disconnect);
            assert!(cheat.stats().input_rate_violations > 0);
        }

        #[test]
        fn movement_delta_is_bounded() {
            let mut cheat = SessionAntiCheat::default();
            // 10 px/frame ceiling -> 10 * 3 * 1.5 = 45 px allowed
            assert_eq!(
                cheat.check_input(0, 1, 0.05, 44.0, 10.0),
                CheatVerdict::Ok
            );
            assert_eq!(
                cheat.check_input(10, 2, 0.05, 46.0, 10.0),
                CheatVerdict::Ignore
            );
        }

        #[test]
        fn ability_rate_uses_the_cooldown_floor() {
            let mut cheat = SessionAntiCheat::default();
            assert_eq!(cheat.check_ability(0, 300), CheatVerdict::Ok);
            assert_eq!(cheat.check_ability(100, 300), CheatVerdict::Ignore);
            assert_eq!(cheat.check_ability(300, 300), CheatVerdict::Ok);
        }

        #[test]
        fn escalation_disconnects_past_the_threshold() {
            let mut cheat = SessionAntiCheat::default();
            let mut verdict = CheatVerdict::Ok;
            for _ in 0..=DISCONNECT_THRESHOLD {
                verdict = cheat.note_malformed();
            }
            assert_eq!(verdict, CheatVerdict::Disconnect);
        }
    }
}
