// replacement.rs
//
// Per-set victim selection. A tagged variant per spec §9's REDESIGN FLAGS
// rather than dynamic dispatch: the config factory maps a policy name to
// one of these variants once, at hierarchy construction time.
//
// Ported from original_source/cache_simulator/policy/eviction.py. Each
// variant reads/writes only Line::policy_state, so one ReplacementPolicy
// instance is shared read-write across every set of its owning cache level
// without needing per-set state of its own.

use crate::cache::line::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    Lru,
    /// Static Re-Reference Interval Prediction, 2-bit RRPV (0..=3).
    Srrip,
}

impl ReplacementPolicy {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name {
            "LRU" => Ok(ReplacementPolicy::Lru),
            "SRRIP" => Ok(ReplacementPolicy::Srrip),
            other => Err(format!("unknown replacement_policy '{other}'")),
        }
    }

    /// Timestamp/RRPV bookkeeping for a line that was just demand- or
    /// write-hit.
    pub fn update_on_access(&self, lines: &mut [Line], line_idx: usize, t: i64) {
        match self {
            ReplacementPolicy::Lru => lines[line_idx].policy_state = Some(t),
            ReplacementPolicy::Srrip => lines[line_idx].policy_state = Some(0),
        }
    }

    /// Bookkeeping right after a line has been filled (demand or
    /// prefetch).
    pub fn on_fill(&self, lines: &mut [Line], line_idx: usize, t: i64) {
        match self {
            ReplacementPolicy::Lru => lines[line_idx].policy_state = Some(t),
            ReplacementPolicy::Srrip => lines[line_idx].policy_state = Some(2),
        }
    }

    /// Select a victim among `lines` (all assumed valid — callers only
    /// reach here once the set is full). Ties break to the lowest index.
    pub fn evict(&self, lines: &mut [Line]) -> usize {
        match self {
            ReplacementPolicy::Lru => {
                let mut min_idx = 0;
                let mut min_time = lines[0].policy_state.unwrap_or(0);
                for (i, line) in lines.iter().enumerate().skip(1) {
                    let t = line.policy_state.unwrap_or(0);
                    if t < min_time {
                        min_time = t;
                        min_idx = i;
                    }
                }
                min_idx
            },
            ReplacementPolicy::Srrip => loop {
                if let Some(idx) = lines
                    .iter()
                    .position(|line| line.policy_state.unwrap_or(3) == 3)
                {
                    return idx;
                }
                for line in lines.iter_mut() {
                    let rrpv = line.policy_state.unwrap_or(3);
                    if rrpv < 3 {
                        line.policy_state = Some(rrpv + 1);
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_lines(n: usize) -> Vec<Line> {
        (0..n)
            .map(|i| {
                let mut l = Line::new();
                l.fill(i as u64, false);
                l
            })
            .collect()
    }

    #[test]
    fn lru_evicts_smallest_timestamp_with_low_index_tiebreak() {
        let policy = ReplacementPolicy::Lru;
        let mut lines = filled_lines(4);
        for (i, line) in lines.iter_mut().enumerate() {
            line.policy_state = Some(i as i64);
        }
        lines[0].policy_state = Some(5);
        lines[2].policy_state = Some(5);
        // lines[1] has state 1, the minimum -> evicted
        assert_eq!(policy.evict(&mut lines), 1);
    }

    #[test]
    fn srrip_on_fill_sets_long_rrpv_and_evict_prefers_rrpv_three() {
        let policy = ReplacementPolicy::Srrip;
        let mut lines = filled_lines(3);
        for i in 0..3 {
            policy.on_fill(&mut lines, i, 0);
        }
        assert_eq!(lines[0].policy_state, Some(2));

        lines[1].policy_state = Some(3);
        assert_eq!(policy.evict(&mut lines), 1);
    }

    #[test]
    fn srrip_ages_all_lines_when_none_at_max() {
        let policy = ReplacementPolicy::Srrip;
        let mut lines = filled_lines(2);
        lines[0].policy_state = Some(1);
        lines[1].policy_state = Some(2);
        // No line at RRPV 3: one aging pass brings line 1 to 3.
        assert_eq!(policy.evict(&mut lines), 1);
    }
}
