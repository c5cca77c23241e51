// bypass.rs
//
// Optional fill suppressor, consulted before any fill (demand or
// prefetch). Ported from
// original_source/cache_simulator/policy/bypass.py. ProbBypass uses a
// seeded PRNG (seed 0, matching the Python `random.seed(0)`) so repeated
// runs on the same trace are reproducible — determinism is required by
// spec invariant 8, not negotiable the way it would be for a production
// cache.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DETERMINISTIC_SEED: u64 = 0;

#[derive(Debug)]
pub enum BypassPolicy {
    NoBypass,
    Prob { prob_demand: f64, prob_prefetch: f64, rng: StdRng },
}

impl BypassPolicy {
    pub fn no_bypass() -> Self {
        BypassPolicy::NoBypass
    }

    pub fn prob(prob_demand: f64, prob_prefetch: f64) -> Self {
        BypassPolicy::Prob {
            prob_demand,
            prob_prefetch,
            rng: StdRng::seed_from_u64(DETERMINISTIC_SEED),
        }
    }

    pub fn from_config(policy_name: &str, prob_demand: f64, prob_prefetch: f64) -> Result<Self, String> {
        match policy_name {
            "NoBypass" => Ok(BypassPolicy::no_bypass()),
            "Prob" => Ok(BypassPolicy::prob(prob_demand, prob_prefetch)),
            other => Err(format!("unknown bypass policy_name '{other}'")),
        }
    }

    /// Whether to skip a fill into a set that is `is_full`, for a fill
    /// that is (or isn't) a prefetch.
    pub fn should_bypass(&mut self, is_full: bool, is_prefetch: bool) -> bool {
        if !is_full {
            return false;
        }
        match self {
            BypassPolicy::NoBypass => false,
            BypassPolicy::Prob { prob_demand, prob_prefetch, rng } => {
                let threshold = if is_prefetch { *prob_prefetch } else { *prob_demand };
                rng.gen::<f64>() < threshold
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_bypass_never_suppresses() {
        let mut policy = BypassPolicy::no_bypass();
        assert!(!policy.should_bypass(true, false));
        assert!(!policy.should_bypass(true, true));
    }

    #[test]
    fn prob_bypass_never_triggers_on_non_full_set() {
        let mut policy = BypassPolicy::prob(1.0, 1.0);
        assert!(!policy.should_bypass(false, false));
    }

    #[test]
    fn prob_bypass_is_deterministic_across_runs() {
        let mut a = BypassPolicy::prob(0.5, 0.5);
        let mut b = BypassPolicy::prob(0.5, 0.5);
        let seq_a: Vec<bool> = (0..20).map(|_| a.should_bypass(true, false)).collect();
        let seq_b: Vec<bool> = (0..20).map(|_| b.should_bypass(true, false)).collect();
        assert_eq!(seq_a, seq_b);
    }
}
