use crate::blockmodel::BlockState;
use crate::proposal::{MoveProposal, MoveWeight};
use crate::rng::MoveRng;

// Keeps the linear schedule strictly positive through its final sweep.
const MIN_LINEAR_TEMPERATURE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoolingSchedule {
    Exponential { t0: f64, alpha: f64 },
    Linear { t0: f64, eta: f64 },
    Logarithmic { c: f64, d: f64 },
    Constant { t: f64 },
    AbruptCool { tau: f64 },
}

impl CoolingSchedule {
    /// Temperature for the 0-indexed sweep t.
    pub fn temperature(&self, t: u32) -> f64 {
        match *self {
            CoolingSchedule::Exponential { t0, alpha } => t0 * alpha.powi(t as i32),
            CoolingSchedule::Linear { t0, eta } => {
                (t0 - eta * t as f64).max(MIN_LINEAR_TEMPERATURE)
            }
            CoolingSchedule::Logarithmic { c, d } => c / (t as f64 + d).ln(),
            CoolingSchedule::Constant { t: temperature } => temperature,
            // Two phases: free exploration until tau, then pure descent.
            CoolingSchedule::AbruptCool { tau } => {
                if (t as f64) < tau {
                    f64::INFINITY
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CoolingSchedule::Exponential { .. } => "exponential",
            CoolingSchedule::Linear { .. } => "linear",
            CoolingSchedule::Logarithmic { .. } => "logarithmic",
            CoolingSchedule::Constant { .. } => "constant",
            CoolingSchedule::AbruptCool { .. } => "abrupt_cool",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnnealReport {
    pub acceptance_rate: f64,
    pub sweeps: u32,
    pub entropy: f64,
}

/// Simulated-annealing driver. One sweep is vertex_count move attempts; the
/// run stops after `duration` sweeps, or earlier once neither the running
/// entropy minimum nor maximum has changed for `steps_await` sweeps.
#[derive(Debug, Clone, Copy)]
pub struct Annealer {
    pub schedule: CoolingSchedule,
    pub duration: u32,
    pub steps_await: u32,
}

// log alpha = -dS / T + log(q_rev / q_fwd), with the temperature limits
// resolved explicitly: T = inf accepts on the proposal ratio alone, T = 0
// accepts strict improvements only (ties fall back to the ratio). A
// non-finite ratio means the proposal weights degenerated; reject.
fn log_accept_probability(weight: &MoveWeight, temperature: f64) -> f64 {
    if !weight.log_proposal_ratio.is_finite() {
        return f64::NEG_INFINITY;
    }
    if temperature.is_infinite() {
        return weight.log_proposal_ratio;
    }
    if temperature <= 0.0 {
        return if weight.d_entropy < 0.0 {
            f64::INFINITY
        } else if weight.d_entropy > 0.0 {
            f64::NEG_INFINITY
        } else {
            weight.log_proposal_ratio
        };
    }
    -weight.d_entropy / temperature + weight.log_proposal_ratio
}

impl Annealer {
    pub fn run<P: MoveProposal, R: MoveRng>(
        &self,
        state: &mut BlockState,
        rule: &P,
        rng: &mut R,
    ) -> AnnealReport {
        let steps_per_sweep = state.graph().vertex_count();

        let mut entropy = state.entropy();
        let mut entropy_min = entropy;
        let mut entropy_max = entropy;
        let mut unchanged_sweeps = 0u32;

        let mut accepted: u64 = 0;
        let mut attempted: u64 = 0;
        let mut sweeps = 0u32;

        for sweep in 0..self.duration {
            let temperature = self.schedule.temperature(sweep);

            for _ in 0..steps_per_sweep {
                attempted += 1;
                let mv = rule.sample(state, rng);
                let weight = rule.log_acceptance(state, &mv);
                let log_alpha = log_accept_probability(&weight, temperature);
                // The acceptance uniform is always drawn, keeping the per-step
                // draw sequence fixed for seeded reproducibility.
                let u = rng.next_f64();
                if u.ln() < log_alpha && state.apply_move(mv.vertex, mv.target) {
                    accepted += 1;
                    entropy += weight.d_entropy;
                }
            }
            sweeps = sweep + 1;

            let improved_min = entropy < entropy_min;
            let improved_max = entropy > entropy_max;
            if improved_min {
                entropy_min = entropy;
            }
            if improved_max {
                entropy_max = entropy;
            }
            if improved_min || improved_max {
                unchanged_sweeps = 0;
            } else {
                unchanged_sweeps += 1;
            }
            if unchanged_sweeps >= self.steps_await {
                break;
            }
        }

        AnnealReport {
            acceptance_rate: accepted as f64 / attempted.max(1) as f64,
            sweeps,
            entropy,
        }
    }
}
