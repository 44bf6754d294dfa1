use crate::annealer::CoolingSchedule;
use crate::blockmodel::BlockState;
use crate::config::Config;
use std::io::Write;
use std::time::SystemTime;

/// The program's one stdout artifact: the final memberships as a single
/// whitespace-separated line.
pub fn write_memberships<W: Write>(memberships: &[u32], w: &mut W) -> Result<(), String> {
    let mut line = String::with_capacity(2 * memberships.len());
    for &mb in memberships {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&mb.to_string());
    }
    writeln!(w, "{}", line).map_err(|e| e.to_string())
}

pub fn log_affinity_matrix(state: &BlockState) {
    let k = state.num_groups() as usize;
    for r in 0..k {
        let mut line = String::new();
        for s in 0..k {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&state.m(r, s).to_string());
        }
        eprintln!("{}", line);
    }
}

fn join_u32(values: &[u32]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn schedule_kwargs_string(schedule: &CoolingSchedule) -> String {
    match *schedule {
        CoolingSchedule::Exponential { t0, alpha } => format!("{} {}", t0, alpha),
        CoolingSchedule::Linear { t0, eta } => format!("{} {}", t0, eta),
        CoolingSchedule::Logarithmic { c, d } => format!("{} {}", c, d),
        CoolingSchedule::Constant { t } => format!("{}", t),
        CoolingSchedule::AbruptCool { tau } => format!("{}", tau),
    }
}

pub fn log_run_parameters(cfg: &Config, state: &BlockState, start_time: SystemTime) {
    let started: chrono::DateTime<chrono::Local> = start_time.into();
    eprintln!("bisbm {}", cfg.raw_args);
    eprintln!("started at {}", started.format("%Y-%m-%d %H:%M:%S"));
    eprintln!("edge_list_path: {}", cfg.edge_list_path.display());
    eprintln!("initial affinity matrix:");
    log_affinity_matrix(state);
    eprintln!(
        "sizes (g={}): {}",
        state.num_groups(),
        join_u32(state.group_sizes())
    );
    eprintln!("burn_in: {}", cfg.burn_in);
    eprintln!("sampling_steps: {}", cfg.sampling_steps);
    eprintln!("sampling_frequency: {}", cfg.sampling_frequency);
    eprintln!("steps_await: {}", cfg.steps_await);
    eprintln!("epsilon: {}", cfg.epsilon);
    eprintln!("randomize: {}", cfg.randomize);
    eprintln!("type_sizes (y=2): {}", join_u32(&cfg.type_sizes));
    eprintln!(
        "groups (z=2): {} {}",
        state.num_a_groups(),
        state.num_b_groups()
    );
    eprintln!("cooling_schedule: {}", cfg.schedule.name());
    eprintln!(
        "cooling_schedule_kwargs: {}",
        schedule_kwargs_string(&cfg.schedule)
    );
    eprintln!("seed: {}", cfg.seed);
}
