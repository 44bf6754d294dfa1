use crate::annealer::CoolingSchedule;
use crate::config::Config;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub enum Command {
    Help,
    Run(Config),
}

pub fn usage() -> String {
    "\
MCMC fitting for the bipartite degree-corrected stochastic block model

Usage:
  bisbm -e EDGE_LIST -y NA NB [-n SIZE... -z KA KB] -E EPSILON -m [options]

Options:
  -e, --edge_list_path PATH     Path to the edge list file.
      --membership_path PATH    Path to an initial membership file.
  -n, --n SIZE...               Initial block sizes, one per group.
  -y, --types NA NB             Number of vertices of each type.
  -z, --bisbm_partition KA KB   Number of groups on each side.
  -b, --burn_in INT             Burn-in time (unused when maximizing). [1000]
  -t, --sampling_steps INT      Length of the annealing process in sweeps. [1000]
  -f, --sampling_frequency INT  Steps between samples (unused when maximizing). [10]
  -x, --steps_await INT         Stop once this many successive sweeps left both
                                the entropy minimum and maximum unchanged. [1000]
  -E, --epsilon FLOAT           Mixing parameter of the neighbour-biased
                                proposal; required, must be positive.
  -c, --cooling_schedule NAME   One of exponential, linear, logarithmic,
                                constant, abrupt_cool. [abrupt_cool]
  -a, --cooling_schedule_kwargs FLOAT...
                                Schedule parameters. Exponential: T_0, alpha.
                                Linear: T_0, eta. Logarithmic: c, d.
                                Constant: T. Abrupt_cool: tau.
  -m, --maximize                Maximize the likelihood (the only mode).
      --uni                     Variable-K estimation (not implemented).
  -r, --randomize               Shuffle the initial state within each type.
  -d, --seed INT                RNG seed; clock-derived when absent.
  -h, --help                    Print this message.
"
    .to_string()
}

fn take_value<'a>(args: &'a [String], i: usize, name: &str) -> Result<(&'a str, usize), String> {
    match args.get(i + 1) {
        Some(v) if !v.starts_with('-') => Ok((v.as_str(), i + 2)),
        _ => Err(format!("Missing value for {}", name)),
    }
}

fn take_u32(args: &[String], i: usize, name: &str) -> Result<(u32, usize), String> {
    let (raw, next) = take_value(args, i, name)?;
    let v = raw
        .parse::<u32>()
        .map_err(|_| format!("Can't parse integer value '{}' for {}", raw, name))?;
    Ok((v, next))
}

fn take_f64(args: &[String], i: usize, name: &str) -> Result<(f64, usize), String> {
    let (raw, next) = take_value(args, i, name)?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Can't parse float value '{}' for {}", raw, name))?;
    Ok((v, next))
}

fn take_u32_list(args: &[String], i: usize, name: &str) -> Result<(Vec<u32>, usize), String> {
    let mut values = Vec::new();
    let mut j = i + 1;
    while let Some(tok) = args.get(j) {
        if tok.starts_with('-') {
            break;
        }
        let v = tok
            .parse::<u32>()
            .map_err(|_| format!("Can't parse integer value '{}' for {}", tok, name))?;
        values.push(v);
        j += 1;
    }
    if values.is_empty() {
        return Err(format!("Missing values for {}", name));
    }
    Ok((values, j))
}

fn take_f64_list(args: &[String], i: usize, name: &str) -> Result<(Vec<f64>, usize), String> {
    let mut values = Vec::new();
    let mut j = i + 1;
    while let Some(tok) = args.get(j) {
        if tok.starts_with('-') {
            break;
        }
        let v = tok
            .parse::<f64>()
            .map_err(|_| format!("Can't parse float value '{}' for {}", tok, name))?;
        values.push(v);
        j += 1;
    }
    if values.is_empty() {
        return Err(format!("Missing values for {}", name));
    }
    Ok((values, j))
}

fn build_schedule(
    name: &str,
    kwargs: &[f64],
    sampling_steps: u32,
    steps_await: u32,
) -> Result<CoolingSchedule, String> {
    match name {
        "exponential" => {
            if kwargs.is_empty() {
                return Ok(CoolingSchedule::Exponential {
                    t0: 1.0,
                    alpha: 0.99,
                });
            }
            if kwargs.len() < 2 {
                return Err("The exponential schedule expects two arguments: T_0, alpha".to_string());
            }
            let (t0, alpha) = (kwargs[0], kwargs[1]);
            if t0 <= 0.0 {
                return Err(format!(
                    "Invalid argument for the exponential schedule: T_0 must be greater than 0; passed T_0={}",
                    t0
                ));
            }
            if alpha <= 0.0 || alpha >= 1.0 {
                return Err(format!(
                    "Invalid argument for the exponential schedule: alpha must lie strictly between 0 and 1; passed alpha={}",
                    alpha
                ));
            }
            Ok(CoolingSchedule::Exponential { t0, alpha })
        }
        "linear" => {
            if kwargs.is_empty() {
                return Ok(CoolingSchedule::Linear {
                    t0: sampling_steps as f64 + 1.0,
                    eta: 1.0,
                });
            }
            if kwargs.len() < 2 {
                return Err("The linear schedule expects two arguments: T_0, eta".to_string());
            }
            let (t0, eta) = (kwargs[0], kwargs[1]);
            if t0 <= 0.0 {
                return Err(format!(
                    "Invalid argument for the linear schedule: T_0 must be greater than 0; passed T_0={}",
                    t0
                ));
            }
            if eta <= 0.0 || eta > t0 {
                return Err(format!(
                    "Invalid argument for the linear schedule: eta must lie in ]0, T_0]; passed T_0={}, eta={}",
                    t0, eta
                ));
            }
            if eta * sampling_steps as f64 > t0 {
                return Err(format!(
                    "Invalid argument for the linear schedule: eta * sampling_steps must not exceed T_0; passed eta*sampling_steps={}, T_0={}",
                    eta * sampling_steps as f64,
                    t0
                ));
            }
            Ok(CoolingSchedule::Linear { t0, eta })
        }
        "logarithmic" => {
            if kwargs.is_empty() {
                return Ok(CoolingSchedule::Logarithmic { c: 1.0, d: 2.0 });
            }
            if kwargs.len() < 2 {
                return Err("The logarithmic schedule expects two arguments: c, d".to_string());
            }
            let (c, d) = (kwargs[0], kwargs[1]);
            if c <= 0.0 {
                return Err(format!(
                    "Invalid argument for the logarithmic schedule: c must be greater than 0; passed c={}",
                    c
                ));
            }
            if d <= 1.0 {
                return Err(format!(
                    "Invalid argument for the logarithmic schedule: d must be greater than 1; passed d={}",
                    d
                ));
            }
            Ok(CoolingSchedule::Logarithmic { c, d })
        }
        "constant" => {
            if kwargs.is_empty() {
                return Ok(CoolingSchedule::Constant { t: 1.0 });
            }
            let t = kwargs[0];
            if t <= 0.0 {
                return Err(format!(
                    "Invalid argument for the constant schedule: the temperature must be greater than 0; passed T={}",
                    t
                ));
            }
            Ok(CoolingSchedule::Constant { t })
        }
        "abrupt_cool" => {
            if kwargs.is_empty() {
                return Ok(CoolingSchedule::AbruptCool {
                    tau: steps_await as f64,
                });
            }
            let tau = kwargs[0];
            if tau <= 0.0 {
                return Err(format!(
                    "Invalid argument for the abrupt_cool schedule: tau must be greater than 0; passed tau={}",
                    tau
                ));
            }
            Ok(CoolingSchedule::AbruptCool { tau })
        }
        _ => Err(
            "Invalid cooling schedule. Options are exponential, linear, logarithmic, constant, abrupt_cool."
                .to_string(),
        ),
    }
}

fn clock_seed() -> u32 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.subsec_nanos() ^ elapsed.as_secs() as u32,
        Err(_) => 0,
    }
}

pub fn parse_args(args: &[String]) -> Result<Command, String> {
    // A bare invocation asks for the usage text, same as -h.
    if args.is_empty() {
        return Ok(Command::Help);
    }

    let raw_args = args.join(" ");

    let mut edge_list_path: Option<PathBuf> = None;
    let mut membership_path: Option<PathBuf> = None;
    let mut block_sizes: Vec<u32> = Vec::new();
    let mut type_sizes: Vec<u32> = Vec::new();
    let mut group_counts: Vec<u32> = Vec::new();
    let mut burn_in = 1000u32;
    let mut sampling_steps = 1000u32;
    let mut sampling_frequency = 10u32;
    let mut steps_await = 1000u32;
    let mut epsilon: Option<f64> = None;
    let mut schedule_name = "abrupt_cool".to_string();
    let mut schedule_kwargs: Vec<f64> = Vec::new();
    let mut maximize = false;
    let mut uni = false;
    let mut randomize = false;
    let mut seed: Option<u32> = None;

    let mut i = 0usize;
    while i < args.len() {
        let tok = &args[i];

        if let Some(rest) = tok.strip_prefix("--edge_list_path=") {
            edge_list_path = Some(PathBuf::from(rest));
            i += 1;
            continue;
        }
        if let Some(rest) = tok.strip_prefix("--membership_path=") {
            membership_path = Some(PathBuf::from(rest));
            i += 1;
            continue;
        }
        if let Some(rest) = tok.strip_prefix("--epsilon=") {
            let v = rest
                .parse::<f64>()
                .map_err(|_| format!("Can't parse float value '{}' for --epsilon", rest))?;
            epsilon = Some(v);
            i += 1;
            continue;
        }
        if let Some(rest) = tok.strip_prefix("--cooling_schedule=") {
            schedule_name = rest.to_string();
            i += 1;
            continue;
        }
        if let Some(rest) = tok.strip_prefix("--seed=") {
            let v = rest
                .parse::<u32>()
                .map_err(|_| format!("Can't parse integer value '{}' for --seed", rest))?;
            seed = Some(v);
            i += 1;
            continue;
        }

        match tok.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-m" | "--maximize" => {
                maximize = true;
                i += 1;
            }
            "--uni" => {
                uni = true;
                i += 1;
            }
            "-r" | "--randomize" => {
                randomize = true;
                i += 1;
            }
            "-e" | "--edge_list_path" => {
                let (v, next) = take_value(args, i, "--edge_list_path")?;
                edge_list_path = Some(PathBuf::from(v));
                i = next;
            }
            "--membership_path" => {
                let (v, next) = take_value(args, i, "--membership_path")?;
                membership_path = Some(PathBuf::from(v));
                i = next;
            }
            "-n" | "--n" => {
                let (v, next) = take_u32_list(args, i, "--n")?;
                block_sizes = v;
                i = next;
            }
            "-y" | "--types" => {
                let (v, next) = take_u32_list(args, i, "--types")?;
                type_sizes = v;
                i = next;
            }
            "-z" | "--bisbm_partition" => {
                let (v, next) = take_u32_list(args, i, "--bisbm_partition")?;
                group_counts = v;
                i = next;
            }
            "-b" | "--burn_in" => {
                let (v, next) = take_u32(args, i, "--burn_in")?;
                burn_in = v;
                i = next;
            }
            "-t" | "--sampling_steps" => {
                let (v, next) = take_u32(args, i, "--sampling_steps")?;
                sampling_steps = v;
                i = next;
            }
            "-f" | "--sampling_frequency" => {
                let (v, next) = take_u32(args, i, "--sampling_frequency")?;
                sampling_frequency = v;
                i = next;
            }
            "-x" | "--steps_await" => {
                let (v, next) = take_u32(args, i, "--steps_await")?;
                steps_await = v;
                i = next;
            }
            "-E" | "--epsilon" => {
                let (v, next) = take_f64(args, i, "--epsilon")?;
                epsilon = Some(v);
                i = next;
            }
            "-c" | "--cooling_schedule" => {
                let (v, next) = take_value(args, i, "--cooling_schedule")?;
                schedule_name = v.to_string();
                i = next;
            }
            "-a" | "--cooling_schedule_kwargs" => {
                let (v, next) = take_f64_list(args, i, "--cooling_schedule_kwargs")?;
                schedule_kwargs = v;
                i = next;
            }
            "-d" | "--seed" => {
                let (v, next) = take_u32(args, i, "--seed")?;
                seed = Some(v);
                i = next;
            }
            _ => return Err(format!("Unknown option '{}'", tok)),
        }
    }

    let edge_list_path =
        edge_list_path.ok_or_else(|| "edge_list_path is required (-e flag)".to_string())?;

    if type_sizes.len() != 2 {
        return Err("Number of types must be equal to 2 (-y flag)".to_string());
    }
    if !group_counts.is_empty() && group_counts.len() != 2 {
        return Err("bisbm_partition expects two values (-z flag): KA KB".to_string());
    }

    let epsilon = epsilon.ok_or_else(|| "epsilon is required (-E flag)".to_string())?;
    if epsilon <= 0.0 {
        return Err(format!(
            "epsilon must be greater than 0; passed epsilon={}",
            epsilon
        ));
    }

    let schedule = build_schedule(&schedule_name, &schedule_kwargs, sampling_steps, steps_await)?;
    let seed = seed.unwrap_or_else(clock_seed);

    Ok(Command::Run(Config {
        raw_args,
        edge_list_path,
        membership_path,
        block_sizes,
        type_sizes,
        group_counts,
        burn_in,
        sampling_steps,
        sampling_frequency,
        steps_await,
        epsilon,
        schedule,
        maximize,
        uni,
        randomize,
        seed,
    }))
}
