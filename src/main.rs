use bisbm::annealer::Annealer;
use bisbm::blockmodel::BlockState;
use bisbm::cache::LogCache;
use bisbm::cli::{self, Command};
use bisbm::config::Config;
use bisbm::graph::Graph;
use bisbm::proposal::NeighbourBiased;
use bisbm::rng::Mt19937;
use std::env;
use std::path::Path;
use std::process::ExitCode;
use std::time::{Instant, SystemTime};

struct InitialPartition {
    memberships: Vec<u32>,
    num_a_groups: u32,
    num_b_groups: u32,
    randomize: bool,
}

fn partition_from_file(cfg: &Config, path: &Path) -> Result<InitialPartition, String> {
    let memberships = bisbm::parser::parse_memberships(path)?;
    if memberships.len() != cfg.num_vertices() {
        return Err(format!(
            "Membership file has {} entries for {} vertices",
            memberships.len(),
            cfg.num_vertices()
        ));
    }

    // The group counts are implied by the file: side A owns the ids seen on
    // type-A vertices, side B the rest above them.
    let num_type_a = cfg.type_sizes[0] as usize;
    let max_a = memberships[..num_type_a].iter().max().copied().unwrap_or(0);
    let max_all = memberships.iter().max().copied().unwrap_or(0);
    let num_a_groups = max_a + 1;
    if max_all < num_a_groups {
        return Err("Membership file assigns no group to type-B vertices".to_string());
    }

    Ok(InitialPartition {
        memberships,
        num_a_groups,
        num_b_groups: max_all + 1 - num_a_groups,
        randomize: false,
    })
}

fn partition_from_block_sizes(cfg: &Config) -> Result<InitialPartition, String> {
    if cfg.block_sizes.is_empty() {
        return Err("block sizes are required (-n flag)".to_string());
    }
    if cfg.group_counts.len() != 2 {
        return Err("number of groups per side is required (-z flag)".to_string());
    }

    let (num_a_groups, num_b_groups) = (cfg.group_counts[0], cfg.group_counts[1]);
    if cfg.block_sizes.len() != (num_a_groups + num_b_groups) as usize {
        return Err(format!(
            "{} block sizes given for {} groups",
            cfg.block_sizes.len(),
            num_a_groups + num_b_groups
        ));
    }

    let total: usize = cfg.block_sizes.iter().map(|&x| x as usize).sum();
    if total != cfg.num_vertices() {
        return Err(format!(
            "Block sizes sum to {} but the type sizes declare {} vertices",
            total,
            cfg.num_vertices()
        ));
    }
    let a_total: usize = cfg.block_sizes[..num_a_groups as usize]
        .iter()
        .map(|&x| x as usize)
        .sum();
    if a_total != cfg.type_sizes[0] as usize {
        return Err(format!(
            "The first {} block sizes sum to {} but there are {} type-A vertices",
            num_a_groups, a_total, cfg.type_sizes[0]
        ));
    }

    let mut memberships = Vec::with_capacity(total);
    for (r, &size) in cfg.block_sizes.iter().enumerate() {
        for _ in 0..size {
            memberships.push(r as u32);
        }
    }

    Ok(InitialPartition {
        memberships,
        num_a_groups,
        num_b_groups,
        randomize: cfg.randomize,
    })
}

fn initial_partition(cfg: &Config) -> Result<InitialPartition, String> {
    if let Some(path) = &cfg.membership_path {
        match partition_from_file(cfg, path.as_path()) {
            Ok(partition) => return Ok(partition),
            Err(e) => eprintln!("WARNING: {}; falling back to block sizes", e),
        }
    }
    partition_from_block_sizes(cfg)
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let cfg = match bisbm::cli::parse_args(&args)? {
        Command::Help => {
            print!("{}", cli::usage());
            return Ok(());
        }
        Command::Run(cfg) => cfg,
    };

    if cfg.uni {
        return Err("variable-K estimation (--uni) is not implemented".to_string());
    }
    if !cfg.maximize {
        return Err("marginalize mode is not implemented; pass -m to maximize".to_string());
    }

    let start_system = SystemTime::now();
    let start = Instant::now();

    let edges = bisbm::parser::parse_edge_list(&cfg.edge_list_path)?;
    let graph = Graph::from_edge_list(
        &edges,
        cfg.type_sizes[0] as usize,
        cfg.type_sizes[1] as usize,
    )?;

    let init = initial_partition(&cfg)?;
    let cache = LogCache::new(2 * graph.edge_count());
    let mut state = BlockState::new(
        &graph,
        cache,
        init.memberships,
        init.num_a_groups,
        init.num_b_groups,
        cfg.epsilon,
    )?;

    let mut rng = Mt19937::new(cfg.seed);
    if init.randomize {
        state.shuffle_within_types(&mut rng);
    }

    eprintln!("likelihood maximization with neighbour-biased MCMC moves");
    bisbm::output::log_run_parameters(&cfg, &state, start_system);

    let annealer = Annealer {
        schedule: cfg.schedule,
        duration: cfg.sampling_steps,
        steps_await: cfg.steps_await,
    };
    let report = annealer.run(&mut state, &NeighbourBiased, &mut rng);

    let stdout = std::io::stdout();
    bisbm::output::write_memberships(state.memberships(), &mut stdout.lock())?;

    eprintln!("acceptance ratio {}", report.acceptance_rate);
    eprintln!("sweeps {}", report.sweeps);
    eprintln!("final entropy {}", report.entropy);
    eprintln!("completed in {} s", start.elapsed().as_secs_f64());

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
