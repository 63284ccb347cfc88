use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::error;
use log::info;
use log::LevelFilter;

use caravan_solver::io::write_gexf;
use caravan_solver::io::write_solution_xml;
use caravan_solver::io::MissionReader;
use caravan_solver::mission::CapabilityRegistry;
use caravan_solver::mission::ModelCapability;
use caravan_solver::solvers::PlanningOutcome;
use caravan_solver::solvers::TransportNetworkPlanner;
use caravan_solver::PlanningResult;

#[derive(Debug, Parser)]
#[command(author, version, about = "Transport-network mission planner", long_about = None)]
struct Args {
    /// The mission to solve, in the mission XML format.
    mission: PathBuf,

    /// Directory the solution files are written to.
    #[arg(long = "solution-dir", default_value = ".")]
    solution_dir: PathBuf,

    /// Wall-clock budget for the solver, in seconds.
    #[arg(short = 't', long = "time-limit")]
    time_limit: Option<u64>,

    /// A capability file describing the agent models; built-in defaults
    /// are used when omitted.
    #[arg(long = "capabilities")]
    capabilities: Option<PathBuf>,

    /// Enables log message output from the solver.
    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .format(|buf, record| writeln!(buf, "{} {}", record.level(), record.args()))
        .filter_level(level_filter)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    configure_logging(args.verbose);

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            error!("mission has no solution");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("execution failed: {e}");
            ExitCode::from(1)
        }
    }
}

/// Capability defaults for missions that reference plain model names:
/// one generic mobile carrier class and one immobile payload class.
fn default_registry() -> CapabilityRegistry {
    CapabilityRegistry::new()
        .with(
            ModelCapability::new("Vehicle")
                .mobile(2)
                .provides("TransportProvider", 1, 2),
        )
        .with(ModelCapability::new("Payload").provides("PowerSource", 1, 1))
        .with(ModelCapability::new("Commodity"))
}

/// Capability file: one line per model,
/// `<iri> mobile <payload> [provides <functionality> <units> <saturation>]...`
/// or `<iri> immobile [provides ...]...`.
fn registry_from_file(path: &PathBuf) -> PlanningResult<CapabilityRegistry> {
    let content = std::fs::read_to_string(path)?;
    let mut registry = CapabilityRegistry::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let iri = tokens.next().expect("nonempty line has a first token");
        let mut capability = ModelCapability::new(iri);

        let invalid = |what: &str| {
            caravan_solver::PlanningError::InvalidInput(format!(
                "capability file {}: {what} in '{line}'",
                path.display()
            ))
        };

        match tokens.next() {
            Some("mobile") => {
                let payload = tokens
                    .next()
                    .ok_or_else(|| invalid("missing payload capacity"))?
                    .parse::<u32>()
                    .map_err(|_| invalid("unparsable payload capacity"))?;
                capability = capability.mobile(payload);
            }
            Some("immobile") | None => {}
            Some(other) => return Err(invalid(&format!("unknown mobility '{other}'"))),
        }
        while let Some(keyword) = tokens.next() {
            if keyword != "provides" {
                return Err(invalid(&format!("unknown keyword '{keyword}'")));
            }
            let functionality = tokens
                .next()
                .ok_or_else(|| invalid("missing functionality"))?;
            let units = tokens
                .next()
                .ok_or_else(|| invalid("missing unit count"))?
                .parse::<u32>()
                .map_err(|_| invalid("unparsable unit count"))?;
            let saturation = tokens
                .next()
                .ok_or_else(|| invalid("missing saturation count"))?
                .parse::<u32>()
                .map_err(|_| invalid("unparsable saturation count"))?;
            capability = capability.provides(functionality, units, saturation);
        }
        registry.register(capability);
    }
    Ok(registry)
}

fn run(args: &Args) -> PlanningResult<bool> {
    let registry = match &args.capabilities {
        Some(path) => registry_from_file(path)?,
        None => default_registry(),
    };

    let mut mission = MissionReader::from_file(&args.mission)?;
    mission.prepare(&registry)?;
    info!("solving mission '{}'", mission.name());

    let mut planner = TransportNetworkPlanner::new(&registry);
    if let Some(seconds) = args.time_limit {
        planner = planner.with_time_limit(Duration::from_secs(seconds));
    }

    match planner.solve(&mission)? {
        PlanningOutcome::Solved(solution) => {
            println!("{solution}");

            std::fs::create_dir_all(&args.solution_dir)?;
            let gexf_path = args.solution_dir.join("solution.gexf");
            std::fs::write(&gexf_path, write_gexf(&solution))?;
            let xml_path = args.solution_dir.join("solution.xml");
            std::fs::write(&xml_path, write_solution_xml(&solution))?;
            info!(
                "solution written to '{}' and '{}'",
                gexf_path.display(),
                xml_path.display()
            );
            Ok(true)
        }
        PlanningOutcome::NoSolution => Ok(false),
    }
}
