use automata_toolkit::{problem, MinimizeConfig};
use clap::Parser;
use tracing::{debug, info, Level};

mod cli;
mod io;

use cli::{Commands, Toolkit};

fn verdict(accepted: bool) -> &'static str {
    if accepted {
        "Accepted"
    } else {
        "Rejected"
    }
}

fn main() -> anyhow::Result<()> {
    let args = Toolkit::parse();

    let level = if args.global.verbose {
        Level::TRACE
    } else if args.global.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input = io::from_file_or_stdin(args.global.input.as_ref())?;
    let output = match args.command {
        Commands::Accept => {
            let problem = problem::read_acceptance(&input)?;
            debug!("Deciding acceptance of {:?}", problem.input);
            verdict(problem.solve()).to_string()
        }
        Commands::Determinize => {
            let problem = problem::read_determinize(&input)?;
            problem.solve().to_string()
        }
        Commands::Regex => {
            let problem = problem::read_regex(&input)?;
            debug!("Matching {:?} against {}", problem.input, problem.regex.pattern());
            verdict(problem.solve()).to_string()
        }
        Commands::Minimize { rounds } => {
            let config = MinimizeConfig { max_rounds: rounds };
            let problem = problem::read_minimize(&input)?;
            let classes = problem.solve(&config)?;
            info!(
                "Reduced {} states to {} classes",
                problem.dfa.size(),
                classes
            );
            classes.to_string()
        }
    };

    io::to_file_or_stdout(args.global.output.as_ref(), &output)
}
