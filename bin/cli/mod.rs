use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Toolkit {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct GlobalArgs {
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "debug",
        help = "Enable verbose logging"
    )]
    pub verbose: bool,
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Turn on debugging information"
    )]
    pub debug: bool,
    #[arg(
        short,
        long,
        global = true,
        help = "File to read the problem from, defaults to stdin"
    )]
    pub input: Option<String>,
    #[arg(
        short,
        long,
        global = true,
        help = "File to write the result to, defaults to stdout"
    )]
    pub output: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Decides whether an NFA accepts the given word")]
    Accept,
    #[command(about = "Counts the states of the DFA obtained by subset construction")]
    Determinize,
    #[command(about = "Decides whether a regular expression matches the given word")]
    Regex,
    #[command(about = "Counts the equivalence classes of the states of a DFA")]
    Minimize {
        #[arg(
            short,
            long,
            help = "Maximal number of refinement rounds, refines until stable if omitted"
        )]
        rounds: Option<usize>,
    },
}
