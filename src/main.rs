//! pln-chainer CLI: forward-chaining inference over a fact file.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::Result;

use pln_chainer::agent::{AgentConfig, ForwardInferenceAgent, RuleProfile, StepReport};
use pln_chainer::composition::CompositionTable;
use pln_chainer::facts::load_facts;
use pln_chainer::graph::MemoryAtomSpace;

#[derive(Parser)]
#[command(name = "pln-chainer", version, about = "Forward-chaining probabilistic inference")]
struct Cli {
    /// Agent configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Composition table file. Defaults to the bundled Allen table.
    #[arg(long, global = true)]
    table: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load facts and run the inference agent.
    Run {
        /// Path to a JSON facts file.
        #[arg(long)]
        facts: PathBuf,

        /// Number of agent cycles.
        #[arg(long, default_value = "10")]
        steps: usize,

        /// Rule profile, overriding the config file.
        #[arg(long)]
        profile: Option<Profile>,

        /// RNG seed, overriding the config file.
        #[arg(long)]
        seed: Option<u64>,

        /// Keep stepping after a cycle with no inference.
        #[arg(long)]
        keep_going: bool,
    },

    /// Print the composition table.
    Table,

    /// List the rules a profile registers.
    Rules {
        #[arg(long)]
        profile: Option<Profile>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Profile {
    Pln,
    Temporal,
}

impl From<Profile> for RuleProfile {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Pln => RuleProfile::Pln,
            Profile::Temporal => RuleProfile::Temporal,
        }
    }
}

fn load_table(path: Option<&PathBuf>) -> Result<CompositionTable> {
    Ok(match path {
        Some(path) => CompositionTable::load(path)?,
        None => CompositionTable::allen()?,
    })
}

/// The composition table is read only for the temporal profile.
fn build_agent(config: AgentConfig, table: Option<&PathBuf>) -> Result<ForwardInferenceAgent> {
    Ok(match config.rule_profile {
        RuleProfile::Temporal => {
            let table = load_table(table)?;
            ForwardInferenceAgent::with_table(config, &table)?
        }
        RuleProfile::Pln => ForwardInferenceAgent::new(config)?,
    })
}

fn load_config(path: Option<&PathBuf>, profile: Option<Profile>) -> Result<AgentConfig> {
    let mut config = match path {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };
    if let Some(profile) = profile {
        config.rule_profile = profile.into();
    }
    Ok(config)
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            facts,
            steps,
            profile,
            seed,
            keep_going,
        } => {
            let mut config = load_config(cli.config.as_ref(), profile)?;
            if seed.is_some() {
                config.chainer.seed = seed;
            }
            let mut agent = build_agent(config, cli.table.as_ref())?;

            let space = MemoryAtomSpace::new();
            let asserted = load_facts(&facts)?.assert_into(&space)?;
            println!(
                "Loaded {} facts ({} atoms) from {}",
                asserted.len(),
                space.len(),
                facts.display()
            );

            for _ in 0..steps {
                let report = agent.run(&space)?;
                print!("{}", report.render(&space));
                if matches!(report, StepReport::NoInference { .. }) && !keep_going {
                    break;
                }
            }
            println!("{} atoms after {} cycles", space.len(), agent.steps());
        }

        Commands::Table => {
            let table = load_table(cli.table.as_ref())?;
            for cell in table.cells() {
                let outputs: String = cell.outputs.iter().map(|r| r.code()).collect();
                println!("{} . {} = ({outputs})", cell.row, cell.column);
            }
        }

        Commands::Rules { profile } => {
            let config = load_config(cli.config.as_ref(), profile)?;
            let agent = build_agent(config, cli.table.as_ref())?;
            for rule in agent.chainer().rules() {
                println!("{rule}");
            }
        }
    }

    Ok(())
}
