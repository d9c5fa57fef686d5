use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use flagchain::{Env, EnvMap, FlagValue, LookupMode, read_config_file};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "flagchain")]
#[command(version, about = "Inspect flagchain config and environment files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the arguments a config file expands to
    Expand(ExpandArgs),

    /// Resolve variables through layered env files
    Env(EnvArgs),
}

#[derive(Parser)]
struct ExpandArgs {
    /// The config file
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// Print a JSON array instead of one argument per line
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct EnvArgs {
    /// Env file to layer on top; later files win
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Read --file arguments as dotenv files (quotes, `export`, `$VAR`)
    #[arg(long)]
    dotenv: bool,

    /// Start from the process environment
    #[arg(long)]
    system: bool,

    /// Override a variable: KEY=VALUE
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,

    /// Print a JSON object of key to values
    #[arg(long)]
    json: bool,

    /// Keys to print (default: all)
    #[arg(value_name = "KEY")]
    keys: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Expand(args) => expand(args),
        Commands::Env(args) => env(args),
    }
}

fn expand(args: ExpandArgs) -> Result<()> {
    tracing::debug!(path = %args.path.display(), "executing expand command");
    let expanded = read_config_file(&args.path)
        .with_context(|| format!("failed to expand config file: {}", args.path.display()))?;

    let mut stdout = std::io::stdout().lock();
    if args.json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&expanded)?)?;
    } else {
        for arg in &expanded {
            writeln!(stdout, "{arg}")?;
        }
    }
    Ok(())
}

fn env(args: EnvArgs) -> Result<()> {
    tracing::debug!("executing env command");
    let mut env = args.system.then(|| Env::system(None));
    for file in &args.files {
        let layered = if args.dotenv {
            Env::dotenv_file(env.take(), file)
        } else {
            Env::file(env.take(), file)
        };
        let layered = layered.with_context(|| format!("failed to load env file: {}", file.display()))?;
        env = Some(layered);
    }

    if !args.overrides.is_empty() {
        let mut overrides = EnvMap::new();
        for pair in &args.overrides {
            if !pair.contains('=') {
                bail!("invalid override {pair:?}: expected KEY=VALUE");
            }
            // An empty key is rejected by the map itself.
            overrides
                .set(pair)
                .with_context(|| format!("invalid override {pair:?}"))?;
        }
        env = Some(Env::new(env.take(), overrides));
    }

    let Some(env) = env else {
        bail!("nothing to read: pass --file, --set or --system");
    };

    let resolved: Vec<(String, Vec<String>)> = if args.keys.is_empty() {
        env.map().into_iter().collect()
    } else {
        let mut resolved = Vec::with_capacity(args.keys.len());
        for key in &args.keys {
            let values = env
                .lookup_many(key, &LookupMode::Required)
                .with_context(|| format!("{key} is not set"))?;
            resolved.push((key.clone(), values.to_vec()));
        }
        resolved
    };

    let mut stdout = std::io::stdout().lock();
    if args.json {
        let object: serde_json::Map<String, serde_json::Value> = resolved
            .into_iter()
            .map(|(key, values)| (key, serde_json::Value::from(values)))
            .collect();
        writeln!(stdout, "{}", serde_json::to_string_pretty(&object)?)?;
    } else {
        for (key, values) in resolved {
            for value in values {
                writeln!(stdout, "{key}={value}")?;
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
