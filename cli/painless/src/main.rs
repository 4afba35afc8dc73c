//! painless CLI: private-repository package manager for Go modules.

mod commands;
mod config;

use std::process;

use clap::{Parser, Subcommand};
use painless_resolve::{AddOptions, DryRunRunner, ProcessRunner, RestoreChain, SystemRunner};
use tracing_subscriber::EnvFilter;

use commands::restore::RestoreOptions;
use commands::Session;

#[derive(Parser)]
#[command(
    name = "painless",
    version,
    about = "Package manager for Go projects with private dependencies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Print external commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,
    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create package.json and go.mod for a new project
    Init {
        /// Project (module) name
        #[arg(short, long)]
        name: String,
        /// Project version
        #[arg(long)]
        version: String,
    },
    /// Add a dependency
    Install {
        /// Repository URL or module path
        #[arg(short, long)]
        url: String,
        /// Dependency name, used as the module path in go.mod
        #[arg(short, long)]
        name: String,
        /// Clone into the shared cache instead of `go get`
        #[arg(short, long)]
        private: bool,
        /// Also restore the dependency's own package.json
        #[arg(short, long)]
        recursive: bool,
        /// Replace an existing dependency and fetch it again
        #[arg(long)]
        update: bool,
    },
    /// Remove a dependency
    Remove {
        /// Dependency name
        #[arg(short, long)]
        name: String,
    },
    /// Fetch every dependency in package.json
    Restore {
        /// Clone private dependencies again
        #[arg(long)]
        update: bool,
        /// Run `go mod tidy` afterwards
        #[arg(long)]
        tidy: bool,
        /// Do not restore private dependencies' own package.json
        #[arg(long)]
        no_recursive: bool,
        /// Projects already being restored (set by a parent restore)
        #[arg(long = "chain", hide = true)]
        chain: Vec<String>,
    },
    /// Create a project from a template repository
    Create {
        /// Template repository URL
        #[arg(short, long)]
        template: String,
        /// Project name and directory
        #[arg(short, long)]
        name: String,
    },
    /// Remove go.mod and go.sum
    Clean,
    /// Inspect the shared package cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Cross-compile the project
    Publish {
        /// Target operating system (GOOS)
        #[arg(long)]
        runtime: String,
        /// Target architecture (GOARCH)
        #[arg(long)]
        architecture: String,
        /// Output file
        #[arg(short, long)]
        output: String,
        /// Package to build
        #[arg(long)]
        target: String,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached working copies
    List,
    /// Remove entries this project does not reach through its private
    /// dependencies, including entries used only by other projects
    Prune,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// `-v`/`-q` win over `RUST_LOG`; without either the default is `info`.
fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let home = config::painless_home()?;
    let settings = config::Settings::load(&home)?;

    let runner: Box<dyn ProcessRunner> = if cli.dry_run {
        Box::new(DryRunRunner::new())
    } else {
        Box::new(SystemRunner)
    };
    let session = Session {
        cache: settings.cache(&home),
        tools: settings.tools(),
        runner: runner.as_ref(),
    };
    tracing::debug!(cache = %session.cache.root().display(), "session ready");

    match cli.command {
        Commands::Init { name, version } => commands::init::run(&cwd, &name, &version, &session),

        Commands::Install {
            url,
            name,
            private,
            recursive,
            update,
        } => {
            let options = AddOptions {
                private,
                update,
                recursive,
            };
            commands::install::run(&cwd, &url, &name, options, &session)
        }

        Commands::Remove { name } => commands::remove::run(&cwd, &name, &session).map(|_| ()),

        Commands::Restore {
            update,
            tidy,
            no_recursive,
            chain,
        } => {
            let options = RestoreOptions {
                update,
                tidy,
                recursive: !no_recursive,
            };
            let chain = RestoreChain::from_names(chain);
            commands::restore::run(&cwd, options, chain, &session).map(|_| ())
        }

        Commands::Create { template, name } => {
            commands::create::run(&cwd, &template, &name, &session)
        }

        Commands::Clean => commands::clean::run(&cwd, &session),

        Commands::Cache { action } => match action {
            CacheAction::List => commands::cache::list(&session).map(|_| ()),
            CacheAction::Prune => commands::cache::prune(&cwd, &session).map(|_| ()),
        },

        Commands::Publish {
            runtime,
            architecture,
            output,
            target,
        } => commands::publish::run(&cwd, &runtime, &architecture, &output, &target, &session),
    }
}
