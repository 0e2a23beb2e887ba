use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use supersearch::{search, Options, SearchError};
use tracing_subscriber::EnvFilter;

/// Recursively search the filesystem for a pattern.
///
/// Literal patterns use Boyer-Moore string search; patterns containing a
/// regex metacharacter are compiled as regular expressions.
#[derive(Parser)]
#[command(name = "ss", version, about, long_about = None)]
struct Cli {
    /// Pattern to search for
    pattern: String,

    /// File or directory to search
    #[arg(default_value = ".")]
    location: PathBuf,

    /// Ignore case sensitivity when matching
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Search hidden files and directories
    #[arg(long)]
    hidden: bool,

    /// Search all files (ignore .gitignore rules)
    #[arg(short = 'U', long)]
    unrestricted: bool,

    /// Don't print matches, just run the search
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Show verbose debug information
    #[arg(short = 'D', long)]
    debug: bool,

    /// Show stats (number of matches, files searched, time taken)
    #[arg(long)]
    stats: bool,

    /// Maximum number of worker threads (default: logical cores)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Path to an alternate configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_options(self) -> Result<Options, SearchError> {
        let mut cli_opts = Options::new(self.pattern, self.location);
        cli_opts.ignore_case = self.ignore_case;
        cli_opts.hidden = self.hidden;
        cli_opts.unrestricted = self.unrestricted;
        cli_opts.quiet = self.quiet;
        cli_opts.debug = self.debug;
        cli_opts.show_stats = self.stats;
        cli_opts.max_concurrency = self.threads;

        let file_opts = Options::load_from(self.config.as_deref())?;
        Ok(file_opts.merge_with_cli(cli_opts))
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SearchError> {
    let opts = cli.into_options()?;
    let summary = search(&opts)?;
    if opts.show_stats {
        println!("{summary}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ss: {err}");
            ExitCode::from(2)
        }
    }
}
