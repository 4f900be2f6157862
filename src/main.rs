//! The `pagedb` shell: reads commands from stdin, one per line.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pagedb::{Outcome, Session, StorageConfig, TableKind, TABLE_MAX_PAGES};

#[derive(Debug, Parser)]
#[command(name = "pagedb", version, about = "A single-file B-tree table store")]
struct Cli {
    /// Database file, created if missing.
    file: PathBuf,

    /// Row kind stored in the file.
    #[arg(long, value_enum, default_value_t = Kind::Users)]
    kind: Kind,

    /// Highest number of pages the database may use.
    #[arg(long, default_value_t = TABLE_MAX_PAGES)]
    max_pages: u32,

    /// Split leaves after this many cells instead of when the page is full.
    #[arg(long)]
    leaf_max_cells: Option<usize>,

    /// Split internal nodes after this many keys instead of when the page is full.
    #[arg(long)]
    internal_max_keys: Option<usize>,

    /// Log filter, e.g. `debug` or `pagedb=trace`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Users,
    Catalog,
}

impl From<Kind> for TableKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Users => TableKind::Users,
            Kind::Catalog => TableKind::Catalog,
        }
    }
}

impl Cli {
    fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            max_pages: self.max_pages,
            leaf_max_cells: self.leaf_max_cells,
            internal_max_keys: self.internal_max_keys,
        }
    }
}

/// Logs go to stderr so they never mix with shell output.
fn init_logging(level: Option<&str>) {
    let env_filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let kind = TableKind::from(cli.kind);
    tracing::info!(file = %cli.file.display(), %kind, "starting shell");

    let mut session = match Session::open(&cli.file, kind, &cli.storage_config()) {
        Ok(session) => session,
        Err(err) => {
            println!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&mut session) {
        // Fatal: stop without writing anything back.
        println!("{}", err);
        return ExitCode::FAILURE;
    }

    match session.close() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Read-eval-print until `.exit` or end of input.
fn run(session: &mut Session) -> pagedb::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    let mut line = String::new();

    loop {
        write!(stdout, "db > ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }

        if session.execute_line(&line, &mut stdout)? == Outcome::Exit {
            return Ok(());
        }
        stdout.flush()?;
    }
}
