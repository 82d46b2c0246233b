//! Command-line interface for gistsel.
//!
//! Lists your gists through a fuzzy finder and edits, runs or opens the
//! selected files.

use clap::{Args, Parser, Subcommand};
use gistsel::{
    Config, GistError, Items, Mirror, RemoteClient, Row, Runner, Screen,
    convert_items, default_config_path, is_runnable, load_raw,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, exit};

/// gistsel — pick, edit, run and open your gists
#[derive(Parser)]
#[command(name = "gistsel", version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/gistsel/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct ListingArgs {
    /// Use your starred gists instead of your own
    #[arg(short, long)]
    starred: bool,

    /// Ignore the cached listing
    #[arg(long)]
    refresh: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Edit the gist file and sync after
    Edit {
        #[command(flatten)]
        listing: ListingArgs,
    },
    /// Run the gist snippet as a script
    Run {
        #[command(flatten)]
        listing: ListingArgs,
        /// Arguments passed to the script
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Open user's gist
    Open {
        #[command(flatten)]
        listing: ListingArgs,
        /// Open only gist base URL without selecting
        #[arg(long)]
        no_select: bool,
    },
    /// Print the rendered listing without selecting
    List {
        #[command(flatten)]
        listing: ListingArgs,
        /// Only gists with a file in runnable_ext
        #[arg(long)]
        runnable: bool,
    },
    /// Config the setting file with your editor
    Config,
}

#[cfg(feature = "logging")]
fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};
    let filter = if verbose {
        EnvFilter::new("gistsel=debug")
    } else {
        EnvFilter::try_from_env("GISTSEL_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    #[cfg(feature = "logging")]
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<(), GistError> {
    let path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = Config::load_or_init(&path)?;

    match cli.command {
        Commands::Edit { listing } => {
            apply_listing(&mut config, listing);
            edit(&config)
        }
        Commands::Run { listing, args } => {
            apply_listing(&mut config, listing);
            run_rows(&config, &args)
        }
        Commands::Open { listing, no_select } => {
            apply_listing(&mut config, listing);
            config.flag.no_select = no_select;
            open(&config)
        }
        Commands::List { listing, runnable } => {
            apply_listing(&mut config, listing);
            list(&config, runnable)
        }
        Commands::Config => launch(&config.core.editor, &path),
    }
}

fn apply_listing(config: &mut Config, listing: ListingArgs) {
    config.flag.starred |= listing.starred;
    config.flag.refresh = listing.refresh;
}

/// Selects rows and makes sure every selected gist is mirrored locally.
fn select_synced(config: &Config) -> Result<Vec<Row>, GistError> {
    let rows = Screen::open(config)?.select()?;
    let items: Items = rows.iter().map(|row| row.item.clone()).collect();
    for outcome in Mirror::new().clone_all(&items.unique()) {
        if let Err(e) = outcome.result {
            eprintln!("Error: {}: {}", outcome.id, e);
        }
    }
    Ok(rows)
}

fn edit(config: &Config) -> Result<(), GistError> {
    let rows = select_synced(config)?;
    let client = RemoteClient::from_config(&config.gist, &config.core.user)?;
    for row in rows {
        let path = &row.file.path;
        let before = fs::read_to_string(path).map_err(|e| GistError::Io {
            path: path.clone(),
            source: e,
        })?;
        launch(&config.core.editor, path)?;
        let after = fs::read_to_string(path).map_err(|e| GistError::Io {
            path: path.clone(),
            source: e,
        })?;
        if before != after {
            client.update_file(&row.item.id, &row.file.filename, &after)?;
            println!("Updated {} ({})", row.item.url, row.file.filename);
        }
    }
    Ok(())
}

fn run_rows(config: &Config, args: &[String]) -> Result<(), GistError> {
    let rows = select_synced(config)?;
    let runner = Runner::new(&config.gist.shell);
    for row in rows {
        if let Err(e) = runner.execute(&row.file, args) {
            eprintln!("Error: {}", e);
            continue;
        }
    }
    Ok(())
}

fn open(config: &Config) -> Result<(), GistError> {
    if config.flag.no_select {
        return open_url(&config.gist.base_url);
    }
    let rows = Screen::open(config)?.select()?;
    match rows.first() {
        Some(row) => open_url(row.url()),
        None => Err(GistError::NoSelection),
    }
}

fn list(config: &Config, runnable: bool) -> Result<(), GistError> {
    let settings = config.settings()?;
    let mut items = convert_items(load_raw(config)?, &settings)?.unique();
    if runnable {
        let exts = &config.gist.runnable_ext;
        items = items.filter(|item| item.files.iter().any(|f| is_runnable(f, exts)));
    }
    for line in items.render(&config.screen.columns) {
        println!("{}", line);
    }
    Ok(())
}

fn launch(program: &str, path: &Path) -> Result<(), GistError> {
    let mut argv = program.split_whitespace();
    let bin = argv.next().unwrap_or("vi");
    let status = Command::new(bin)
        .args(argv)
        .arg(path)
        .status()
        .map_err(|e| GistError::spawn(bin, e))?;
    GistError::check_status(bin, status)
}

fn open_url(url: &str) -> Result<(), GistError> {
    #[cfg(target_os = "macos")]
    let (bin, args): (&str, &[&str]) = ("open", &[]);
    #[cfg(target_os = "windows")]
    let (bin, args): (&str, &[&str]) = ("cmd", &["/C", "start", ""]);
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let (bin, args): (&str, &[&str]) = ("xdg-open", &[]);
    let status = Command::new(bin)
        .args(args)
        .arg(url)
        .status()
        .map_err(|e| GistError::spawn(bin, e))?;
    GistError::check_status(bin, status)
}
