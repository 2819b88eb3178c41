use clap::{Parser, Subcommand};
use dirlist::config;
use dirlist::generate::{DirList, Handler, Outcome};
use dirlist::http::{Exchange, Method, Request};
use dirlist::output;
use dirlist::stat_cache::FsStatCache;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dirlist")]
#[command(about = "Generate HTML directory listings")]
#[command(long_about = "\
Generate HTML directory listings

Renders the page a file server would send for a directory request:
a table of subdirectories and files with sizes, modification times and
MIME types, optionally framed by the directory's HEADER.txt and README.txt.

The listing body goes to stdout; the status line and headers go to stderr.

Run 'dirlist gen-config' to generate a documented config file.")]
#[command(version = dirlist::version_string())]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Directory to list
    dir: PathBuf,

    /// Request path the directory is served under
    #[arg(long, default_value = "/")]
    uri: String,

    /// Query string, kept on trailing-slash redirects
    #[arg(long)]
    query: Option<String>,

    /// Listing config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Request method
    #[arg(long, default_value = "GET")]
    method: String,

    /// Send an If-None-Match header
    #[arg(long)]
    if_none_match: Option<String>,

    /// Send an If-Modified-Since header
    #[arg(long)]
    if_modified_since: Option<String>,

    /// Footer text instead of dirlist/<version>
    #[arg(long)]
    server_tag: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Render the listing for a directory
    Render(RenderArgs),
    /// Validate a config file and print the effective settings as JSON
    CheckConfig {
        /// Listing config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render(args) => render(args)?,
        Command::CheckConfig { config } => {
            let listing_config = config::load_config(config.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&listing_config)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "dirlist=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn render(args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let listing_config = config::load_config(args.config.as_deref())?;
    let mut handler = DirList::new(listing_config, FsStatCache::new());
    if let Some(tag) = args.server_tag {
        handler = handler.with_server_tag(tag);
    }

    let method = Method::parse(&args.method);
    let is_head = method == Method::Head;
    let mut request = Request::new(method, args.uri, args.dir);
    if let Some(query) = args.query {
        request = request.with_query(query);
    }
    if let Some(etag) = args.if_none_match {
        request = request.with_header("If-None-Match", etag);
    }
    if let Some(since) = args.if_modified_since {
        request = request.with_header("If-Modified-Since", since);
    }

    let mut ex = Exchange::new(request);
    let outcome = handler.handle(&mut ex);
    output::print_outcome(&outcome, &ex.response);

    if let Outcome::Error(e) = outcome {
        return Err(e.into());
    }
    if !is_head {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        ex.response.body.write_to(&mut out)?;
        out.flush()?;
    }
    Ok(())
}
