use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "wavyte-preview", version)]
struct Cli {
    /// Log filter level written to stderr (e.g. `debug`).
    #[arg(long, global = true, default_value = "warn")]
    log: tracing::Level,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the dynamic elements of a saved renderer state as JSON.
    Dynamic(DynamicArgs),
    /// Print the URL and trusted origin a surface would be opened with.
    Surface(SurfaceArgs),
}

#[derive(Parser, Debug)]
struct DynamicArgs {
    /// Renderer state JSON, as pushed in a `stateChange` message.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Only consider top-level elements.
    #[arg(long)]
    top_level: bool,
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Public access token.
    #[arg(long)]
    token: String,

    /// Surface flavour.
    #[arg(long, value_enum, default_value_t = KindChoice::Player)]
    kind: KindChoice,

    /// Player config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindChoice {
    Player,
    Interactive,
}

impl From<KindChoice> for wavyte_preview::SurfaceKind {
    fn from(choice: KindChoice) -> Self {
        match choice {
            KindChoice::Player => Self::Player,
            KindChoice::Interactive => Self::Interactive,
        }
    }
}

/// One line of `dynamic` output.
#[derive(Serialize, Debug)]
struct DynamicRow<'a> {
    selector: Option<&'a str>,
    #[serde(rename = "type")]
    element_type: Option<&'a str>,
    track: i64,
    time: f64,
    duration: f64,
}

impl<'a> From<&'a wavyte_preview::ElementState> for DynamicRow<'a> {
    fn from(el: &'a wavyte_preview::ElementState) -> Self {
        Self {
            selector: el.selector(),
            element_type: el.element_type(),
            track: el.track,
            time: el.time,
            duration: el.duration,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Dynamic(args) => cmd_dynamic(args),
        Command::Surface(args) => cmd_surface(args),
    }
}

fn cmd_dynamic(args: DynamicArgs) -> anyhow::Result<()> {
    let state = wavyte_preview::RendererState::from_path(&args.in_path)
        .with_context(|| format!("load renderer state '{}'", args.in_path.display()))?;

    let found = if args.top_level {
        wavyte_preview::filter_dynamic_top_level(&state)
    } else {
        wavyte_preview::collect_dynamic_elements(&state)
    };
    tracing::info!(count = found.len(), top_level = args.top_level, "dynamic elements");

    let rows: Vec<DynamicRow<'_>> = found.into_iter().map(DynamicRow::from).collect();
    let out = serde_json::to_string_pretty(&rows).context("serialize dynamic elements")?;
    println!("{out}");
    Ok(())
}

fn cmd_surface(args: SurfaceArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => wavyte_preview::PlayerConfig::from_path(path)
            .with_context(|| format!("load player config '{}'", path.display()))?,
        None => wavyte_preview::PlayerConfig::default(),
    };

    let kind = wavyte_preview::SurfaceKind::from(args.kind);
    let src = config.surface_url(kind, &args.token)?;
    let origin = config.origin()?;

    let out = serde_json::json!({
        "kind": kind,
        "src": src,
        "trusted_origin": origin,
        "request_timeout_ms": config.request_timeout_ms,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
