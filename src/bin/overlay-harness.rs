use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "overlay-harness", version)]
struct Cli {
    /// Log debug detail (resolved paths, skipped overlays).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a candidate PNG against a reference PNG.
    Compare(CompareArgs),
    /// Print the overlay catalog and its comparison policies.
    Catalog(CatalogArgs),
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Freshly produced image.
    #[arg(long)]
    candidate: PathBuf,

    /// Stored reference image.
    #[arg(long)]
    reference: PathBuf,

    /// Maximum allowed per-channel difference (8-bit).
    #[arg(long, default_value_t = 2)]
    tolerance: u8,

    /// Write a diff visualisation here when the images differ.
    #[arg(long)]
    diff: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Compare(args) => cmd_compare(args),
        Command::Catalog(args) => cmd_catalog(args),
    }
}

fn cmd_compare(args: CompareArgs) -> anyhow::Result<()> {
    let res = overlay_harness::compare(&args.candidate, &args.reference, args.tolerance)
        .with_context(|| format!("compare '{}'", args.candidate.display()))?;

    if res.equal {
        tracing::info!(
            max_delta = res.max_delta,
            "reference and output image are identical within tolerance {}",
            args.tolerance
        );
        return Ok(());
    }

    if let Some(out) = &args.diff {
        overlay_harness::write_diff_image(&args.candidate, &args.reference, args.tolerance, out)?;
        eprintln!("wrote {}", out.display());
    }

    let first = res
        .first_mismatch
        .map(|m| m.to_string())
        .unwrap_or_default();
    anyhow::bail!(
        "images differ: {} pixel(s) out of tolerance {}, first at {first}\n  candidate: {}\n  reference: {}",
        res.differing_pixels,
        args.tolerance,
        args.candidate.display(),
        args.reference.display()
    );
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let catalog = overlay_harness::OverlayCatalog::standard();

    if args.json {
        let entries: Vec<_> = catalog.entries().collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{:<18} {:<12} {:<12} {}",
        "overlay", "excluded", "range", "source"
    );
    for d in catalog.entries() {
        let excluded = d
            .exclusion
            .map(|why| format!("{why:?}"))
            .unwrap_or_else(|| "-".to_string());
        let range = format!("{}..{}", d.range.black, d.range.white);
        let source = match d.source {
            overlay_harness::OverlaySource::OverlayOutput => "overlay",
            overlay_harness::OverlaySource::BaseTarget => "base target",
        };
        println!(
            "{:<18} {:<12} {:<12} {}",
            d.display_name, excluded, range, source
        );
    }
    Ok(())
}
