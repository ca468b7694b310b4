use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use autoframe::batch::bundle::{bundle_filename, write_bundle_file};
use autoframe::batch::process::{BatchFile, parse_base_overrides, validate_job_id};
use autoframe::naming::filename::prepare_base_info;
use autoframe::naming::policy::today_stamp;
use autoframe::render::orchestrator::OUTPUT_EXTENSION;
use autoframe::{
    AspectKey, AutoframeConfig, BatchProcessor, BatchRequest, FfmpegToolkit, FsSummaryStore,
    InMemoryProgressStore, NamingForm, RenderOrchestrator, StyleKind, SummaryStore,
    build_naming_config, generate_output_filename,
};

#[derive(Parser, Debug)]
#[command(name = "autoframe", version)]
struct Cli {
    /// Override `OUTPUT_DIR`.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reframe one or more clips into every requested ratio (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Zip the rendered outputs of a job.
    Bundle(BundleArgs),
    /// Print a job's batch summary as JSON.
    Summary(SummaryArgs),
    /// Preview the filename an output would get, without rendering.
    Name(NameArgs),
}

#[derive(Args, Debug, Default)]
struct NamingArgs {
    /// `auto` or `custom`.
    #[arg(long)]
    naming_mode: Option<String>,

    /// Pattern preset (`base_ratio`, `base_ratio_style`, `base_dash_ratio`, `base_style`, `custom`).
    #[arg(long)]
    preset: Option<String>,

    /// Template used with `--preset custom`, e.g. `{base}_{ratio}_{seq}`.
    #[arg(long)]
    pattern: Option<String>,

    #[arg(long)]
    auto_clean: Option<String>,

    #[arg(long)]
    keep_tokens: Option<String>,

    #[arg(long)]
    add_sequence: Option<String>,

    #[arg(long)]
    append_date: Option<String>,

    /// `short` or `friendly`.
    #[arg(long)]
    label_mode: Option<String>,
}

impl NamingArgs {
    fn into_form(self) -> NamingForm {
        NamingForm {
            naming_mode: self.naming_mode,
            naming_preset: self.preset,
            naming_custom_pattern: self.pattern,
            naming_auto_clean: self.auto_clean,
            naming_keep_tokens: self.keep_tokens,
            naming_add_sequence: self.add_sequence,
            naming_append_date: self.append_date,
            naming_label_mode: self.label_mode,
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Source clips.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Background style: `blur`, `black` or `fill`.
    #[arg(long, default_value = "blur")]
    style: String,

    /// Output ratio key; repeat for several (`portrait`, `four_five`, `square`, `landscape`).
    #[arg(long = "ratio", default_values_t = [String::from("portrait")])]
    ratios: Vec<String>,

    /// Add to an existing job instead of starting a new one.
    #[arg(long)]
    job_id: Option<String>,

    /// JSON object mapping original filenames to base names.
    #[arg(long)]
    base_overrides: Option<String>,

    /// Also write the job's zip bundle.
    #[arg(long, default_value_t = false)]
    bundle: bool,

    #[command(flatten)]
    naming: NamingArgs,
}

#[derive(Parser, Debug)]
struct BundleArgs {
    #[arg(long)]
    job_id: String,

    /// Archive path; defaults to `<output_dir>/<job_id>/AutoFrame__<date>.zip`.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SummaryArgs {
    #[arg(long)]
    job_id: String,
}

#[derive(Parser, Debug)]
struct NameArgs {
    /// Original upload name, e.g. `Trip 1920x1080.mov`.
    original: String,

    #[arg(long, default_value = "portrait")]
    ratio: String,

    #[arg(long, default_value = "blur")]
    style: String,

    #[arg(long)]
    seq: Option<u32>,

    /// Base name to use instead of the original's stem.
    #[arg(long = "base")]
    base_override: Option<String>,

    #[command(flatten)]
    naming: NamingArgs,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = AutoframeConfig::from_env();
    if let Some(dir) = cli.output_dir {
        config = config.with_output_dir(dir);
    }
    config.validate()?;

    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Bundle(args) => cmd_bundle(config, args),
        Command::Summary(args) => cmd_summary(config, args),
        Command::Name(args) => cmd_name(args),
    }
}

fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoframe=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    }
}

fn cmd_render(config: AutoframeConfig, args: RenderArgs) -> anyhow::Result<()> {
    let summaries = Arc::new(FsSummaryStore::new(config.output_dir.clone()));
    let output_dir = config.output_dir.clone();
    let orchestrator = RenderOrchestrator::new(
        Arc::new(FfmpegToolkit),
        Arc::new(InMemoryProgressStore::new()),
        config,
    );
    let processor = BatchProcessor::new(orchestrator, summaries);

    let request = BatchRequest {
        job_id: args.job_id,
        files: args.inputs.into_iter().map(BatchFile::from_path).collect(),
        style: args.style,
        ratios: args.ratios,
        naming: args.naming.into_form(),
        base_overrides: parse_base_overrides(args.base_overrides.as_deref()),
    };
    let report = processor.process_batch(&request)?;

    if args.bundle && report.output_count() > 0 {
        let job_dir = output_dir.join(&report.job_id);
        let dest = job_dir.join(bundle_filename(&report.policy.date_stamp));
        let count = write_bundle_file(&job_dir, &dest)?;
        tracing::info!(path = %dest.display(), files = count, "wrote bundle");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    if report.results.is_empty() {
        anyhow::bail!("no clip was rendered");
    }
    Ok(())
}

fn cmd_bundle(config: AutoframeConfig, args: BundleArgs) -> anyhow::Result<()> {
    validate_job_id(&args.job_id)?;
    let store = FsSummaryStore::new(config.output_dir.clone());
    let job_dir = store.job_dir(&args.job_id);
    let date = store
        .load(&args.job_id)?
        .policy()
        .map(|p| p.date_stamp.clone())
        .unwrap_or_else(today_stamp);
    let dest = args
        .out
        .unwrap_or_else(|| job_dir.join(bundle_filename(&date)));

    let count = write_bundle_file(&job_dir, &dest)
        .with_context(|| format!("bundle job '{}'", args.job_id))?;
    println!("{} ({count} files)", dest.display());
    Ok(())
}

fn cmd_summary(config: AutoframeConfig, args: SummaryArgs) -> anyhow::Result<()> {
    validate_job_id(&args.job_id)?;
    let store = FsSummaryStore::new(config.output_dir.clone());
    let summary = store.load(&args.job_id)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_name(args: NameArgs) -> anyhow::Result<()> {
    let aspect = AspectKey::parse(&args.ratio)
        .with_context(|| format!("unknown ratio key '{}'", args.ratio))?;
    let style = StyleKind::parse_or_default(&args.style);
    let form = args.naming.into_form();
    let policy = build_naming_config(None, Some(&form), &today_stamp());
    let base_info = prepare_base_info(&args.original, args.base_override.as_deref(), &policy);

    // Preview against an empty directory so the name is never suffixed.
    let scratch = tempfile::tempdir()?;
    let name = generate_output_filename(
        &base_info,
        aspect,
        style,
        &policy,
        args.seq,
        OUTPUT_EXTENSION,
        scratch.path(),
    );
    println!("{}", name.filename);
    Ok(())
}
