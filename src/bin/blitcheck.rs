use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use blitcheck::{
    BenchParams, BlendContext, BlendOperation, ColorFormat, MatrixParams, SpeedupThresholds,
    StdCycles, run_and_compare, run_benchmark, sweep,
};

#[derive(Parser, Debug)]
#[command(name = "blitcheck", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the exhaustive equivalence matrix for one operation.
    Sweep(SweepArgs),
    /// Measure reference vs accelerated cycles and check speedup thresholds.
    Bench(BenchArgs),
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Color format under test.
    #[arg(long, value_enum, default_value_t = FormatChoice::Argb8888)]
    format: FormatChoice,

    /// Blend operation under test.
    #[arg(long, value_enum, default_value_t = OpChoice::Fill)]
    op: OpChoice,

    /// Override the maximum tested width.
    #[arg(long)]
    max_w: Option<u32>,

    /// Override the maximum tested height.
    #[arg(long)]
    max_h: Option<u32>,
}

#[derive(Parser, Debug)]
struct BenchArgs {
    /// Color format under test.
    #[arg(long, value_enum, default_value_t = FormatChoice::Argb8888)]
    format: FormatChoice,

    /// Blend operation under test.
    #[arg(long, value_enum, default_value_t = OpChoice::Fill)]
    op: OpChoice,

    /// Ideal-case buffer width; the corner case runs one narrower.
    #[arg(long, default_value_t = 128)]
    width: u32,

    /// Ideal-case buffer height; the corner case runs one shorter.
    #[arg(long, default_value_t = 128)]
    height: u32,

    /// Timed invocations per configuration.
    #[arg(long, default_value_t = 750)]
    iterations: u32,

    /// JSON threshold table; the built-in portable table when omitted.
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Hardware target key for the threshold lookup.
    #[arg(long, default_value = "portable")]
    target: String,

    /// Write the benchmark report as JSON.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Argb8888,
    Rgb565,
}

impl From<FormatChoice> for ColorFormat {
    fn from(value: FormatChoice) -> Self {
        match value {
            FormatChoice::Argb8888 => ColorFormat::Argb8888,
            FormatChoice::Rgb565 => ColorFormat::Rgb565,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OpChoice {
    Fill,
    FillOpa,
    Image,
}

impl From<OpChoice> for BlendOperation {
    fn from(value: OpChoice) -> Self {
        match value {
            OpChoice::Fill => BlendOperation::PlainFill,
            OpChoice::FillOpa => BlendOperation::FillWithOpacity,
            OpChoice::Image => BlendOperation::ImageCopyBlend,
        }
    }
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Sweep(args) => run_sweep(args),
        Command::Bench(args) => run_bench(args),
    }
}

fn run_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let format: ColorFormat = args.format.into();
    let op: BlendOperation = args.op.into();

    let mut params = match op {
        BlendOperation::PlainFill => MatrixParams::fill_defaults(format),
        BlendOperation::FillWithOpacity => MatrixParams::fill_opacity_defaults(format),
        BlendOperation::ImageCopyBlend => MatrixParams::image_defaults(format),
    };
    if let Some(max_w) = args.max_w {
        params.max_w = max_w.max(params.min_w);
    }
    if let Some(max_h) = args.max_h {
        params.max_h = max_h.max(params.min_h);
    }

    let mut ctx = BlendContext::new(format)?;
    let count = sweep(&params, &mut ctx, run_and_compare)?;
    println!("{op} {format}: {count} combinations, all equal");
    Ok(())
}

fn run_bench(args: BenchArgs) -> anyhow::Result<()> {
    let format: ColorFormat = args.format.into();
    let op: BlendOperation = args.op.into();

    let thresholds = match &args.thresholds {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read threshold table '{}'", path.display()))?;
            SpeedupThresholds::from_json(&json)?
        }
        None => SpeedupThresholds::builtin(),
    };

    let mut params = BenchParams::defaults(op, format);
    params.width = args.width;
    params.height = args.height;
    params.iterations = args.iterations;

    let mut ctx = BlendContext::new(format)?;
    let clock = StdCycles::new();
    let report = run_benchmark(&mut ctx, &params, &clock, &thresholds, &args.target)?;

    for (name, cfg) in [("common", &report.common), ("corner", &report.corner)] {
        println!(
            "{op} {format} {name} case: {:.3} avg cycles reference, {:.3} avg cycles accelerated \
             for {}x{}, {:.3} cycles per sample, speedup {:.3} (required {:.3})",
            cfg.reference_cycles,
            cfg.accelerated_cycles,
            cfg.width,
            cfg.height,
            cfg.cycles_per_sample,
            cfg.speedup,
            cfg.min_speedup,
        );
    }

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(out, json)
            .with_context(|| format!("write report '{}'", out.display()))?;
    }

    Ok(())
}
