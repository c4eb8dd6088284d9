use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use celpack_core::prelude::*;
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use handlebars::Handlebars;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "celpack",
    about = "Rebuild pixel-art sprites from frame/layer PNGs, export cels, and mask multi-palette cels",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// YAML config file (bank size, diagnostic limit, layer/mask naming)
    #[arg(long, global = true, help_heading = "Config")]
    config: Option<PathBuf>,
    /// Print the merged configuration and exit
    #[arg(long, default_value_t = false, global = true, help_heading = "Config")]
    print_config: bool,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a sprite document from a folder of frame-<n>-layer-<n>.png files
    Import(ImportArgs),
    /// Show how the cels of a sprite use palette banks
    Analyze(AnalyzeArgs),
    /// Write every non-empty cel as Frame-<f>-Layer-<l>.png next to the sprite
    Export(ExportArgs),
    /// Write a single cel
    ExportCel(ExportCelArgs),
    /// Add palette-mask layers for cels that mix palette banks, then save the sprite
    Mask(MaskArgs),
    /// Flatten every frame to an RGBA PNG
    Render(RenderArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
struct ImportArgs {
    /// Folder containing frame-<n>-layer-<n>.png files
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Sprite document to write
    #[arg(short, long, default_value = "sprite.celpack", help_heading = "Input/Output")]
    output: PathBuf,
    /// Analyze the folder without writing the sprite
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    dry_run: bool,
    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text, help_heading = "Report")]
    format: ReportFormat,
}

#[derive(Parser, Debug, Clone)]
struct AnalyzeArgs {
    /// Sprite document
    input: PathBuf,
    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

#[derive(Parser, Debug, Clone)]
struct ExportArgs {
    /// Sprite document
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Write a JSON manifest of the exported files to this path
    #[arg(long, help_heading = "Export")]
    manifest: Option<PathBuf>,
    /// Render the manifest through a handlebars template instead of JSON
    #[arg(long, requires = "manifest", help_heading = "Export")]
    template: Option<PathBuf>,
    /// Analyze only; do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct ExportCelArgs {
    /// Sprite document
    input: PathBuf,
    /// Layer stack index (1 = bottom)
    #[arg(long)]
    layer: usize,
    /// Frame number (1-based)
    #[arg(long)]
    frame: u32,
}

#[derive(Parser, Debug, Clone)]
struct MaskArgs {
    /// Sprite document (updated in place)
    input: PathBuf,
    /// Compute masks but do not save
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct RenderArgs {
    /// Sprite document
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let cfg = load_config(cli.config.as_deref())?;
    if cli.print_config {
        println!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }
    let Some(command) = &cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };
    match command {
        Commands::Import(args) => run_import(args, &cfg),
        Commands::Analyze(args) => run_analyze(args, &cfg),
        Commands::Export(args) => run_export(args, &cfg, cli.progress && !cli.quiet),
        Commands::ExportCel(args) => run_export_cel(args, &cfg),
        Commands::Mask(args) => run_mask(args, &cfg),
        Commands::Render(args) => run_render(args, &cfg),
    }
}

fn run_import(args: &ImportArgs, cfg: &CelConfig) -> anyhow::Result<()> {
    let scan = match scan_png_files(&args.input, cfg) {
        Ok(scan) => scan,
        Err(e) => {
            print_report(&ImportView::from_error(&args.input, &e), args.format, |v| {
                v.lines()
            })?;
            return Err(e).with_context(|| format!("scan {}", args.input.display()));
        }
    };
    let view = ImportView::from_scan(&args.input, &scan, cfg);
    print_report(&view, args.format, |v| v.lines())?;
    if !view.can_import {
        anyhow::bail!("nothing to import from {}", args.input.display());
    }
    if args.dry_run {
        return Ok(());
    }

    let (mut sprite, summary) = create_sprite_from_files(&scan, cfg)?;
    save_sprite(&mut sprite, &args.output)
        .with_context(|| format!("write {}", args.output.display()))?;
    info!(output = ?args.output, "{}", summary.summary());
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs, cfg: &CelConfig) -> anyhow::Result<()> {
    let sprite = open_sprite(&args.input)?;
    let scan = scan_cels(&sprite, cfg);
    let view = ExportView::from_scan(&sprite, scan.as_ref(), cfg);
    print_report(&view, args.format, |v| v.lines())
}

fn run_export(args: &ExportArgs, cfg: &CelConfig, show_progress: bool) -> anyhow::Result<()> {
    let sprite = open_sprite(&args.input)?;
    let scan = scan_cels(&sprite, cfg);
    let view = ExportView::from_scan(&sprite, scan.as_ref(), cfg);
    print_report(&view, ReportFormat::Text, |v| v.lines())?;
    let scan = scan?;
    check_exportable(Some(&sprite))?;
    if args.dry_run {
        return Ok(());
    }

    let dir = export_dir(&sprite)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let bar = progress_bar(scan.cels.len(), show_progress);
    let mut summary = ExportSummary {
        dir: dir.clone(),
        written: Vec::with_capacity(scan.cels.len()),
    };
    for item in &scan.cels {
        if let Some(b) = &bar {
            b.set_message(item.label());
        }
        let path = export_cel(&sprite, item, &dir)
            .with_context(|| format!("export {}", item.label()))?;
        summary.written.push(path);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(count = summary.count(), ?dir, "cels exported");

    if let Some(manifest_path) = &args.manifest {
        let manifest = export_manifest(&summary, &scan);
        let rendered = match &args.template {
            Some(tpl_path) => {
                let tpl = fs::read_to_string(tpl_path)
                    .with_context(|| format!("read {}", tpl_path.display()))?;
                let mut reg = Handlebars::new();
                reg.set_strict_mode(true);
                reg.register_template_string("tpl", tpl)?;
                reg.render("tpl", &manifest)?
            }
            None => serde_json::to_string_pretty(&manifest)?,
        };
        fs::write(manifest_path, rendered)
            .with_context(|| format!("write {}", manifest_path.display()))?;
        info!(?manifest_path, "manifest written");
    }
    Ok(())
}

fn run_export_cel(args: &ExportCelArgs, cfg: &CelConfig) -> anyhow::Result<()> {
    let sprite = open_sprite(&args.input)?;
    check_exportable(Some(&sprite))?;
    let scan = scan_cels(&sprite, cfg)?;
    let Some(item) = scan
        .cels
        .iter()
        .find(|c| c.layer_index == args.layer && c.frame == args.frame)
    else {
        anyhow::bail!(
            "no exportable cel at layer {}, frame {} (missing, empty, or on a mask layer)",
            args.layer,
            args.frame
        );
    };
    let dir = export_dir(&sprite)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = export_cel(&sprite, item, &dir)?;
    info!(?path, "cel exported");
    Ok(())
}

fn run_mask(args: &MaskArgs, cfg: &CelConfig) -> anyhow::Result<()> {
    let mut sprite = open_sprite(&args.input)?;
    let scan = scan_cels(&sprite, cfg)?;
    if scan.mixed_count() == 0 {
        info!("no cels mix palette banks; nothing to mask");
        return Ok(());
    }
    let summary = mask_multi_pal_cels(&mut sprite, &scan, cfg)?;
    info!("{}", summary.summary());
    if args.dry_run {
        warn!("dry run: sprite not saved");
        return Ok(());
    }
    save_sprite(&mut sprite, &args.input)
        .with_context(|| format!("write {}", args.input.display()))?;
    Ok(())
}

fn run_render(args: &RenderArgs, cfg: &CelConfig) -> anyhow::Result<()> {
    let sprite = open_sprite(&args.input)?;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    for frame in 1..=sprite.frames {
        let rgba = render_frame(&sprite, frame, cfg);
        let png_path = args.out_dir.join(format!("frame-{}.png", frame));
        celpack_core::write_rgba_png(&png_path, &rgba)
            .with_context(|| format!("write {}", png_path.display()))?;
        info!(?png_path, frame, "rendered frame");
    }
    Ok(())
}

fn open_sprite(path: &Path) -> anyhow::Result<Sprite> {
    load_sprite(path).with_context(|| format!("open sprite {}", path.display()))
}

fn print_report<V: serde::Serialize>(
    view: &V,
    format: ReportFormat,
    lines: impl Fn(&V) -> Vec<String>,
) -> anyhow::Result<()> {
    match format {
        ReportFormat::Text => {
            for line in lines(view) {
                println!("{line}");
            }
        }
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(view)?),
    }
    Ok(())
}

fn progress_bar(len: usize, show: bool) -> Option<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return None;
    }
    let b = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} exporting {pos}/{len} [{elapsed_precise}] {wide_msg}",
    ) {
        b.set_style(style);
    }
    Some(b)
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CelConfig> {
    let cfg = match path {
        Some(path) => {
            let file =
                fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)?;
            y.into_cel_config(CelConfig::default())
        }
        None => CelConfig::default(),
    };
    cfg.validate()?;
    Ok(cfg)
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    bank_size: Option<u16>,
    diagnostic_limit: Option<usize>,
    mask_layer_prefix: Option<String>,
    layer_name_prefix: Option<String>,
    transparent_index: Option<u8>,
}

impl YamlConfig {
    fn into_cel_config(self, mut cfg: CelConfig) -> CelConfig {
        if let Some(v) = self.bank_size {
            cfg.bank_size = v;
        }
        if let Some(v) = self.diagnostic_limit {
            cfg.diagnostic_limit = v;
        }
        if let Some(v) = self.mask_layer_prefix {
            cfg.mask_layer_prefix = v;
        }
        if let Some(v) = self.layer_name_prefix {
            cfg.layer_name_prefix = v;
        }
        if let Some(v) = self.transparent_index {
            cfg.transparent_index = v;
        }
        cfg
    }
}
