use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;

use wallhue::apply::{apply_all, load_template, ApplyOptions, ReloadOutcome};
use wallhue::cli::{ApplyArgs, CheckArgs, Cli, Command, ExtractArgs, PipelineArgs, RenderArgs};
use wallhue::config::Config;
use wallhue::pipeline::{self, sample, PipelineConfig};
use wallhue::preview::print_preview;
use wallhue::template::builtin::{self, TemplateSource};
use wallhue::template::Renderer;
use wallhue::theme::SemanticPalette;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match cli.command {
        Command::Extract(args) => extract(args),
        Command::Apply(args) => apply(args),
        Command::Render(args) => render(args),
        Command::Check(args) => check(args),
        Command::Templates => {
            for name in builtin::names() {
                println!("{}{name}", builtin::PREFIX);
            }
            Ok(())
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

/// Config file values, overridden by whatever was given on the command line.
fn resolve_config(args: &PipelineArgs) -> Result<(Config, PipelineConfig)> {
    let config = Config::load_or_default(args.config.as_deref()).context("failed to load config")?;
    let mut pipeline = config.pipeline();
    if let Some(method) = args.method {
        pipeline.method = method;
    }
    if let Some(k) = args.colors {
        pipeline.k = k as usize;
    }
    if let Some(ms) = args.timeout_ms {
        pipeline.timeout = Some(std::time::Duration::from_millis(ms));
    }
    Ok((config, pipeline))
}

fn load_palette(image: &std::path::Path, config: &PipelineConfig) -> Result<SemanticPalette> {
    pipeline::run(image, config)
        .with_context(|| format!("failed to extract a palette from {}", image.display()))
}

fn extract(args: ExtractArgs) -> Result<()> {
    let (_, config) = resolve_config(&args.pipeline)?;

    if args.compare {
        let samples = sample::load_samples(&args.image)
            .with_context(|| format!("failed to read {}", args.image.display()))?;
        let ranked = pipeline::compare(&samples, &config);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        } else {
            for (rank, palette) in ranked.iter().enumerate() {
                println!(
                    "{}. {:<11} score {:.3}  contrast {:.2}:1  warnings {}",
                    rank + 1,
                    palette.method().as_str(),
                    palette.quality().total,
                    palette.text_contrast(),
                    palette.warnings().len()
                );
            }
        }
        return Ok(());
    }

    let palette = load_palette(&args.image, &config)?;
    if args.json {
        println!("{}", palette.to_json()?);
    } else {
        print_palette(&palette);
    }
    if args.preview {
        println!();
        print_preview(&palette).context("failed to write preview")?;
    }
    Ok(())
}

fn print_palette(palette: &SemanticPalette) {
    println!(
        "method {}  quality {:.3}  contrast {:.2}:1",
        palette.method(),
        palette.quality().total,
        palette.text_contrast()
    );
    for (role, color) in palette.iter() {
        println!("{:<10} {color}", role.name());
    }
}

fn apply(args: ApplyArgs) -> Result<()> {
    let (config, pipeline_config) = resolve_config(&args.pipeline)?;
    let targets = config.targets();
    if targets.is_empty() {
        bail!("no applications configured; add [[app]] entries to the config file");
    }

    let palette = load_palette(&args.image, &pipeline_config)?;
    let options = ApplyOptions {
        dry_run: args.dry_run,
        no_reload: args.no_reload,
        only: args.apps,
    };
    let statuses = apply_all(&palette, &targets, &options);
    if statuses.is_empty() {
        bail!("no matching applications enabled");
    }

    for status in &statuses {
        match &status.result {
            Ok(applied) => {
                let action = if applied.written { "wrote" } else { "would write" };
                let reload = match &applied.reload {
                    ReloadOutcome::Succeeded => ", reloaded".to_string(),
                    ReloadOutcome::Failed(reason) => format!(", reload failed: {reason}"),
                    ReloadOutcome::NotConfigured | ReloadOutcome::Skipped => String::new(),
                };
                println!(
                    "ok    {:<12} {action} {} ({} bytes){reload}",
                    status.app,
                    applied.path.display(),
                    applied.bytes
                );
            }
            Err(err) => println!("FAIL  {:<12} {err}", status.app),
        }
    }

    if statuses.iter().all(|status| !status.is_ok()) {
        bail!("every application failed");
    }
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let (_, config) = resolve_config(&args.pipeline)?;
    let source = TemplateSource::parse(&args.template)
        .with_context(|| format!("unknown builtin template: {}", args.template))?;
    let text = load_template(&source)?;
    let palette = load_palette(&args.image, &config)?;
    let rendered = Renderer::default().render(&args.template, &text, &palette)?;
    print!("{rendered}");
    Ok(())
}

fn check(args: CheckArgs) -> Result<()> {
    let renderer = Renderer::default();
    let mut failed = 0usize;
    for spec in &args.templates {
        let result = TemplateSource::parse(spec)
            .with_context(|| format!("unknown builtin template: {spec}"))
            .and_then(|source| Ok(load_template(&source)?))
            .and_then(|text| Ok(renderer.check(spec, &text)?));
        match result {
            Ok(()) => println!("ok    {spec}"),
            Err(err) => {
                failed += 1;
                println!("FAIL  {spec} {err:#}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} templates failed", args.templates.len());
    }
    Ok(())
}
