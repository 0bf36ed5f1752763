mod cli;

use tileforged::{
    batch::{self, format_mb, BatchOptions, BatchRunner},
    config, discovery, inspect,
};

use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "tileforged=trace,tileforged_format=debug".to_string()
        } else {
            "tileforged=info,tileforged_format=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Optimize {
            input,
            output_dir,
            inplace,
            max_size,
            quality,
            workers,
        } => {
            let mut config = config::load_config_or_default(cli.config.as_deref())?;

            // CLI flags win over the config file
            if let Some(max_size) = max_size {
                config.optimize.max_size = max_size;
            }
            if let Some(quality) = quality {
                config.optimize.quality = quality;
            }
            if let Some(workers) = workers {
                config.optimize.workers = Some(workers as usize);
            }
            config::validate_config(&config)?;

            let output = if inplace {
                None
            } else {
                Some(match output_dir {
                    Some(dir) => dir,
                    None => default_output_dir(&input)?,
                })
            };

            run_optimize(&input, output.as_deref(), &config)
        }
        Commands::Inspect { files, json } => inspect_files(&files, json),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("tileforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// `<input>_optimized` next to the input directory.
fn default_output_dir(input: &Path) -> Result<PathBuf> {
    let input = std::fs::canonicalize(input)
        .with_context(|| format!("Input directory does not exist: {:?}", input))?;
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tiles".to_string());
    Ok(input.with_file_name(format!("{}_optimized", name)))
}

fn run_optimize(input: &Path, output: Option<&Path>, config: &config::Config) -> Result<()> {
    if !input.is_dir() {
        anyhow::bail!("Input directory does not exist: {:?}", input);
    }

    // Keep a nested output directory out of the scan
    let exclude = output.and_then(|out| {
        let out = std::fs::canonicalize(out).ok()?;
        let root = std::fs::canonicalize(input).ok()?;
        let nested = out.strip_prefix(&root).ok()?;
        Some(input.join(nested))
    });

    let found = discovery::discover(input, &config.discovery, exclude.as_deref());
    if found.is_empty() {
        anyhow::bail!("No b3dm files found in {:?}", input);
    }

    println!("Input: {}", input.display());
    match output {
        Some(out) => {
            let copied = found
                .mirror_into(out)
                .with_context(|| format!("Failed to prepare output directory {:?}", out))?;
            println!("Output: {}", out.display());
            if copied > 0 {
                println!("Copied {} descriptor files", copied);
            }
        }
        None => println!("Mode: in place"),
    }
    println!(
        "Max texture size: {}px, JPEG quality: {}",
        config.optimize.max_size, config.optimize.quality
    );
    println!("Files: {}\n", found.tiles.len());

    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = batch::shutdown::listen(stop.clone()) {
        tracing::warn!("Failed to install signal handlers: {}", e);
    }

    let options = BatchOptions {
        settings: config.optimize.transcode_settings(),
        workers: config.optimize.workers,
    };
    let runner = BatchRunner::new(options, stop.clone());

    let summary = runner.run_with_progress(found.jobs(output), |done, total, report| {
        println!("[{}/{}] {}", done, total, report);
    })?;

    println!("\nOptimized: {}", summary.optimized);
    println!("Passed through: {}", summary.passed_through);
    println!("Failed: {}", summary.failed);
    if summary.optimized > 0 {
        println!(
            "Total: {} → {} ({:.1}% reduction, {} saved)",
            format_mb(summary.original_bytes),
            format_mb(summary.new_bytes),
            summary.reduction_percent(),
            format_mb(summary.saved_bytes())
        );
    }

    if stop.load(Ordering::SeqCst) {
        anyhow::bail!(
            "Interrupted: {} of {} files were not processed",
            summary.interrupted,
            summary.total()
        );
    }

    Ok(())
}

fn inspect_files(files: &[PathBuf], json: bool) -> Result<()> {
    let mut failures = 0;
    let mut inventories = Vec::new();

    for file in files {
        let result = std::fs::read(file)
            .with_context(|| format!("Failed to read {:?}", file))
            .and_then(|data| inspect::inspect(Bytes::from(data)).map_err(Into::into));

        let inventory = match result {
            Ok(inventory) => inventory,
            Err(e) => {
                failures += 1;
                eprintln!("{}: {:#}", file.display(), e);
                continue;
            }
        };

        if json {
            inventories.push(serde_json::json!({
                "file": file,
                "tile": inventory,
            }));
            continue;
        }

        println!(
            "\n=== {} ({}) ===",
            file.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string()),
            format_mb(inventory.file_size as u64)
        );
        println!(
            "Version: {}, payload: {}, images: {} ({})",
            inventory.version,
            format_mb(inventory.payload_size as u64),
            inventory.images.len(),
            format_mb(inventory.image_bytes() as u64)
        );
        for image in &inventory.images {
            let detail = match (&image.format, &image.error) {
                (_, Some(error)) => error.as_str(),
                (Some(format), None) => format.as_str(),
                (None, None) => "?",
            };
            println!(
                "  {}: {} ({}) - {}",
                image.name,
                image.dimensions(),
                format_mb(image.byte_length as u64),
                detail
            );
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&inventories)?);
    }

    if failures > 0 {
        anyhow::bail!("{} of {} files could not be inspected", failures, files.len());
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Max texture size: {}", config.optimize.max_size);
    println!("  JPEG quality: {}", config.optimize.quality);
    match config.optimize.workers {
        Some(workers) => println!("  Workers: {}", workers),
        None => println!("  Workers: {} (CPU count)", num_cpus::get()),
    }
    println!(
        "  Descriptor extensions: {}",
        config.discovery.descriptor_extensions.join(", ")
    );

    Ok(())
}
