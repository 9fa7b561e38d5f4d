//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref root) = args.root {
        info!(root = %root.display(), "Overriding session root from CLI");
        blueprint.session.root = root.clone();
    }
    if let Some(ref output) = args.output {
        info!(output = %output, "Overriding output folder from CLI");
        blueprint.output.folder = output.clone();
    }
    if args.copy_frames {
        blueprint.output.copy_frames = true;
    }

    info!(
        root = %blueprint.session.root.display(),
        sources = blueprint.sources.len(),
        reference = blueprint
            .reference_source()
            .map(|s| s.id.as_str())
            .unwrap_or("<none>"),
        output = %blueprint.output.folder,
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_batches: if args.max_batches == 0 {
            None
        } else {
            Some(args.max_batches)
        },
        resume: args.resume,
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        batches_assembled = stats.batches_assembled,
                        batches_encoded = stats.batches_encoded,
                        captures_accepted = stats.captures_accepted,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Still Syncer finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::SessionBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Session:");
    println!("  Root: {}", blueprint.session.root.display());
    println!("\nSources ({}):", blueprint.sources.len());
    for (index, source) in blueprint.sources.iter().enumerate() {
        let role = if index == 0 { " [reference]" } else { "" };
        println!(
            "  - {} -> {}{}",
            source.id,
            blueprint.source_path(source).display(),
            role
        );
    }
    println!("\nAlign:");
    println!(
        "  Underexposure threshold: {}",
        blueprint.align.underexposure_threshold
    );
    println!(
        "  Tolerance steps (s): {:?}",
        blueprint.align.tolerance_steps_s
    );
    println!("\nOutput:");
    println!("  Folder: {}", blueprint.output_path().display());
    println!("  Frame delay: {}ms", blueprint.output.frame_delay_ms);
    println!("  Copy frames: {}", blueprint.output.copy_frames);
    println!();
}
