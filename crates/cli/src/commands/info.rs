//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    session: SessionInfo,
    sources: Vec<SourceInfo>,
    align: AlignInfo,
    output: OutputInfo,
}

#[derive(Serialize)]
struct SessionInfo {
    root: String,
}

#[derive(Serialize)]
struct SourceInfo {
    id: String,
    folder: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resolved_path: Option<String>,
    reference: bool,
}

#[derive(Serialize)]
struct AlignInfo {
    underexposure_threshold: u32,
    tolerance_steps_s: Vec<u32>,
}

#[derive(Serialize)]
struct OutputInfo {
    folder: String,
    frame_delay_ms: u64,
    quality: u8,
    copy_frames: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Reading configuration");

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let config_info = ConfigInfo {
        version: format!("{:?}", blueprint.version),
        session: SessionInfo {
            root: blueprint.session.root.display().to_string(),
        },
        sources: blueprint
            .sources
            .iter()
            .enumerate()
            .map(|(index, source)| SourceInfo {
                id: source.id.clone(),
                folder: source.folder.clone(),
                resolved_path: args
                    .sources
                    .then(|| blueprint.source_path(source).display().to_string()),
                reference: index == 0,
            })
            .collect(),
        align: AlignInfo {
            underexposure_threshold: blueprint.align.underexposure_threshold,
            tolerance_steps_s: blueprint.align.tolerance_steps_s.clone(),
        },
        output: OutputInfo {
            folder: blueprint.output.folder.clone(),
            frame_delay_ms: blueprint.output.frame_delay_ms,
            quality: blueprint.output.quality,
            copy_frames: blueprint.output.copy_frames,
            width: blueprint.output.width,
            height: blueprint.output.height,
        },
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&config_info).context("Failed to serialize info")?;
        println!("{}", json);
    } else {
        print_info(&config_info);
    }

    Ok(())
}

fn print_info(info: &ConfigInfo) {
    println!("\n=== Session Configuration ===\n");
    println!("Version: {}", info.version);
    println!("Root: {}", info.session.root);

    println!("\nSources ({}):", info.sources.len());
    for source in &info.sources {
        let role = if source.reference { " [reference]" } else { "" };
        match &source.resolved_path {
            Some(path) => println!("  - {} ({}) -> {}{}", source.id, source.folder, path, role),
            None => println!("  - {} ({}){}", source.id, source.folder, role),
        }
    }

    println!("\nAlign:");
    println!(
        "  Underexposure threshold: {}",
        info.align.underexposure_threshold
    );
    println!("  Tolerance steps (s): {:?}", info.align.tolerance_steps_s);

    println!("\nOutput:");
    println!("  Folder: {}", info.output.folder);
    println!("  Frame delay: {}ms", info.output.frame_delay_ms);
    println!("  Quality: {}", info.output.quality);
    println!("  Copy frames: {}", info.output.copy_frames);
    if let (Some(width), Some(height)) = (info.output.width, info.output.height) {
        println!("  Size: {}x{}", width, height);
    }
    println!();
}
