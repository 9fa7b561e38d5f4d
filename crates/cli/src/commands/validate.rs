//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    root: String,
    source_count: usize,
    reference_source: String,
    output_folder: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    root: blueprint.session.root.display().to_string(),
                    source_count: blueprint.sources.len(),
                    reference_source: blueprint
                        .reference_source()
                        .map(|s| s.id.clone())
                        .unwrap_or_default(),
                    output_folder: blueprint.output.folder.clone(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect non-fatal configuration concerns
fn collect_warnings(blueprint: &contracts::SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Some(&widest) = blueprint.align.tolerance_steps_s.last() {
        if widest > 10 {
            warnings.push(format!(
                "widest tolerance of {widest}s is unusually wide; distant frames may get grouped"
            ));
        }
    }

    if blueprint.align.underexposure_threshold > 300 {
        warnings.push(format!(
            "underexposure threshold {} discards all but bright frames (channel-sum max is 765)",
            blueprint.align.underexposure_threshold
        ));
    }

    if !blueprint.session.root.is_absolute() {
        warnings.push(format!(
            "session root '{}' is relative; resolution depends on the working directory",
            blueprint.session.root.display()
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✅ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\nSummary:");
            println!("  Version: {}", summary.version);
            println!("  Root: {}", summary.root);
            println!(
                "  Sources: {} (reference: {})",
                summary.source_count, summary.reference_source
            );
            println!("  Output folder: {}", summary.output_folder);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\nWarnings:");
            for warning in warnings {
                println!("  ⚠️  {}", warning);
            }
        }
    } else {
        println!("❌ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\nError: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_validate_good_config() {
        let file = write_config(
            r#"
[session]
root = "/data/shoot"

[[sources]]
id = "cam1"
folder = "1"

[[sources]]
id = "cam2"
folder = "2"
"#,
        );

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(result.valid);
        assert_eq!(result.summary.unwrap().source_count, 2);
    }

    #[test]
    fn test_validate_missing_file() {
        let args = ValidateArgs {
            config: "/nonexistent/config.toml".into(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_warning_on_relative_root() {
        let file = write_config(
            r#"
[session]
root = "shoot"

[[sources]]
id = "cam1"
folder = "1"

[[sources]]
id = "cam2"
folder = "2"
"#,
        );

        let args = ValidateArgs {
            config: file.path().to_path_buf(),
            json: false,
        };
        let result = validate_config(&args);
        assert!(result.valid);
        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("relative")));
    }
}
