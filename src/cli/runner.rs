use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use stac_sentinel::api::{transform_directory_to_path, transform_path};
use stac_sentinel::io::writers::save_item;
use stac_sentinel::{Collection, TransformParams};

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values, overridden by any flags given on the command line
fn resolve_params(args: &CliArgs) -> Result<TransformParams, AppError> {
    let mut params = match &args.config {
        Some(path) => TransformParams::from_path(path)?,
        None => TransformParams::default(),
    };
    if let Some(base_url) = &args.base_url {
        params.base_url = base_url.clone();
    }
    if let Some(mapping) = args.mapping {
        params.mapping = mapping;
    }
    if let Some(grid) = &args.grid {
        params.grid_path = Some(grid.clone());
    }
    if args.no_sun_angles {
        params.sun_angles = false;
    }
    Ok(params)
}

fn process_single_file(
    collection: Collection,
    input: &Path,
    save: Option<&Path>,
    params: &TransformParams,
) -> Result<(), AppError> {
    let item = transform_path(collection, input, params)?;
    match save {
        Some(dir) => {
            let path = save_item(&item, dir)?;
            info!("Successfully transformed: {:?} -> {:?}", input, path);
        }
        None => {
            let json = serde_json::to_string_pretty(&item).map_err(stac_sentinel::Error::from)?;
            println!("{}", json);
        }
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    let params = resolve_params(&args)?;
    info!(
        "Collection {} (mapping: {}, base URL: {:?})",
        args.collection, params.mapping, params.base_url
    );

    match (&args.input, &args.input_dir) {
        (Some(_), Some(_)) => Err(AppError::ConflictingArguments {
            first: "--input".to_string(),
            second: "--input-dir".to_string(),
        }
        .into()),
        (None, Some(input_dir)) => {
            let output_dir = args.save.as_deref().ok_or(AppError::MissingArgument {
                arg: "--save".to_string(),
            })?;
            info!("Starting batch transform from directory: {:?}", input_dir);
            info!("Output directory: {:?}", output_dir);

            let report =
                transform_directory_to_path(args.collection, input_dir, output_dir, &params, true)?;

            info!("Processed: {}", report.processed);
            info!("Skipped: {}", report.skipped);
            info!("Errors: {}", report.errors);
            if report.errors > 0 {
                return Err(AppError::BatchFailed {
                    errors: report.errors,
                }
                .into());
            }
            Ok(())
        }
        (Some(input), None) => {
            process_single_file(args.collection, input, args.save.as_deref(), &params)?;
            Ok(())
        }
        (None, None) => Err(AppError::MissingArgument {
            arg: "--input or --input-dir".to_string(),
        }
        .into()),
    }
}
