// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Args;
use kdam::TqdmParallelIterator;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use cohull_core::constant;
use cohull_core::dist::convex_hulls_local;
use cohull_core::error::CohullError;
use cohull_core::im;
use cohull_core::ut;

#[derive(Debug, Args)]
#[command(about = "Compute the convex hull of every connected component in binary masks.")]
pub struct HullArgs {
    #[arg(short = 'i', long, help = "Mask or mask directory.", required = true)]
    pub mask: String,

    #[arg(short = 'o', long, help = "Output hulls file (.json) or directory.", required = true)]
    pub output: String,

    #[arg(
        short = 'w',
        long,
        help = "Number of workers sharing the hull computation per mask.",
        default_value = "1"
    )]
    pub workers: usize,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,

    #[arg(long, help = "Substring specifying masks (e.g. _mask).")]
    pub mask_substring: Option<String>,

    #[arg(short = 't', long, help = "Number of threads for processing mask directories.")]
    pub threads: Option<usize>,
}

pub fn hull(args: &HullArgs) {
    if let Some(threads) = args.threads {
        if threads < 1 {
            eprintln!(
                "[cohull::hull] ERROR: Threads must be set to a positive integer if provided."
            );
            std::process::exit(1);
        }

        if rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .is_err()
        {
            eprintln!("[cohull::hull] ERROR: Could not initialize the thread pool.");
            std::process::exit(1);
        }
    }

    if args.workers < 1 {
        eprintln!("[cohull::hull] ERROR: Workers must be set to a positive integer.");
        std::process::exit(1);
    }

    let mask_path = Path::new(&args.mask);
    let mut output = PathBuf::from(&args.output);

    let mask_extension = mask_path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    let output_extension = output
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    let is_mask_dir = if let Some(ext) = mask_extension {
        if !constant::SUPPORTED_IMAGE_FORMATS.contains(&ext.as_str()) {
            eprintln!(
                "[cohull::hull] ERROR: Invalid mask extension {}. Must be one of: {:?}.",
                ext,
                constant::SUPPORTED_IMAGE_FORMATS
            );
            std::process::exit(1);
        }
        false
    } else {
        true
    };

    if let Some(ext) = output_extension {
        if is_mask_dir {
            eprintln!(
                "[cohull::hull] ERROR: If mask input is a directory then output must be a directory."
            );
            std::process::exit(1);
        }

        if !constant::SUPPORTED_HULL_FORMATS.contains(&ext.as_str()) {
            eprintln!("[cohull::hull] ERROR: Invalid file extension. Must end with .json.");
            std::process::exit(1);
        }

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                eprintln!(
                    "[cohull::hull] ERROR: Invalid file path. Parent directory of output file path does not exist."
                );
                std::process::exit(1);
            }
        }

        match mask2hulls(mask_path, &output, args.workers) {
            Ok(n) => ut::track::progress_log(
                &format!(
                    "Complete. {} hulls written to {}.",
                    ut::track::thousands_format(n),
                    output.display()
                ),
                args.verbose,
            ),
            Err(err) => {
                eprintln!("[cohull::hull] ERROR: Failed to compute hulls. {}", err);
                std::process::exit(1);
            }
        }
    } else {
        if !is_mask_dir {
            eprintln!(
                "[cohull::hull] ERROR: If output is a directory then mask input must be a directory."
            );
            std::process::exit(1);
        }

        let mask_files = ut::path::collect_file_paths(
            mask_path,
            constant::SUPPORTED_IMAGE_FORMATS.as_slice(),
            args.mask_substring.as_deref(),
        )
        .unwrap_or_else(|err| {
            eprintln!("{}", err);
            std::process::exit(1);
        });

        if mask_files.is_empty() {
            eprintln!(
                "[cohull::hull] ERROR: No mask files were detected. Please check your path and/or substring identifier."
            );
            std::process::exit(1);
        }

        ut::track::progress_log(
            &format!(
                "Detected {} masks.",
                ut::track::thousands_format(mask_files.len())
            ),
            args.verbose,
        );

        output = ut::path::create_directory(&output).unwrap_or_else(|err| {
            eprintln!("[cohull::hull] ERROR: Could not create directory. {}", err);
            std::process::exit(1);
        });

        let pb = ut::track::progress_bar(mask_files.len(), "Computing hulls", args.verbose);

        let hulls: Mutex<usize> = Mutex::new(0);
        let error: Mutex<Vec<usize>> = Mutex::new(Vec::with_capacity(mask_files.len()));

        (0..mask_files.len())
            .into_par_iter()
            .tqdm_with_bar(pb)
            .for_each(|idx| {
                let output_path = ut::path::output_path(&mask_files[idx], &output, "json");
                match mask2hulls(&mask_files[idx], &output_path, args.workers) {
                    Ok(n) => {
                        if let Ok(mut hulls) = hulls.lock() {
                            *hulls += n;
                        }
                    }
                    Err(_) => {
                        if let Ok(mut error) = error.lock() {
                            error.push(idx);
                        }
                    }
                }
            });

        let hulls = hulls.into_inner().unwrap_or_default();
        let error = error.into_inner().unwrap_or_default();

        if args.verbose {
            println!()
        }

        let message = if !error.is_empty() {
            format!(
                "Complete. {} hulls from {} masks. {} masks failed.",
                ut::track::thousands_format(hulls),
                ut::track::thousands_format(mask_files.len() - error.len()),
                ut::track::thousands_format(error.len())
            )
        } else {
            format!(
                "Complete. {} hulls from {} masks.",
                ut::track::thousands_format(hulls),
                ut::track::thousands_format(mask_files.len()),
            )
        };

        ut::track::progress_log(&message, args.verbose);
    }
}

/// Label a mask, compute its hulls on a worker group and save them as json
fn mask2hulls(mask_path: &Path, output_path: &Path, workers: usize) -> Result<usize, CohullError> {
    let grid = im::open_mask(mask_path)?;
    let (width, height) = (grid.width(), grid.height());

    let hulls = im::Hulls::new(width, height, convex_hulls_local(grid, workers)?)?;
    hulls.save(output_path)?;

    Ok(hulls.len())
}
