// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

use std::path::Path;

use clap::Args;

use cohull_core::cv;
use cohull_core::im;
use cohull_core::ut;

#[derive(Debug, Args)]
#[command(about = "Label connected components of a binary mask and write a 16-bit label map.")]
pub struct LabelArgs {
    #[arg(short = 'i', long, help = "Mask image.", required = true)]
    pub mask: String,

    #[arg(short = 'o', long, help = "Output label map (.png or .tif).", required = true)]
    pub output: String,

    #[arg(short = 'p', long, help = "Print the label map to stdout.")]
    pub print: bool,

    #[arg(short = 'v', long, help = "Verbose output.")]
    pub verbose: bool,
}

pub fn label(args: &LabelArgs) {
    let output = Path::new(&args.output);

    let output_extension = output
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase());

    if !output_extension.is_some_and(|ext| ["png", "tif", "tiff"].contains(&ext.as_str())) {
        eprintln!("[cohull::label] ERROR: Invalid file extension. Must end with .png, .tif or .tiff.");
        std::process::exit(1);
    }

    let mut grid = im::open_mask(&args.mask).unwrap_or_else(|err| {
        eprintln!("[cohull::label] ERROR: {}", err);
        std::process::exit(1);
    });

    ut::track::progress_log(
        &format!("Labeling {} x {} mask.", grid.width(), grid.height()),
        args.verbose,
    );

    let count = cv::label_components(&mut grid);

    ut::track::progress_log(
        &format!(
            "Detected {} components.",
            ut::track::thousands_format(count)
        ),
        args.verbose,
    );

    if args.print {
        print!("{}", grid);
    }

    if let Err(err) = im::save_label_map(&grid, output) {
        eprintln!("[cohull::label] ERROR: {}", err);
        std::process::exit(1);
    }
}
