// Copyright (c) 2025, Tom Ouellette
// Licensed under the BSD 3-Clause License

// All currently supported mask formats
pub const SUPPORTED_IMAGE_FORMATS: [&str; 17] = [
    "avif", "bmp", "dds", "hdr", "ico", "jpeg", "jpg", "exr", "png", "pbm", "pgm", "ppm", "qoi",
    "tga", "tif", "tiff", "webp",
];

// Formats accepted for hull output files
pub const SUPPORTED_HULL_FORMATS: [&str; 1] = ["json"];

// Rank of the coordinating worker that labels, scatters and gathers
pub const ROOT: usize = 0;

// Label reserved for background/unassigned pixels
pub const BACKGROUND: i32 = 0;
