// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::CohullError;

/// Create a directory, appending an incrementing suffix if it already exists
///
/// # Arguments
///
/// * `directory` - Path to new directory - existing directories are kept
///
/// # Examples
///
/// ```
/// use cohull_core::ut::path::create_directory;
///
/// let base = std::env::temp_dir().join("COHULL_CREATE_DIRECTORY");
/// let _ = std::fs::remove_dir(&base);
/// let _ = std::fs::remove_dir(base.with_file_name("COHULL_CREATE_DIRECTORY_0"));
///
/// let first = create_directory(&base).unwrap();
/// let second = create_directory(&base).unwrap();
///
/// assert_eq!(first, base);
/// assert_eq!(second, base.with_file_name("COHULL_CREATE_DIRECTORY_0"));
///
/// std::fs::remove_dir(first).unwrap();
/// std::fs::remove_dir(second).unwrap();
/// ```
pub fn create_directory<P: AsRef<Path>>(directory: P) -> Result<PathBuf, CohullError> {
    let directory = directory.as_ref();

    if !directory.exists() {
        std::fs::create_dir_all(directory).map_err(|err| CohullError::DirError(err.to_string()))?;
        return Ok(directory.to_path_buf());
    }

    let base_name = directory
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CohullError::DirError("Invalid directory name".to_string()))?;

    for index in 0..30 {
        let candidate = directory.with_file_name(format!("{}_{}", base_name, index));

        if !candidate.exists() {
            std::fs::create_dir(&candidate).map_err(|err| CohullError::DirError(err.to_string()))?;
            return Ok(candidate);
        }
    }

    Err(CohullError::DirError(format!(
        "Could not create a directory in alotted increments. Check the directory path: {}",
        directory.display()
    )))
}

/// Collect mask paths from a directory with an optional substring filter
///
/// Paths are returned sorted so batch outputs are produced in a stable order.
///
/// # Arguments
///
/// * `directory` - Path to directory containing masks
/// * `valid_ext` - Lowercase extensions to keep
/// * `substring` - Only include files whose name contains this substring
///
/// # Examples
///
/// ```no_run
/// use cohull_core::constant::SUPPORTED_IMAGE_FORMATS;
/// use cohull_core::ut::path::collect_file_paths;
/// let files = collect_file_paths("masks/", SUPPORTED_IMAGE_FORMATS.as_slice(), None);
/// ```
pub fn collect_file_paths<P: AsRef<Path>>(
    directory: P,
    valid_ext: &[&str],
    substring: Option<&str>,
) -> Result<Vec<PathBuf>, CohullError> {
    let directory = directory.as_ref();

    let entries: Vec<PathBuf> = std::fs::read_dir(directory)
        .map_err(|err| CohullError::DirError(format!("{}: {}", directory.display(), err)))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();

    let mut files: Vec<PathBuf> = entries
        .into_par_iter()
        .filter(|path| {
            let has_ext = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| valid_ext.contains(&ext.to_lowercase().as_str()));

            let has_substring = substring.is_none_or(|s| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.contains(s))
            });

            path.is_file() && has_ext && has_substring
        })
        .collect();

    files.sort();

    Ok(files)
}

/// Output path for a mask inside an output directory with a new extension
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cohull_core::ut::path::output_path;
///
/// let path = output_path(Path::new("masks/cell_01.png"), Path::new("out"), "json");
/// assert_eq!(path, Path::new("out/cell_01.json"));
/// ```
pub fn output_path(mask_path: &Path, output_dir: &Path, extension: &str) -> PathBuf {
    let stem = mask_path.file_stem().unwrap_or(mask_path.as_os_str());
    output_dir.join(stem).with_extension(extension)
}
