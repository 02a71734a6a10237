pub mod verify;

pub use cflp_reader as reader;
pub use verify::solution;

use cflp_reader::{Instance, InstanceReader};
use log::{info, warn};
use solution::Solution;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use verify::Report;

pub fn read<T: FromStr<Err = String>>(path: &Path) -> Result<T, String> {
    let f = read_to_string(path).map_err(|x| format!("{}: {x}", path.display()))?;

    T::from_str(&f)
}

/// Instance file a solution refers to: `instances_loc` itself when it is a file,
/// otherwise the file named in the solution inside that directory.
pub fn instance_path(solution: &Solution, instances_loc: &Path) -> PathBuf {
    if instances_loc.is_dir() {
        instances_loc.join(&solution.instance_name)
    } else {
        instances_loc.to_path_buf()
    }
}

pub fn check_solution_file(
    path: &Path,
    instances_loc: &Path,
    reader: &InstanceReader,
) -> Result<Report, String> {
    let solution = read::<Solution>(path)?;
    let instance_path = instance_path(&solution, instances_loc);

    info!("checking {} against {}", path.display(), instance_path.display());

    let instance = reader
        .read(&instance_path)
        .map_err(|x| format!("{}: {x}", instance_path.display()))?;

    verify::report(&instance, &solution)
}

/// Loads every instance under `paths`, walking directories.
/// Unreadable directory entries are logged and skipped.
pub fn read_instances(
    paths: &[PathBuf],
    reader: &InstanceReader,
) -> Vec<(PathBuf, Result<Instance, cflp_reader::Error>)> {
    let mut read = vec![];

    for path in paths {
        for entry in walkdir::WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() => {
                    let instance = reader.read(e.path());
                    read.push((e.into_path(), instance));
                }
                Ok(_) => {}
                Err(err) => warn!("{err}"),
            }
        }
    }

    info!("read {} instances", read.len());

    read
}
