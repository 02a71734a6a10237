use cflp_verifier::reader::{InstanceReader, ReadOptions};
use cflp_verifier::{check_solution_file, read_instances};
use clap::{Parser, Subcommand};
use log::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Reads capacitated facility location instances and checks solutions.
///
/// Set RUST_LOG (e.g. to info) to enable logging to stderr.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Reject cost rows that do not hold one value per depot
    #[arg(long, global = true)]
    strict: bool,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize instance files (directories are searched recursively)
    Show {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Check a solution and print its cost
    Check {
        solution_path: PathBuf,
        /// Instance file, or directory holding the instance named in the solution
        #[arg(long, default_value = ".")]
        instances: PathBuf,
    },
}

fn show(paths: &[PathBuf], reader: &InstanceReader, json: bool) -> Result<(), String> {
    let mut failed = 0;

    for (path, instance) in read_instances(paths, reader) {
        match instance {
            Ok(inst) if json => println!(
                "{}",
                serde_json::to_string(&inst).map_err(|x| x.to_string())?
            ),
            Ok(inst) => println!(
                "{} {} {} {} {}",
                path.display(),
                inst.num_depots,
                inst.num_customers,
                inst.total_capacity(),
                inst.total_demand()
            ),
            Err(err) => {
                error!("{}: {err}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        Err(format!("{failed} instances could not be read"))?;
    }

    Ok(())
}

fn check(
    solution_path: &Path,
    instances: &Path,
    reader: &InstanceReader,
    json: bool,
) -> Result<(), String> {
    let report = check_solution_file(solution_path, instances, reader)?;

    if json {
        println!(
            "{}",
            serde_json::to_string(&report).map_err(|x| x.to_string())?
        );
    } else {
        println!(
            "{} {} {}",
            report.instance_name,
            report.open_depots.len(),
            report.total_cost.to_f64()
        );
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    let reader = InstanceReader::with_options(ReadOptions {
        check_row_width: args.strict,
    });

    let res = match &args.command {
        Command::Show { paths } => show(paths, &reader, args.json),
        Command::Check {
            solution_path,
            instances,
        } => check(solution_path, instances, &reader, args.json),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
