use std::fs::{canonicalize, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::bail;
use arcstr::ArcStr;
use clap::Parser;
use serde::Serialize;

use crate::cli::args::Args;
use crate::cli::progress::{StepContext, TaskKey};
use crate::config::parse_job_config;
use crate::data::GenCtx;
use crate::layout::Master;
use crate::paths::out_json;
use crate::registry::generate;

pub mod args;
pub mod progress;

pub const BANNER: &str = r"
     _      _            _ _
 ___| |_ __| | ___ ___| | | __ _  ___ _ __
/ __| __/ _` |/ __/ _ \ | |/ _` |/ _ \ '_ \
\__ \ || (_| | (_|  __/ | | (_| |  __/ | | |
|___/\__\__,_|\___\___|_|_|\__, |\___|_| |_|
                           |___/

STDCELLGEN v0.1
";

/// Layout data written for one job: the requested cell and every cell it depends on.
#[derive(Debug, Serialize)]
pub struct Artifacts<'a> {
    pub top: &'a ArcStr,
    pub masters: Vec<&'a Master>,
}

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    println!("{BANNER}");
    let out = run_job(&args.config, args.output_dir.as_deref())?;
    println!("\nArtifacts saved to: {:?}\n", &out);
    Ok(())
}

/// Generates the cell described by the job file at `config` and writes its
/// layout data as JSON.
///
/// Returns the path of the JSON file.
pub fn run_job(config: &Path, output_dir: Option<&Path>) -> anyhow::Result<PathBuf> {
    if !config.is_file() {
        bail!("configuration file {:?} does not exist", config);
    }
    let config_path = canonicalize(config)?;

    println!("Reading configuration file...\n");
    let job = parse_job_config(&config_path)?;

    println!("Configuration file: {:?}", &config_path);
    println!("Cell parameters:");
    println!("\tGenerator: {}", job.cell.kind);
    println!("\tParameters: {}\n", job.cell.params);

    let mut steps = StepContext::new();
    let mut ctx = steps.check(GenCtx::new(job.tech))?;
    steps.finish(TaskKey::LoadTech);
    let top = steps.check(generate(&mut ctx, job.cell.kind, &job.cell.params))?;
    steps.finish(TaskKey::GenerateLayout);

    let work_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from(top.cell_name().as_str()),
    };
    let path = steps.check(write_artifacts(&ctx, &top, &work_dir))?;
    steps.finish(TaskKey::WriteLayout);

    Ok(path)
}

fn write_artifacts(ctx: &GenCtx, top: &Master, work_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(work_dir)?;
    let work_dir = canonicalize(work_dir)?;

    let artifacts = Artifacts {
        top: top.cell_name(),
        masters: ctx.masters().iter().map(|m| m.as_ref()).collect(),
    };
    let path = out_json(&work_dir, top.cell_name());
    let mut file = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut file, &artifacts)?;
    file.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_job_writes_masters() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("job.toml");
        let mut file = File::create(&config).unwrap();
        writeln!(file, "[cell]\nkind = \"flop_ck2\"\n\n[cell.params]\nseg = 2").unwrap();
        drop(file);

        let out_dir = dir.path().join("out");
        let path = run_job(&config, Some(&out_dir)).unwrap();
        assert_eq!(path.file_name().unwrap(), "flop_ck2_2x.json");

        let data: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(data["top"], "flop_ck2_2x");
        let names: Vec<_> = data["masters"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["cell_name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names.last().map(String::as_str), Some("flop_ck2_2x"));
        assert!(names.iter().any(|n| n.starts_with("latch_ck2")));
    }

    #[test]
    fn test_run_job_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_job(&dir.path().join("missing.toml"), Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
