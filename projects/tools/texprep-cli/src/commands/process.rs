use crate::error::CliError;
use crate::util::{
    canonicalize_cli_path, describe_report, existing_cli_path, find_all_files,
    format_throughput, output_path_for, parse_histogram_mode, parse_texture_type,
};
use argh::FromArgs;
use bytesize::ByteSize;
use log::error;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use texprep_common::TextureType;
use texprep_histogram::HistogramMode;
use texprep_pipeline::{CommandCompressor, Orchestrator, PipelineConfig, TextureJob};

#[derive(FromArgs, Debug)]
/// Generate mips, normalize and compress every image in a directory into KTX2 files
#[argh(subcommand, name = "process")]
pub struct ProcessCmd {
    /// input directory path
    #[argh(option, from_str_fn(existing_cli_path))]
    pub input: PathBuf,

    /// output directory path
    #[argh(option, from_str_fn(canonicalize_cli_path))]
    pub output: PathBuf,

    /// compressor command line, e.g. "toktx --t2 {output} {inputs}"
    #[argh(option)]
    pub compressor: String,

    /// JSON preset file with pipeline settings
    #[argh(option)]
    pub preset: Option<PathBuf>,

    /// worker threads [default: one per core]
    #[argh(option)]
    pub threads: Option<usize>,

    /// force a texture type instead of guessing from file names
    #[argh(option, from_str_fn(parse_texture_type))]
    pub texture_type: Option<TextureType>,

    /// histogram normalization: off, percentile, knee
    #[argh(option, from_str_fn(parse_histogram_mode))]
    pub histogram: Option<HistogramMode>,

    /// directory for per-level images [default: next to each output]
    #[argh(option)]
    pub intermediate_dir: Option<PathBuf>,

    /// keep per-level images after compression
    #[argh(switch)]
    pub keep_intermediate: bool,
}

impl ProcessCmd {
    /// The preset, or defaults, with command line overrides applied.
    pub fn config(&self) -> Result<PipelineConfig, CliError> {
        let mut config = match &self.preset {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if self.texture_type.is_some() {
            config.texture_type = self.texture_type;
        }
        if let Some(mode) = self.histogram {
            config.histogram.mode = mode;
        }
        if self.intermediate_dir.is_some() {
            config.intermediate_dir = self.intermediate_dir.clone();
        }
        config.keep_intermediate_files |= self.keep_intermediate;
        Ok(config)
    }
}

pub fn handle_process_command(cmd: ProcessCmd) -> Result<(), Box<dyn std::error::Error>> {
    let config = cmd.config()?;
    let compressor = CommandCompressor::parse(&cmd.compressor)?;

    let mut sources = Vec::new();
    find_all_files(&cmd.input, &mut sources)?;

    if sources.is_empty() {
        println!("No images found in input directory.");
        return Ok(());
    }

    println!("Found {} images to process\n", sources.len());

    let jobs = create_jobs(&sources, &cmd.input, &cmd.output);
    let bytes_in: u64 = sources
        .iter()
        .filter_map(|p| fs::metadata(p).ok())
        .map(|m| m.len())
        .sum();

    let start = Instant::now();
    let orchestrator = Orchestrator::new(config, compressor);
    let results = orchestrator.process_batch(&jobs)?;
    let elapsed = start.elapsed();

    let mut bytes_out = 0;
    let mut patched = 0;
    let mut failed = 0;
    for (job, result) in jobs.iter().zip(&results) {
        match result {
            Ok(report) => {
                println!("{}", describe_report(report));
                bytes_out += report.output_bytes;
                patched += usize::from(report.patch.is_some());
            }
            Err(e) => {
                error!("{}: {e}", job.source.display());
                failed += 1;
            }
        }
    }

    println!("\n=== Processing Complete ===");
    println!("Textures: {} ok, {failed} failed", results.len() - failed);
    println!("With recovery metadata: {patched}");
    println!("Time taken: {elapsed:.2?}");
    println!("Source data: {}", ByteSize(bytes_in));
    println!("Output data: {}", ByteSize(bytes_out));
    println!("Throughput: {}", format_throughput(bytes_in, elapsed));

    if failed > 0 {
        return Err(CliError::BatchFailed {
            failed,
            total: results.len(),
        }
        .into());
    }
    Ok(())
}

/// One job per source, mirroring the input tree under `output_dir`.
pub fn create_jobs(sources: &[PathBuf], input_dir: &Path, output_dir: &Path) -> Vec<TextureJob> {
    sources
        .iter()
        .map(|source| TextureJob::new(source, output_path_for(input_dir, output_dir, source)))
        .collect()
}
