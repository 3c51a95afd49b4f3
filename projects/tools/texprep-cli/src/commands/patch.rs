use crate::error::CliError;
use crate::util::existing_cli_path;
use argh::FromArgs;
use std::{fs, path::PathBuf};
use texprep_ktx2::insert_metadata_file;
use texprep_metadata::{decode_metadata, METADATA_KEY};

#[derive(FromArgs, Debug)]
/// Embed a metadata file into an existing KTX2 file
#[argh(subcommand, name = "patch")]
pub struct PatchCmd {
    /// KTX2 file to patch in place
    #[argh(positional, from_str_fn(existing_cli_path))]
    pub file: PathBuf,

    /// file holding the encoded metadata blocks
    #[argh(option, from_str_fn(existing_cli_path))]
    pub metadata: PathBuf,

    /// key/value entry to create [default: texprep.histogram]
    #[argh(option, default = "METADATA_KEY.to_string()")]
    pub key: String,

    /// embed the value even if it holds no recovery coefficients
    #[argh(switch)]
    pub raw: bool,
}

pub fn handle_patch_command(cmd: PatchCmd) -> Result<(), Box<dyn std::error::Error>> {
    let value = fs::read(&cmd.metadata)?;
    if !cmd.raw && decode_metadata(&value)?.is_none() {
        return Err(CliError::NoCoefficients(cmd.metadata).into());
    }

    let summary = insert_metadata_file(&cmd.file, &cmd.key, &value)?;

    println!("=== Patch Complete ===");
    println!("Entry '{}': {} bytes", cmd.key, summary.entry_length);
    println!(
        "Inserted {} bytes at offset {}",
        summary.inserted_length, summary.insertion_point
    );
    println!(
        "Shifted {} level(s){}",
        summary.levels_shifted,
        if summary.sgd_shifted { " and the SGD" } else { "" }
    );
    Ok(())
}
