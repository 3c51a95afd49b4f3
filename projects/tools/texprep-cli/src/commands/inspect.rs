use crate::util::{describe_coefficients, describe_layout, existing_cli_path};
use argh::FromArgs;
use std::path::PathBuf;
use texprep_ktx2::{read_layout_file, read_metadata_file};
use texprep_metadata::{decode_metadata, METADATA_KEY};

#[derive(FromArgs, Debug)]
/// Print a KTX2 file's layout and any embedded recovery coefficients
#[argh(subcommand, name = "inspect")]
pub struct InspectCmd {
    /// KTX2 file to inspect
    #[argh(positional, from_str_fn(existing_cli_path))]
    pub file: PathBuf,

    /// key/value entry holding the metadata [default: texprep.histogram]
    #[argh(option, default = "METADATA_KEY.to_string()")]
    pub key: String,
}

pub fn handle_inspect_command(cmd: InspectCmd) -> Result<(), Box<dyn std::error::Error>> {
    let layout = read_layout_file(&cmd.file)?;
    println!("=== {} ===", cmd.file.display());
    for line in describe_layout(&layout) {
        println!("{line}");
    }

    println!();
    let Some(value) = read_metadata_file(&cmd.file, &cmd.key)? else {
        println!("No '{}' entry.", cmd.key);
        return Ok(());
    };
    match decode_metadata(&value)? {
        Some(metadata) => {
            println!("'{}' ({} bytes)", cmd.key, value.len());
            for line in describe_coefficients(&metadata) {
                println!("{line}");
            }
        }
        None => println!(
            "'{}' ({} bytes) has no recovery coefficients.",
            cmd.key,
            value.len()
        ),
    }
    Ok(())
}
