use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use enroll_data::PinTableLoader;

/// Check a PIN lookup table before pointing the enrollment CLI at it.
///
/// The CSV file should have the following columns:
/// - pin_code: six-digit postal code
/// - city: city filled in for that code
/// - state: state filled in for that code
#[derive(Parser, Debug)]
#[command(name = "enroll-pins")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the PIN table
    #[arg(short, long)]
    file: PathBuf,

    /// Look up one PIN code in the table after loading it
    #[arg(short, long)]
    lookup: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Checking PIN table: {}", args.file.display());

    let directory = PinTableLoader::load_from_file(&args.file)
        .with_context(|| format!("Failed to load: {}", args.file.display()))?;

    println!("Table holds {} distinct PIN codes.", directory.len());

    if let Some(pin) = &args.lookup {
        match directory.lookup(pin) {
            Some(location) => println!("{pin}: {}, {}", location.city, location.state),
            None => bail!("PIN {pin} is not in the table"),
        }
    }

    Ok(())
}
