use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::Output;
use crate::fixtures::{self, FixtureSpec};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Directory to write the archives into (created if missing)
    #[arg(short, long, default_value = ".")]
    pub dir: PathBuf,

    /// Number of archives
    #[arg(short, long, default_value_t = FixtureSpec::default().archives)]
    pub archives: usize,

    /// Records per archive
    #[arg(short, long, default_value_t = FixtureSpec::default().records_per_archive)]
    pub records: usize,
}

pub fn execute(args: GenerateArgs, output: &Output) -> Result<()> {
    let spec = FixtureSpec {
        archives: args.archives,
        records_per_archive: args.records,
    };

    output.step(&format!(
        "Writing {} archives with {} records each to {}",
        spec.archives,
        spec.records_per_archive,
        args.dir.display()
    ));

    let paths = fixtures::generate(&mut rand::rng(), &args.dir, spec)?;
    for path in &paths {
        output.verbose(&path.display().to_string());
    }

    output.success(&format!("Generated {} archives", paths.len()));
    Ok(())
}
