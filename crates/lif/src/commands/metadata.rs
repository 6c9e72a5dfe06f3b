use clap::Args;
use lif_raw::LifFile;
use miette::{Context, Result};
use std::path::PathBuf;

#[derive(Args)]
pub struct MetadataArgs {
    /// An input LIF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl MetadataArgs {
    pub fn handle(&self) -> Result<()> {
        let lif = LifFile::open(&self.file).context(format!("path: {}", self.file.display()))?;
        println!("{}", lif.metadata().source());
        Ok(())
    }
}
