use clap::Args;
use lif_raw::{BlockSelector, LifFile};
use miette::{Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input LIF file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Only extract one block, by index or identifier
    #[arg(short, long, value_name = "BLOCK")]
    block: Option<String>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let lif = LifFile::open(&self.file).context(format!("path: {}", self.file.display()))?;
        let selector = self.block.as_deref().map(parse_selector);

        extract(&lif, selector, &self.directory, self.overwrite)?;
        Ok(())
    }
}

/// Write the selected block, or every block, into `directory`. Returns the written paths.
fn extract(
    lif: &LifFile,
    selector: Option<BlockSelector>,
    directory: &Path,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    let indices: Vec<usize> = match selector {
        Some(BlockSelector::Index(index)) => {
            lif.block(index)?;
            vec![index]
        }
        Some(BlockSelector::Identifier(identifier)) => vec![lif.index_for_identifier(&identifier)?],
        None => (0..lif.len()).collect(),
    };

    std::fs::create_dir_all(directory)
        .into_diagnostic()
        .context(format!("creating {}", directory.display()))?;

    let mut written = Vec::with_capacity(indices.len());
    for index in indices {
        let block = lif.block(index)?;
        let p = output_path(directory, index, &block.identifier);
        info!("writing {} ({} bytes)", p.display(), block.size);

        let data = lif.read_block(index)?;
        let mut out = if !overwrite {
            File::create_new(&p)
                .into_diagnostic()
                .context(format!("creating {}", &p.display()))?
        } else {
            File::create(&p)
                .into_diagnostic()
                .context(format!("creating {}", &p.display()))?
        };

        out.write_all(&data)
            .into_diagnostic()
            .context(format!("writing {}", &p.display()))?;
        written.push(p);
    }
    Ok(written)
}

/// A block given on the command line is an index when it parses as one.
fn parse_selector(block: &str) -> BlockSelector {
    match block.parse::<usize>() {
        Ok(index) => BlockSelector::Index(index),
        Err(_) => BlockSelector::from(block),
    }
}

/// Identifiers come from the file and may repeat, the index keeps names unique
/// and separators are replaced to stay inside the target directory.
fn output_path(directory: &Path, index: usize, identifier: &str) -> PathBuf {
    let name: String = identifier
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();
    directory.join(format!("{index}_{name}.bin"))
}
