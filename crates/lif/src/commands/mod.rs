pub mod extract;
pub mod info;
pub mod metadata;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// List the blocks and memory references of a LIF file
    Info(info::InfoArgs),
    /// Print the metadata document of a LIF file
    Metadata(metadata::MetadataArgs),
    /// Extract the binary blocks of a LIF file into a directory
    Extract(extract::ExtractArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Info(info) => info.handle(),
            Commands::Metadata(metadata) => metadata.handle(),
            Commands::Extract(extract) => extract.handle(),
        }
    }
}
