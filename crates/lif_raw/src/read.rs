//! Types for reading LIF files
//!

use derive_more::Display;
use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::{Path, PathBuf},
};
use tracing::{debug, error, info, warn};
use xmltree::Element;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{
    error::{BlockNotFoundError, Error, Result},
    metadata::{MemoryBlock, MetadataDocument},
    types::{read_utf16, BinaryBlockHeader, BlockHeader, CommonBlockHeader, MetadataBlockHeader},
};

/// Kinds of files written by Leica software, told apart by extension
#[derive(Display, Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileKind {
    /// Single file container, the only kind this crate reads
    #[display("Leica Image File")]
    Lif,
    /// Object file referenced by extended containers
    #[display("Leica Object File")]
    Lof,
    /// Extended image file
    #[display("Extended Leica Image File")]
    Xlif,
    /// Extended project file
    #[display("Extended Leica File")]
    Xlef,
}

impl FileKind {
    /// Every known kind
    pub const ALL: [FileKind; 4] = [FileKind::Lif, FileKind::Lof, FileKind::Xlif, FileKind::Xlef];

    /// Extension of this kind, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Lif => "lif",
            FileKind::Lof => "lof",
            FileKind::Xlif => "xlif",
            FileKind::Xlef => "xlef",
        }
    }

    /// Human readable name of this kind
    pub fn description(&self) -> String {
        self.to_string()
    }

    /// Identify a path by its extension. Matching is case sensitive.
    pub fn from_path(path: &Path) -> Option<FileKind> {
        let extension = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|k| k.extension() == extension)
    }
}

/// Location of a binary block inside the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BinaryBlock {
    /// Size of the payload in bytes
    pub size: u64,
    /// Offset of the first payload byte from the start of the file
    pub offset: u64,
    /// Identifier of the block
    pub identifier: String,
}

impl BinaryBlock {
    /// Read the payload of this block from `reader`.
    pub fn read_data<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        reader.seek(SeekFrom::Start(self.offset))?;

        let mut data = Vec::new();
        reader.take(self.size).read_to_end(&mut data)?;
        if (data.len() as u64) < self.size {
            return Err(Error::Truncated {
                offset: self.offset,
                needed: self.size,
            });
        }
        Ok(data)
    }
}

/// Selects a block by its position in the file or by its identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSelector {
    /// Zero based position in file order
    Index(usize),
    /// Identifier carried by exactly one block
    Identifier(String),
}

impl From<usize> for BlockSelector {
    fn from(value: usize) -> Self {
        BlockSelector::Index(value)
    }
}

impl From<&str> for BlockSelector {
    fn from(value: &str) -> Self {
        BlockSelector::Identifier(value.to_owned())
    }
}

impl From<String> for BlockSelector {
    fn from(value: String) -> Self {
        BlockSelector::Identifier(value)
    }
}

/// Result of walking a LIF file: the metadata document and the block list
#[derive(Debug, Clone)]
pub struct Container {
    metadata: MetadataDocument,
    blocks: Vec<BinaryBlock>,
}

impl Container {
    /// Walk a LIF file of `len` bytes from the start of `reader`.
    ///
    /// Payloads are skipped, only their location is kept.
    pub fn read<R: Read + Seek>(reader: &mut R, len: u64) -> Result<Container> {
        reader.seek(SeekFrom::Start(0))?;

        let metadata = Self::read_metadata(reader, len)?;

        let mut blocks = Vec::new();
        while reader.stream_position()? < len {
            blocks.push(Self::read_binary_block(reader, len)?);
        }

        Ok(Container { metadata, blocks })
    }

    /// The metadata document
    pub fn metadata(&self) -> &MetadataDocument {
        &self.metadata
    }

    /// The binary blocks in file order
    pub fn blocks(&self) -> &[BinaryBlock] {
        &self.blocks
    }

    fn read_metadata<R: Read + Seek>(reader: &mut R, len: u64) -> Result<MetadataDocument> {
        let common = CommonBlockHeader::read_from(reader)?;
        let header = MetadataBlockHeader::read_from(reader)?;
        debug!(
            "metadata block: header size {}, {} chars",
            common.header_size, header.chars
        );

        let chars = Self::ensure_text(reader, header.chars, len)?;
        MetadataDocument::parse(read_utf16(reader, chars)?)
    }

    fn read_binary_block<R: Read + Seek>(reader: &mut R, len: u64) -> Result<BinaryBlock> {
        CommonBlockHeader::read_from(reader)?;
        let header = BinaryBlockHeader::read_from(reader)?;

        let chars = Self::ensure_text(reader, header.identifier_chars, len)?;
        let identifier = read_utf16(reader, chars)?;

        let offset = reader.stream_position()?;
        if header.data_size > len - offset {
            error!(
                "block {} declares {} bytes but only {} remain",
                identifier,
                header.data_size,
                len - offset
            );
            return Err(Error::Truncated {
                offset,
                needed: header.data_size,
            });
        }
        reader.seek(SeekFrom::Current(header.data_size as i64))?;

        debug!(
            "found block {} at offset {} ({} bytes)",
            identifier, offset, header.data_size
        );
        Ok(BinaryBlock {
            size: header.data_size,
            offset,
            identifier,
        })
    }

    /// Check that `chars` UTF-16 code units fit before `len`.
    fn ensure_text<R: Seek>(reader: &mut R, chars: u32, len: u64) -> Result<usize> {
        let offset = reader.stream_position()?;
        let needed = chars as u64 * 2;
        if needed > len.saturating_sub(offset) {
            return Err(Error::Truncated { offset, needed });
        }
        Ok(chars as usize)
    }
}

/// LIF file reader
///
/// The file is walked once when opened. Every block read afterwards opens
/// its own file handle, released on every exit path, so a `LifFile` can be
/// shared between threads.
///
/// ```no_run
/// fn dump_blocks(path: &str) -> lif_raw::error::Result<()> {
///     let lif = lif_raw::LifFile::open(path)?;
///
///     for memory in lif.memory_blocks() {
///         let data = lif.read_block(memory.identifier.as_str())?;
///         println!("{}: {} bytes", memory.identifier, data.len());
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LifFile {
    path: PathBuf,
    container: Container,
    memory_blocks: Vec<MemoryBlock>,
}

impl LifFile {
    /// Open and walk the LIF file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<LifFile> {
        let path = path.as_ref().to_path_buf();
        match FileKind::from_path(&path) {
            Some(FileKind::Lif) => {}
            Some(kind) => return Err(Error::UnsupportedVariant { path, kind }),
            None => return Err(Error::InvalidExtension(path)),
        }

        let mut file = File::open(&path)?;
        let len = file.metadata()?.len();
        let container = Container::read(&mut file, len)?;
        drop(file);

        let memory_blocks = container.metadata.memory_blocks()?;
        for memory in &memory_blocks {
            if !container.blocks.iter().any(|b| b.identifier == memory.identifier) {
                warn!("memory {} has no binary block", memory.identifier);
            }
        }

        info!(
            "loaded {}: {} blocks, {} memory references",
            path.display(),
            container.blocks.len(),
            memory_blocks.len()
        );
        Ok(LifFile {
            path,
            container,
            memory_blocks,
        })
    }

    /// Path the file was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of binary blocks in the file
    pub fn len(&self) -> usize {
        self.container.blocks.len()
    }

    /// Whether this file contains no binary blocks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The binary blocks in file order
    pub fn blocks(&self) -> &[BinaryBlock] {
        self.container.blocks()
    }

    /// The memory references of the metadata document in document order
    pub fn memory_blocks(&self) -> &[MemoryBlock] {
        &self.memory_blocks
    }

    /// The parsed metadata document
    pub fn metadata(&self) -> &MetadataDocument {
        self.container.metadata()
    }

    /// Returns an iterator over the block identifiers in file order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.blocks().iter().map(|b| b.identifier.as_str())
    }

    /// Get the index of the block carrying `identifier`, if exactly one does.
    pub fn index_for_identifier(&self, identifier: &str) -> Result<usize> {
        let mut matches = self
            .blocks()
            .iter()
            .enumerate()
            .filter(|(_, b)| b.identifier == identifier)
            .map(|(i, _)| i);

        match (matches.next(), matches.count()) {
            (Some(index), 0) => Ok(index),
            (Some(_), others) => Err(Error::AmbiguousIdentifier {
                identifier: identifier.to_owned(),
                matches: others + 1,
            }),
            (None, _) => Err(Error::BlockNotFound(BlockNotFoundError::Identifier(
                identifier.to_owned(),
            ))),
        }
    }

    /// Get the descriptor of a block
    pub fn block(&self, selector: impl Into<BlockSelector>) -> Result<&BinaryBlock> {
        let index = match selector.into() {
            BlockSelector::Index(index) => index,
            BlockSelector::Identifier(identifier) => self.index_for_identifier(&identifier)?,
        };

        self.blocks()
            .get(index)
            .ok_or(Error::BlockNotFound(BlockNotFoundError::Index(index)))
    }

    /// Read the payload of a block from disk.
    pub fn read_block(&self, selector: impl Into<BlockSelector>) -> Result<Vec<u8>> {
        let block = self.block(selector)?;
        let mut file = File::open(&self.path)?;
        block.read_data(&mut file)
    }

    /// The binary block a memory reference points at, if present.
    pub fn block_for(&self, memory: &MemoryBlock) -> Option<&BinaryBlock> {
        self.blocks()
            .iter()
            .find(|b| b.identifier == memory.identifier)
    }

    /// Read the payload of the block a memory reference points at.
    pub fn memory_block_data(&self, memory: &MemoryBlock) -> Result<Vec<u8>> {
        self.read_block(memory.identifier.as_str())
    }

    /// The metadata element owning a memory reference
    pub fn element(&self, memory: &MemoryBlock) -> Option<&Element> {
        self.metadata().element(memory)
    }
}
