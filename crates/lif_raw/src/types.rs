//! Base types for structure of LIF file.

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek};
use tracing::error;

use crate::error::{Error, Result};

/// Identifier opening every block of the file
pub const COMMON_BLOCK_MAGIC: u32 = 0x70;

/// Identifier following the common header of the metadata block
pub const METADATA_BLOCK_MAGIC: u8 = 0x2A;

/// Identifier preceding each field of a binary block header
pub const BINARY_BLOCK_MAGIC: u8 = 0x2A;

const BYTE_ORDER_MARK: u16 = 0xFEFF;
const SWAPPED_BYTE_ORDER_MARK: u16 = 0xFFFE;

/// A fixed layout header found in a LIF file
pub trait BlockHeader: for<'a> BinRead<Args<'a> = ()> {
    /// Name used when reporting a failed validation
    const NAME: &'static str;

    /// Value of the identifier the header is validated against
    const MAGIC: u32;

    /// Encoded size of the header in bytes
    const SIZE: u64;

    /// Read the header at the current position of `reader`.
    ///
    /// A wrong identifier yields [`Error::InvalidMagic`], a short read yields [`Error::Truncated`].
    fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader.stream_position()?;
        Self::read_le_args(reader, ()).map_err(|e| translate::<Self>(e, start))
    }
}

fn translate<H: BlockHeader>(err: binrw::Error, start: u64) -> Error {
    match err {
        binrw::Error::Backtrace(backtrace) => translate::<H>(*backtrace.error, start),
        binrw::Error::BadMagic { pos, found } => {
            error!("{} identifier incorrect at offset {}", H::NAME, pos);
            Error::InvalidMagic {
                structure: H::NAME,
                expected: H::MAGIC,
                found: format!("{found:?}"),
                offset: pos,
            }
        }
        binrw::Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => Error::Truncated {
            offset: start,
            needed: H::SIZE,
        },
        binrw::Error::Io(e) => Error::IOError(e),
        other => Error::IOError(io::Error::new(io::ErrorKind::InvalidData, other.to_string())),
    }
}

/// Common block header
///
/// Opens every block of the file. The header size is informational and never used to seek.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(magic = 0x70u32, little)]
pub struct CommonBlockHeader {
    /// Usable length declared by the header
    pub header_size: u32,
}

impl BlockHeader for CommonBlockHeader {
    const NAME: &'static str = "common block header";
    const MAGIC: u32 = COMMON_BLOCK_MAGIC;
    const SIZE: u64 = 8;
}

/// Metadata block header
///
/// Only found once, at the head of the file.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(magic = 0x2Au8, little)]
pub struct MetadataBlockHeader {
    /// Number of UTF-16 code units in the metadata document
    pub chars: u32,
}

impl BlockHeader for MetadataBlockHeader {
    const NAME: &'static str = "metadata block header";
    const MAGIC: u32 = METADATA_BLOCK_MAGIC as u32;
    const SIZE: u64 = 5;
}

/// Binary block header
///
/// Fixed part of the header describing a binary block. It is followed by
/// `identifier_chars` UTF-16 code units of identifier and then the payload.
#[derive(BinRead, Debug, Default, Copy, Clone, PartialEq)]
#[br(little)]
pub struct BinaryBlockHeader {
    /// Size of the payload in bytes
    #[br(magic = 0x2Au8)]
    pub data_size: u64,

    /// Number of UTF-16 code units in the identifier
    #[br(magic = 0x2Au8)]
    pub identifier_chars: u32,
}

impl BlockHeader for BinaryBlockHeader {
    const NAME: &'static str = "binary block header";
    const MAGIC: u32 = BINARY_BLOCK_MAGIC as u32;
    const SIZE: u64 = 14;
}

/// Read `chars` UTF-16 code units and decode them, dropping a leading byte order mark.
///
/// Units are little endian unless the mark says otherwise.
pub fn read_utf16<R: Read>(reader: &mut R, chars: usize) -> Result<String> {
    let mut units = vec![0u16; chars];
    reader.read_u16_into::<LittleEndian>(&mut units)?;

    match units.first() {
        Some(&BYTE_ORDER_MARK) => Ok(String::from_utf16(&units[1..])?),
        Some(&SWAPPED_BYTE_ORDER_MARK) => {
            let swapped: Vec<u16> = units[1..].iter().map(|u| u.swap_bytes()).collect();
            Ok(String::from_utf16(&swapped)?)
        }
        _ => Ok(String::from_utf16(&units)?),
    }
}
