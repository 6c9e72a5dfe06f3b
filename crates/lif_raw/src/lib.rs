//! This library handles reading the metadata and raw binary blocks of **LIF** files written by *Leica* microscopes.
//!
//! # LIF Format Documentation
//!
//! A LIF file is a single container holding one XML metadata document followed by any number of
//! binary blocks, usually raw pixel data. LIF files are identified with the `.lif` extension.
//!
//! ## File Structure
//!
//! A LIF file consists of a metadata block, followed by binary blocks until the end of the file.
//! Every block opens with a common block header.
//!
//! ### Common Block Header
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Identifier             | 4 bytes: Fixed value 0x00000070                            |
//! | 0x0004         | Header Size            | 4 bytes: Declared size of the block, not used for seeking  |
//!
//! ### Metadata Block
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Identifier             | 1 byte: Fixed value 0x2A                                   |
//! | 0x0001         | Characters             | 4 bytes: Number of UTF-16 code units in the document       |
//! | 0x0005         | Document               | (Characters * 2) bytes: UTF-16 XML document                |
//!
//! ### Binary Block
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Identifier             | 1 byte: Fixed value 0x2A                                   |
//! | 0x0001         | Data Size              | 8 bytes: Size of the payload                               |
//! | 0x0009         | Identifier             | 1 byte: Fixed value 0x2A                                   |
//! | 0x000A         | Characters             | 4 bytes: Number of UTF-16 code units in the block name     |
//! | 0x000E         | Name                   | (Characters * 2) bytes: UTF-16 block name                  |
//! | ...            | Data                   | (Data Size) bytes: opaque payload                          |
//!
//! ### Memory references
//!
//! Each `Element` node of the metadata document with pixel data has a `Memory` child whose
//! `MemoryBlockID` attribute names a binary block and whose `Size` attribute declares its size.
//! Metadata and blocks are joined by that name only, never by position.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.lif`
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Text**: UTF-16LE
//!

pub mod error;
pub mod metadata;
pub mod read;
pub mod types;

pub use metadata::{MemoryBlock, MetadataDocument};
pub use read::{BinaryBlock, BlockSelector, FileKind, LifFile};
