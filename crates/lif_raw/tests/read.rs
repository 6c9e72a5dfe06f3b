use std::io::Write;
use std::path::Path;

use lif_raw::error::{BlockNotFoundError, Error, ErrorKind, Result};
use lif_raw::{BinaryBlock, LifFile};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tracing::info;
use tracing_test::traced_test;

const DOCUMENT: &str = r#"<LMSDataContainerHeader Version="2">
  <Element Name="Experiment">
    <Children>
      <Element Name="Image A">
        <Memory Size="4" MemoryBlockID="A"/>
      </Element>
      <Element Name="Image B">
        <Memory Size="999" MemoryBlockID="B"/>
      </Element>
      <Element Name="Image C">
        <Memory Size="2" MemoryBlockID="C"/>
      </Element>
    </Children>
  </Element>
</LMSDataContainerHeader>"#;

fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn metadata_block(document: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(0x70u32.to_le_bytes());
    out.extend((document.encode_utf16().count() as u32 * 2 + 5).to_le_bytes());
    out.push(0x2A);
    out.extend((document.encode_utf16().count() as u32).to_le_bytes());
    out.extend(utf16(document));
    out
}

fn binary_block(identifier: &str, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(0x70u32.to_le_bytes());
    out.extend(0u32.to_le_bytes());
    out.push(0x2A);
    out.extend((data.len() as u64).to_le_bytes());
    out.push(0x2A);
    out.extend((identifier.encode_utf16().count() as u32).to_le_bytes());
    out.extend(utf16(identifier));
    out.extend(data);
    out
}

fn container(document: &str, blocks: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut out = metadata_block(document);
    for (identifier, data) in blocks {
        out.extend(binary_block(identifier, data));
    }
    out
}

fn write_lif(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".lif").tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    info!("wrote {} bytes to {}", bytes.len(), file.path().display());
    Ok(file)
}

fn file_len(path: &Path) -> Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

#[traced_test]
#[test]
fn open_empty_container() -> Result<()> {
    let file = write_lif(&container("", &[]))?;

    let lif = LifFile::open(file.path())?;
    assert!(lif.is_empty());
    assert!(lif.memory_blocks().is_empty());
    assert!(lif.metadata().root().is_none());

    Ok(())
}

#[traced_test]
#[test]
fn open_container_with_blocks() -> Result<()> {
    let file = write_lif(&container(
        DOCUMENT,
        &[("A", vec![1, 2, 3, 4]), ("B", vec![5, 6, 7]), ("C", vec![])],
    ))?;

    let lif = LifFile::open(file.path())?;
    assert_eq!(lif.len(), 3);
    assert_eq!(lif.identifiers().collect::<Vec<_>>(), vec!["A", "B", "C"]);

    let last = &lif.blocks()[2];
    assert_eq!(last.offset + last.size, file_len(file.path())?);

    let first = &lif.blocks()[0];
    let expected_offset = metadata_block(DOCUMENT).len() as u64 + 8 + 14 + 2;
    assert_eq!(
        first,
        &BinaryBlock {
            size: 4,
            offset: expected_offset,
            identifier: "A".into()
        }
    );

    Ok(())
}

#[traced_test]
#[test]
fn read_blocks_by_index_and_identifier() -> Result<()> {
    let file = write_lif(&container(DOCUMENT, &[("A", vec![1, 2, 3, 4]), ("B", vec![5, 6, 7])]))?;
    let lif = LifFile::open(file.path())?;

    assert_eq!(lif.read_block(0usize)?, vec![1, 2, 3, 4]);
    assert_eq!(lif.read_block(1usize)?, vec![5, 6, 7]);
    assert_eq!(lif.read_block("A")?, lif.read_block(0usize)?);
    assert_eq!(lif.read_block("B")?, lif.read_block(1usize)?);
    assert_eq!(lif.index_for_identifier("B")?, 1);

    Ok(())
}

#[traced_test]
#[test]
fn lookup_failures() -> Result<()> {
    let file = write_lif(&container(
        "",
        &[("A", vec![1]), ("B", vec![2]), ("B", vec![3])],
    ))?;
    let lif = LifFile::open(file.path())?;

    let err = lif.read_block("Z").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert!(matches!(
        err,
        Error::BlockNotFound(BlockNotFoundError::Identifier(ref id)) if id == "Z"
    ));

    let err = lif.read_block("B").unwrap_err();
    assert!(matches!(err, Error::AmbiguousIdentifier { matches: 2, .. }));

    let err = lif.read_block(3usize).unwrap_err();
    assert!(matches!(
        err,
        Error::BlockNotFound(BlockNotFoundError::Index(3))
    ));

    // failed lookups leave the handle usable
    assert_eq!(lif.read_block(2usize)?, vec![3]);

    Ok(())
}

#[traced_test]
#[test]
fn correlate_memory_with_blocks() -> Result<()> {
    let file = write_lif(&container(DOCUMENT, &[("A", vec![1, 2, 3, 4]), ("B", vec![5, 6, 7])]))?;
    let lif = LifFile::open(file.path())?;

    let memory = lif.memory_blocks();
    assert_eq!(memory.len(), 3);
    assert_eq!(
        memory.iter().map(|m| m.identifier.as_str()).collect::<Vec<_>>(),
        vec!["A", "B", "C"]
    );

    // declared sizes are informational
    assert_eq!(memory[1].size, 999);
    assert_eq!(lif.block_for(&memory[1]).map(|b| b.size), Some(3));
    assert_eq!(lif.memory_block_data(&memory[0])?, vec![1, 2, 3, 4]);

    assert!(lif.block_for(&memory[2]).is_none());
    assert_eq!(
        lif.memory_block_data(&memory[2]).unwrap_err().kind(),
        ErrorKind::Lookup
    );

    let owner = lif.element(&memory[1]).unwrap();
    assert_eq!(owner.attributes["Name"], "Image B");

    Ok(())
}

#[traced_test]
#[test]
fn reject_other_extensions() -> Result<()> {
    let err = LifFile::open("missing.xlef").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, Error::UnsupportedVariant { .. }));

    let err = LifFile::open("missing.tif").unwrap_err();
    assert!(matches!(err, Error::InvalidExtension(_)));

    let err = LifFile::open("missing.lif").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    Ok(())
}

#[traced_test]
#[test]
fn reject_bad_magic() -> Result<()> {
    let valid = container("<a/>", &[("A", vec![1, 2])]);
    let metadata_len = metadata_block("<a/>").len();

    // common header, metadata header, second common header, both binary block markers
    for position in [0, 8, metadata_len, metadata_len + 8, metadata_len + 17] {
        let mut bytes = valid.clone();
        bytes[position] ^= 0x01;

        let file = write_lif(&bytes)?;
        let err = LifFile::open(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format, "corrupt byte {position}");
        assert!(matches!(err, Error::InvalidMagic { .. }));
    }

    Ok(())
}

#[traced_test]
#[test]
fn reject_truncated() -> Result<()> {
    let valid = container("<a/>", &[("A", vec![1, 2, 3, 4])]);
    let metadata_len = metadata_block("<a/>").len();

    for len in [
        3,
        10,
        metadata_len - 1,
        metadata_len + 4,
        metadata_len + 12,
        metadata_len + 23,
        valid.len() - 1,
    ] {
        let file = write_lif(&valid[..len])?;
        let err = LifFile::open(file.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Truncation, "truncated to {len}");
    }

    Ok(())
}

#[traced_test]
#[test]
fn concurrent_reads() -> Result<()> {
    let blocks: Vec<(String, Vec<u8>)> = (0..8u8)
        .map(|i| (format!("MemBlock_{i}"), vec![i; 64 * (i as usize + 1)]))
        .collect();
    let refs = blocks
        .iter()
        .map(|(id, data)| (id.as_str(), data.clone()))
        .collect::<Vec<_>>();
    let file = write_lif(&container("", &refs))?;
    let lif = LifFile::open(file.path())?;

    std::thread::scope(|scope| {
        let handles = blocks
            .iter()
            .map(|(id, data)| {
                let lif = &lif;
                scope.spawn(move || -> Result<()> {
                    for _ in 0..4 {
                        assert_eq!(&lif.read_block(id.as_str())?, data);
                    }
                    Ok(())
                })
            })
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .try_for_each(|h| h.join().expect("reader thread panicked"))
    })
}
