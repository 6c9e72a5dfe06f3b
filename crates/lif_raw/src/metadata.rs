//! Typed access to the metadata document of a LIF file
//!
//! The document is an XML tree. Every `Element` node describing data with
//! pixels carries a `Memory` child naming the binary block that holds them:
//!
//! ```xml
//! <Element Name="Series001">
//!   <Data>...</Data>
//!   <Memory Size="1048576" MemoryBlockID="MemBlock_233"/>
//!   <Children>...</Children>
//! </Element>
//! ```

use std::str::FromStr;

use tracing::debug;
use xmltree::{Element, XMLNode};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::error::{Error, Result};

const ELEMENT_TAG: &str = "Element";
const MEMORY_TAG: &str = "Memory";
const SIZE_ATTRIBUTE: &str = "Size";
const IDENTIFIER_ATTRIBUTE: &str = "MemoryBlockID";

/// Parsed metadata document
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDocument {
    source: String,
    root: Option<Element>,
}

impl MetadataDocument {
    /// Parse a decoded document. An empty or whitespace only source yields a document without root.
    pub fn parse(source: String) -> Result<MetadataDocument> {
        let root = if source.trim().is_empty() {
            None
        } else {
            Some(Element::parse(source.as_bytes())?)
        };

        Ok(MetadataDocument { source, root })
    }

    /// The decoded text the document was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The root element, if the document is not empty
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// All elements named `name` anywhere in the document, the root included, in document order.
    pub fn descendants<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        let mut stack: Vec<&Element> = self.root.iter().collect();
        std::iter::from_fn(move || {
            while let Some(element) = stack.pop() {
                stack.extend(children(element).rev());
                if element.name == name {
                    return Some(element);
                }
            }
            None
        })
    }

    /// Read attribute `name` of `element` as `T`.
    pub fn attribute<T: FromStr>(element: &Element, name: &str) -> Result<T> {
        let value = element
            .attributes
            .get(name)
            .ok_or_else(|| Error::MissingAttribute {
                element: element.name.clone(),
                attribute: name.to_owned(),
            })?;

        value.parse().map_err(|_| Error::InvalidAttribute {
            element: element.name.clone(),
            attribute: name.to_owned(),
            value: value.clone(),
            expected: std::any::type_name::<T>(),
        })
    }

    /// Build the memory correlation list: one entry per `Element` carrying a `Memory` child.
    pub fn memory_blocks(&self) -> Result<Vec<MemoryBlock>> {
        let mut blocks = Vec::new();
        for (element_index, element) in self.descendants(ELEMENT_TAG).enumerate() {
            let Some(memory) = element.get_child(MEMORY_TAG) else {
                continue;
            };

            let block = MemoryBlock {
                size: Self::attribute(memory, SIZE_ATTRIBUTE)?,
                identifier: Self::attribute(memory, IDENTIFIER_ATTRIBUTE)?,
                element_index,
            };
            debug!("element {} uses {}", element_index, block.identifier);
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// The `Element` node a memory entry was read from
    pub fn element(&self, block: &MemoryBlock) -> Option<&Element> {
        self.descendants(ELEMENT_TAG).nth(block.element_index)
    }
}

fn children(element: &Element) -> impl DoubleEndedIterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(child) => Some(child),
        _ => None,
    })
}

/// Reference from a metadata element to the binary block holding its data
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MemoryBlock {
    /// Size declared by the metadata, not checked against the block
    pub size: u64,
    /// Identifier of the binary block
    pub identifier: String,
    /// Position of the owning element among all `Element` nodes in document order
    pub element_index: usize,
}
