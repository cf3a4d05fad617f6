//! In-memory OPC package.
//!
//! [`OpcPackage`] owns every part of a loaded container plus the package
//! relationships, and serializes back through [`PackageWriter`].

use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::part::{Part, PartFactory};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::opc::pkgreader::PackageReader;
use crate::ooxml::opc::pkgwriter::PackageWriter;
use crate::ooxml::opc::rel::Relationships;
use std::collections::HashMap;

/// Upper bound when probing for a free numbered partname.
const MAX_PARTNAME_INDEX: u32 = 100_000;

/// An Open Packaging Convention package held in memory.
pub struct OpcPackage {
    /// Package-level relationships
    rels: Relationships,

    /// All parts, keyed by partname
    parts: HashMap<String, Box<dyn Part>>,
}

impl OpcPackage {
    /// Create a new empty OPC package.
    pub fn new() -> Self {
        Self {
            rels: Relationships::new(PACKAGE_URI.to_string()),
            parts: HashMap::new(),
        }
    }

    /// Load a package from the bytes of a ZIP container.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut phys_reader = PhysPkgReader::new(data)?;
        let pkg_reader = PackageReader::from_phys_reader(&mut phys_reader)?;
        Self::unmarshal(pkg_reader)
    }

    /// Turn serialized parts and relationships into the in-memory graph.
    fn unmarshal(mut pkg_reader: PackageReader) -> Result<Self> {
        let mut package = Self::new();

        for srel in pkg_reader.pkg_srels() {
            package.rels.add_relationship(
                srel.reltype.clone(),
                srel.target_ref.clone(),
                srel.r_id.clone(),
                srel.is_external(),
            );
        }

        for spart in pkg_reader.take_sparts() {
            let mut part = PartFactory::load(spart.partname, spart.content_type, spart.blob)?;
            for srel in spart.srels {
                let is_external = srel.is_external();
                part.rels_mut().add_relationship(
                    srel.reltype,
                    srel.target_ref,
                    srel.r_id,
                    is_external,
                );
            }
            package.add_part(part);
        }

        Ok(package)
    }

    /// Serialize the package to the bytes of a ZIP container.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        PackageWriter::to_bytes(self)
    }

    /// The part the package's officeDocument relationship points at.
    pub fn main_document_part(&self) -> Result<&dyn Part> {
        let rel = self
            .rels
            .part_with_reltype(relationship_type::OFFICE_DOCUMENT)?;
        let partname = rel.target_partname()?;
        self.get_part(&partname)
    }

    pub fn get_part(&self, partname: &PackURI) -> Result<&dyn Part> {
        self.parts
            .get(partname.as_str())
            .map(|b| &**b as &dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    pub fn get_part_mut(&mut self, partname: &PackURI) -> Result<&mut dyn Part> {
        self.parts
            .get_mut(partname.as_str())
            .map(|b| &mut **b as &mut dyn Part)
            .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))
    }

    /// Add a part, replacing any part with the same partname.
    pub fn add_part(&mut self, part: Box<dyn Part>) {
        let partname = part.partname().to_string();
        self.parts.insert(partname, part);
    }

    pub fn iter_parts(&self) -> impl Iterator<Item = &dyn Part> {
        self.parts.values().map(|b| &**b as &dyn Part)
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn rels(&self) -> &Relationships {
        &self.rels
    }

    /// Lowest free partname for a template with a `%d` slot,
    /// e.g. `/ppt/media/image%d.png`.
    pub fn next_partname(&self, template: &str) -> Result<PackURI> {
        (1..=MAX_PARTNAME_INDEX)
            .map(|n| template.replace("%d", &n.to_string()))
            .find(|candidate| !self.parts.contains_key(candidate))
            .ok_or_else(|| OpcError::InvalidPackUri(format!("no free partname for {}", template)))
            .and_then(|candidate| PackURI::new(candidate).map_err(OpcError::InvalidPackUri))
    }
}

impl Default for OpcPackage {
    fn default() -> Self {
        Self::new()
    }
}
