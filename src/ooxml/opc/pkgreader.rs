//! Low-level, read-only API to a serialized Open Packaging Convention (OPC) package.
//!
//! Parses the content type map, resolves relationships, and loads every part
//! reachable from the package relationships.

use crate::ooxml::opc::constants::target_mode;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::{CONTENT_TYPES_URI, PACKAGE_URI, PackURI};
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use quick_xml::Reader;
use quick_xml::events::Event;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// A part as loaded from the physical package, before it becomes a Part object.
#[derive(Debug)]
pub struct SerializedPart {
    pub partname: PackURI,
    pub content_type: String,
    pub blob: Vec<u8>,
    /// Relationships from this part, usually only a handful
    pub srels: SmallVec<[SerializedRelationship; 8]>,
}

/// A relationship as read from a .rels file.
#[derive(Debug, Clone)]
pub struct SerializedRelationship {
    /// Base URI for resolving relative references
    pub base_uri: String,
    pub r_id: String,
    pub reltype: String,
    /// Target reference (relative URI or external URL)
    pub target_ref: String,
    /// Target mode (Internal or External)
    pub target_mode: String,
}

impl SerializedRelationship {
    #[inline]
    pub fn is_external(&self) -> bool {
        self.target_mode == target_mode::EXTERNAL
    }

    /// Absolute partname of an internal relationship's target.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external() {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external and has no target partname",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Content type lookup built from the Default and Override elements of
/// [Content_Types].xml.
struct ContentTypeMap {
    /// Lower-cased extension to content type
    defaults: HashMap<String, String>,

    /// Partname to content type
    overrides: HashMap<String, String>,
}

impl ContentTypeMap {
    fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut map = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let local_name = e.local_name();
                    let key_attr: &[u8] = match local_name.as_ref() {
                        b"Default" => b"Extension",
                        b"Override" => b"PartName",
                        _ => {
                            buf.clear();
                            continue;
                        },
                    };

                    let mut key = None;
                    let mut content_type = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if attr.key.as_ref() == key_attr {
                            key = Some(attr.unescape_value()?.into_owned());
                        } else if attr.key.as_ref() == b"ContentType" {
                            content_type = Some(attr.unescape_value()?.into_owned());
                        }
                    }

                    if let (Some(key), Some(ct)) = (key, content_type) {
                        if key_attr == b"Extension" {
                            map.defaults.insert(key.to_lowercase(), ct);
                        } else {
                            map.overrides.insert(key, ct);
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(map)
    }

    /// Override first, then the default for the extension.
    fn get(&self, pack_uri: &PackURI) -> Result<String> {
        if let Some(ct) = self.overrides.get(pack_uri.as_str()) {
            return Ok(ct.clone());
        }

        self.defaults
            .get(&pack_uri.ext().to_lowercase())
            .cloned()
            .ok_or_else(|| OpcError::ContentTypeNotFound(pack_uri.to_string()))
    }
}

/// Package reader that provides access to serialized parts and relationships.
pub struct PackageReader {
    pkg_srels: SmallVec<[SerializedRelationship; 8]>,
    sparts: Vec<SerializedPart>,
}

impl PackageReader {
    /// Read every member, then walk the relationship graph from the package
    /// relationships, loading each reachable part once.
    pub fn from_phys_reader(phys_reader: &mut PhysPkgReader<'_>) -> Result<Self> {
        let mut members = phys_reader.read_all()?;

        let content_types_xml = members
            .get(CONTENT_TYPES_URI.trim_start_matches('/'))
            .ok_or_else(|| OpcError::PartNotFound("[Content_Types].xml".to_string()))?;
        let content_types = ContentTypeMap::from_xml(content_types_xml)?;

        let package_uri = PackURI::new(PACKAGE_URI).map_err(OpcError::InvalidPackUri)?;
        let pkg_srels = Self::load_rels(&members, &package_uri)?;

        let sparts = Self::load_parts(&mut members, &pkg_srels, &content_types)?;

        Ok(Self { pkg_srels, sparts })
    }

    /// Relationships of `source_uri`; empty when it has no .rels member.
    fn load_rels(
        members: &HashMap<String, Vec<u8>>,
        source_uri: &PackURI,
    ) -> Result<SmallVec<[SerializedRelationship; 8]>> {
        let rels_uri = source_uri.rels_uri().map_err(OpcError::InvalidPackUri)?;

        match members.get(rels_uri.membername()) {
            Some(xml) => Self::parse_rels_xml(xml, source_uri.base_uri()),
            None => Ok(SmallVec::new()),
        }
    }

    fn parse_rels_xml(
        rels_xml: &[u8],
        base_uri: &str,
    ) -> Result<SmallVec<[SerializedRelationship; 8]>> {
        let mut srels = SmallVec::new();
        let mut reader = Reader::from_reader(rels_xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut r_id = None;
                    let mut reltype = None;
                    let mut target_ref = None;
                    let mut target_mode = target_mode::INTERNAL.to_string();

                    for attr in e.attributes() {
                        let attr = attr?;
                        match attr.key.as_ref() {
                            b"Id" => r_id = Some(attr.unescape_value()?.into_owned()),
                            b"Type" => reltype = Some(attr.unescape_value()?.into_owned()),
                            b"Target" => target_ref = Some(attr.unescape_value()?.into_owned()),
                            b"TargetMode" => target_mode = attr.unescape_value()?.into_owned(),
                            _ => {},
                        }
                    }

                    if let (Some(r_id), Some(reltype), Some(target_ref)) = (r_id, reltype, target_ref)
                    {
                        srels.push(SerializedRelationship {
                            base_uri: base_uri.to_string(),
                            r_id,
                            reltype,
                            target_ref,
                            target_mode,
                        });
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::XmlError(format!("Rels parse error: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(srels)
    }

    /// Breadth of the graph is small, so an explicit work list is enough.
    /// Blobs are moved out of `members` rather than cloned.
    fn load_parts(
        members: &mut HashMap<String, Vec<u8>>,
        pkg_srels: &[SerializedRelationship],
        content_types: &ContentTypeMap,
    ) -> Result<Vec<SerializedPart>> {
        let mut sparts = Vec::with_capacity(32);
        let mut visited: HashSet<PackURI> = HashSet::with_capacity(32);
        let mut work_queue: Vec<PackURI> = Vec::with_capacity(pkg_srels.len());

        for srel in pkg_srels.iter().filter(|srel| !srel.is_external()) {
            let partname = srel.target_partname()?;
            if visited.insert(partname.clone()) {
                work_queue.push(partname);
            }
        }

        while let Some(partname) = work_queue.pop() {
            let srels = Self::load_rels(members, &partname)?;

            for child in srels.iter().filter(|srel| !srel.is_external()) {
                let child_partname = child.target_partname()?;
                // Dangling targets are tolerated; PowerPoint writes them for
                // removed notes and comment authors.
                if members.contains_key(child_partname.membername())
                    && visited.insert(child_partname.clone())
                {
                    work_queue.push(child_partname);
                }
            }

            let blob = members
                .remove(partname.membername())
                .ok_or_else(|| OpcError::PartNotFound(partname.to_string()))?;
            let content_type = content_types.get(&partname)?;

            sparts.push(SerializedPart {
                partname,
                content_type,
                blob,
                srels,
            });
        }

        Ok(sparts)
    }

    /// Package-level relationships.
    pub fn pkg_srels(&self) -> &[SerializedRelationship] {
        &self.pkg_srels
    }

    /// Take ownership of all serialized parts (zero-copy move).
    pub fn take_sparts(&mut self) -> Vec<SerializedPart> {
        std::mem::take(&mut self.sparts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_map() {
        let xml = br#"<?xml version="1.0"?>
            <Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
                <Default Extension="xml" ContentType="application/xml"/>
                <Default Extension="PNG" ContentType="image/png"/>
                <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
            </Types>"#;

        let ct_map = ContentTypeMap::from_xml(xml).unwrap();

        let uri = PackURI::new("/ppt/slides/slide1.xml").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "application/xml");

        let uri = PackURI::new("/ppt/media/image1.png").unwrap();
        assert_eq!(ct_map.get(&uri).unwrap(), "image/png");

        let uri = PackURI::new("/ppt/presentation.xml").unwrap();
        assert!(ct_map.get(&uri).unwrap().ends_with("presentation.main+xml"));

        let uri = PackURI::new("/ppt/media/audio1.wav").unwrap();
        assert!(ct_map.get(&uri).is_err());
    }

    #[test]
    fn test_parse_rels_xml() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
            <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/>
            <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
        </Relationships>"#;

        let srels = PackageReader::parse_rels_xml(xml, "/ppt/slides").unwrap();
        assert_eq!(srels.len(), 2);
        assert_eq!(
            srels[0].target_partname().unwrap().as_str(),
            "/ppt/slideLayouts/slideLayout1.xml"
        );
        assert!(srels[1].is_external());
        assert!(srels[1].target_partname().is_err());
    }
}
