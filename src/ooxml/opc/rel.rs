//! Relationships between parts of an OPC package.
//!
//! Every part (and the package itself) owns a [`Relationships`] collection
//! that is serialized to its `.rels` part. Slides reach their images through
//! these, so inserting a picture means adding one here.

use crate::common::xml::escape_xml;
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use std::collections::HashMap;

/// A single relationship from a source part to a target.
#[derive(Debug, Clone)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1", "rId2")
    r_id: String,

    /// Relationship type URI
    reltype: String,

    /// Target reference - either a relative part reference or external URL
    target_ref: String,

    /// Base URI for resolving relative references
    base_uri: String,

    is_external: bool,
}

impl Relationship {
    pub fn new(
        r_id: String,
        reltype: String,
        target_ref: String,
        base_uri: String,
        is_external: bool,
    ) -> Self {
        Self {
            r_id,
            reltype,
            target_ref,
            base_uri,
            is_external,
        }
    }

    #[inline]
    pub fn r_id(&self) -> &str {
        &self.r_id
    }

    #[inline]
    pub fn reltype(&self) -> &str {
        &self.reltype
    }

    #[inline]
    pub fn target_ref(&self) -> &str {
        &self.target_ref
    }

    #[inline]
    pub fn is_external(&self) -> bool {
        self.is_external
    }

    /// Absolute partname of the target.
    ///
    /// Returns an error for external relationships, which have no partname.
    pub fn target_partname(&self) -> Result<PackURI> {
        if self.is_external {
            return Err(OpcError::InvalidRelationship(format!(
                "{} is external and has no target partname",
                self.r_id
            )));
        }
        PackURI::from_rel_ref(&self.base_uri, &self.target_ref).map_err(OpcError::InvalidPackUri)
    }
}

/// Collection of relationships from a single source, keyed by rId.
#[derive(Debug)]
pub struct Relationships {
    /// Base URI for resolving relative references
    base_uri: String,

    rels: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new(base_uri: String) -> Self {
        Self {
            base_uri,
            rels: HashMap::new(),
        }
    }

    /// Add a relationship with an explicit rId, replacing any previous one
    /// with the same ID.
    pub fn add_relationship(
        &mut self,
        reltype: String,
        target_ref: String,
        r_id: String,
        is_external: bool,
    ) -> &Relationship {
        let rel = Relationship::new(
            r_id.clone(),
            reltype,
            target_ref,
            self.base_uri.clone(),
            is_external,
        );
        self.rels.entry(r_id).insert_entry(rel).into_mut()
    }

    #[inline]
    pub fn get(&self, r_id: &str) -> Option<&Relationship> {
        self.rels.get(r_id)
    }

    /// Get the internal relationship of `reltype` pointing at `target_ref`,
    /// creating it with the next free rId if there is none.
    pub fn get_or_add(&mut self, reltype: &str, target_ref: &str) -> &Relationship {
        let existing = self
            .rels
            .values()
            .find(|rel| {
                !rel.is_external() && rel.reltype() == reltype && rel.target_ref() == target_ref
            })
            .map(|rel| rel.r_id().to_string());

        let r_id = existing.unwrap_or_else(|| self.next_r_id());
        if self.rels.contains_key(&r_id) {
            return &self.rels[&r_id];
        }
        self.add_relationship(reltype.to_string(), target_ref.to_string(), r_id, false)
    }

    /// Lowest "rIdN" not yet taken.
    fn next_r_id(&self) -> String {
        let mut used: Vec<u32> = self
            .rels
            .keys()
            .filter_map(|r_id| r_id.strip_prefix("rId"))
            .filter_map(|digits| atoi_simd::parse::<u32>(digits.as_bytes()).ok())
            .collect();
        used.sort_unstable();

        let mut next = 1u32;
        for num in used {
            match num.cmp(&next) {
                std::cmp::Ordering::Equal => next += 1,
                std::cmp::Ordering::Greater => break,
                std::cmp::Ordering::Less => {},
            }
        }

        format!("rId{}", next)
    }

    /// The single relationship of a given type.
    ///
    /// Fails when there is none or more than one.
    pub fn part_with_reltype(&self, reltype: &str) -> Result<&Relationship> {
        let mut matching = self.rels.values().filter(|rel| rel.reltype() == reltype);

        match (matching.next(), matching.next()) {
            (Some(rel), None) => Ok(rel),
            (None, _) => Err(OpcError::RelationshipNotFound(format!(
                "No relationship of type '{}'",
                reltype
            ))),
            (Some(_), Some(_)) => Err(OpcError::InvalidRelationship(format!(
                "Multiple relationships of type '{}'",
                reltype
            ))),
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.rels.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rels.is_empty()
    }

    /// Serialize to the XML of a .rels part, ordered by rId.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.rels.len() * 160);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );

        let mut rels: Vec<&Relationship> = self.rels.values().collect();
        rels.sort_by(|a, b| natural_r_id(a.r_id()).cmp(&natural_r_id(b.r_id())));

        for rel in rels {
            let target_mode = if rel.is_external() {
                r#" TargetMode="External""#
            } else {
                ""
            };

            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
                escape_xml(rel.r_id()),
                escape_xml(rel.reltype()),
                escape_xml(rel.target_ref()),
                target_mode
            ));
        }

        xml.push_str("</Relationships>");

        xml
    }
}

/// Sort key that orders "rId2" before "rId10".
fn natural_r_id(r_id: &str) -> (u32, &str) {
    let num = r_id
        .strip_prefix("rId")
        .and_then(|digits| atoi_simd::parse::<u32>(digits.as_bytes()).ok())
        .unwrap_or(u32::MAX);
    (num, r_id)
}
