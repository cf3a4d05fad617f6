/// Open Packaging Convention (OPC) objects related to package parts.
///
/// A part is a unit of content in the package with a partname, a content
/// type and its own relationships. Slides are XML parts whose blob gets
/// replaced after rendering; inserted images become new blob parts.
use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::rel::Relationships;

/// Trait representing a part in an OPC package.
pub trait Part {
    /// Get the partname of this part.
    fn partname(&self) -> &PackURI;

    /// Get the content type of this part.
    fn content_type(&self) -> &str;

    /// Get the binary content of this part.
    fn blob(&self) -> &[u8];

    /// Replace the binary content of this part.
    fn set_blob(&mut self, blob: Vec<u8>);

    /// Get the relationships for this part.
    fn rels(&self) -> &Relationships;

    /// Get mutable access to the relationships for this part.
    fn rels_mut(&mut self) -> &mut Relationships;

    /// Add or get a relationship of `reltype` to another part, returning its rId.
    ///
    /// The stored target is made relative to this part's directory.
    fn relate_to(&mut self, target: &PackURI, reltype: &str) -> String {
        let target_ref = target.relative_ref(self.partname().base_uri());
        let rel = self.rels_mut().get_or_add(reltype, &target_ref);
        rel.r_id().to_string()
    }

    /// Resolve one of this part's rIds to the target partname.
    fn related_partname(&self, r_id: &str) -> Result<PackURI> {
        self.rels()
            .get(r_id)
            .ok_or_else(|| {
                OpcError::RelationshipNotFound(format!("{} in {}", r_id, self.partname()))
            })?
            .target_partname()
    }
}

/// A part holding opaque binary content (images, embedded objects, ...).
#[derive(Debug)]
pub struct BlobPart {
    partname: PackURI,
    content_type: String,
    blob: Vec<u8>,
    rels: Relationships,
}

impl BlobPart {
    pub fn new(partname: PackURI, content_type: String, blob: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            blob,
            rels,
        }
    }
}

impl Part for BlobPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.blob
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.blob = blob;
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// An XML part. Its bytes are guaranteed to be valid UTF-8.
#[derive(Debug)]
pub struct XmlPart {
    partname: PackURI,
    content_type: String,
    xml_bytes: Vec<u8>,
    rels: Relationships,
}

impl XmlPart {
    pub fn new(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Self {
        let rels = Relationships::new(partname.base_uri().to_string());
        Self {
            partname,
            content_type,
            xml_bytes,
            rels,
        }
    }

    /// Load an XML part from raw data, validating the encoding.
    pub fn load(partname: PackURI, content_type: String, xml_bytes: Vec<u8>) -> Result<Self> {
        std::str::from_utf8(&xml_bytes)
            .map_err(|e| OpcError::XmlError(format!("Invalid UTF-8 in {}: {}", partname, e)))?;

        Ok(Self::new(partname, content_type, xml_bytes))
    }
}

impl Part for XmlPart {
    fn partname(&self) -> &PackURI {
        &self.partname
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn blob(&self) -> &[u8] {
        &self.xml_bytes
    }

    fn set_blob(&mut self, blob: Vec<u8>) {
        self.xml_bytes = blob;
    }

    fn rels(&self) -> &Relationships {
        &self.rels
    }

    fn rels_mut(&mut self) -> &mut Relationships {
        &mut self.rels
    }
}

/// Factory choosing the Part implementation from the content type.
pub struct PartFactory;

impl PartFactory {
    pub fn load(partname: PackURI, content_type: String, blob: Vec<u8>) -> Result<Box<dyn Part>> {
        if Self::is_xml_content_type(&content_type) {
            Ok(Box::new(XmlPart::load(partname, content_type, blob)?))
        } else {
            Ok(Box::new(BlobPart::new(partname, content_type, blob)))
        }
    }

    #[inline]
    fn is_xml_content_type(content_type: &str) -> bool {
        content_type.ends_with("+xml") || content_type.ends_with("/xml")
    }
}
