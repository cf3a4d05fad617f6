//! Image parts embedded into a presentation.
//!
//! A [`MediaSink`] stores image bytes as `/ppt/media/imageN.<ext>` parts and
//! relates them from one slide. Identical bytes are stored once and shared.

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::OpcPackage;
use crate::ooxml::opc::constants::relationship_type;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::part::BlobPart;
use crate::ooxml::pptx::format::ImageFormat;

const MEDIA_PREFIX: &str = "/ppt/media/";

/// Adds images to the package on behalf of a single slide.
pub struct MediaSink<'a> {
    package: &'a mut OpcPackage,
    slide_partname: PackURI,
}

impl<'a> MediaSink<'a> {
    pub(crate) fn new(package: &'a mut OpcPackage, slide_partname: PackURI) -> Self {
        Self {
            package,
            slide_partname,
        }
    }

    /// Store an image and return the slide's relationship id for it.
    ///
    /// Fails with [`OoxmlError::InvalidFormat`] when the bytes are not a
    /// recognised raster image.
    pub fn add_image(&mut self, blob: Vec<u8>) -> Result<String> {
        let format = ImageFormat::detect_from_bytes(&blob)
            .ok_or_else(|| OoxmlError::InvalidFormat("unrecognized image data".to_string()))?;
        self.package.get_part(&self.slide_partname)?;

        let partname = match self.find_media(&blob) {
            Some(existing) => existing,
            None => {
                let partname = self
                    .package
                    .next_partname(&format!("{}image%d.{}", MEDIA_PREFIX, format.extension()))?;
                self.package.add_part(Box::new(BlobPart::new(
                    partname.clone(),
                    format.mime_type().to_string(),
                    blob,
                )));
                partname
            },
        };

        let slide = self.package.get_part_mut(&self.slide_partname)?;
        Ok(slide.relate_to(&partname, relationship_type::IMAGE))
    }

    /// Partname of a media part whose content equals `blob`.
    fn find_media(&self, blob: &[u8]) -> Option<PackURI> {
        self.package
            .iter_parts()
            .find(|part| part.partname().as_str().starts_with(MEDIA_PREFIX) && part.blob() == blob)
            .map(|part| part.partname().clone())
    }
}
