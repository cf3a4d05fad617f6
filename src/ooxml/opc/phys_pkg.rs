//! Provides a general interface to a physical OPC package (ZIP file).
//!
//! The reader decompresses every member up front so that the package reader
//! can walk the relationship graph purely in memory; the writer produces a
//! Deflate-compressed archive in memory.

use crate::ooxml::opc::error::Result;
use crate::ooxml::opc::packuri::PackURI;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Physical package reader over an in-memory ZIP archive.
pub struct PhysPkgReader<'data> {
    archive: ZipArchive<Cursor<&'data [u8]>>,
}

impl<'data> PhysPkgReader<'data> {
    /// Open a ZIP archive from a byte slice.
    ///
    /// Fails if the bytes are not a readable ZIP archive.
    pub fn new(data: &'data [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }

    /// Number of entries in the archive, directories included.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Decompress every file member, keyed by member name.
    ///
    /// Directory entries are skipped.
    pub fn read_all(&mut self) -> Result<HashMap<String, Vec<u8>>> {
        let mut members = HashMap::with_capacity(self.archive.len());

        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let mut blob = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut blob)?;
            members.insert(file.name().to_string(), blob);
        }

        Ok(members)
    }
}

/// Physical package writer that builds a ZIP archive in memory.
pub struct PhysPkgWriter {
    archive: ZipWriter<Cursor<Vec<u8>>>,
}

impl PhysPkgWriter {
    pub fn new() -> Self {
        Self {
            archive: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Write a part to the package with Deflate compression.
    pub fn write(&mut self, pack_uri: &PackURI, blob: &[u8]) -> Result<()> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.archive.start_file(pack_uri.membername(), options)?;
        self.archive.write_all(blob)?;
        Ok(())
    }

    /// Finish writing and return the package bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.archive.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for PhysPkgWriter {
    fn default() -> Self {
        Self::new()
    }
}
