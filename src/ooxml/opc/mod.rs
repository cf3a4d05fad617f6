/// Open Packaging Conventions (OPC) implementation.
///
/// The container layer beneath a presentation: parts, relationships,
/// content types and the ZIP archive they live in.
///
/// - Uses `quick-xml` for content types and relationship parts
/// - Uses `atoi_simd` for fast rId parsing
/// - Uses `smallvec` for the usually short per-part relationship lists
pub mod constants;
pub mod error;
pub mod package;
pub mod packuri;
pub mod part;
pub mod phys_pkg;
pub mod pkgreader;
pub mod pkgwriter;
pub mod rel;

pub use error::OpcError;
pub use package::OpcPackage;
pub use packuri::PackURI;
pub use part::{BlobPart, Part, XmlPart};
