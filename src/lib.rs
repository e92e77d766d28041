//! Parse references to images in OCI registries, like
//! `reg.example.com/org/app:1.2.3`, into their five components, and
//! render them back to their canonical form.

mod digest;

pub mod reference;

pub use digest::{DigestAlgorithm, ValidationError};
pub use reference::{ImageReference, ParseError, TypeMismatch};
pub use reference::{DockerMediaType, InvalidMediaType, OciMediaType, COMPATIBLE_MEDIA_TYPES};
