mod mediatype;
mod parser;

use std::{any::Any, fmt, str::FromStr};

use crate::digest::{self, DigestAlgorithm, ValidationError};

pub use mediatype::{DockerMediaType, InvalidMediaType, OciMediaType, COMPATIBLE_MEDIA_TYPES};

/// Errors from the reference parser.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// The grammar requires a non-empty name path segment and the
    /// input has none at that position.
    #[error("Missing image name component ({0}).")]
    MissingComponent(&'static str),

    #[error("{0}")]
    InvalidDigest(#[from] ValidationError),
}

/// Error from [`ImageReference::eq_any`] when the compared value is
/// not an image reference.
#[derive(thiserror::Error, Debug, PartialEq)]
#[error("Compared value is not an image reference.")]
pub struct TypeMismatch;

/// Reference to an image in an OCI registry, split into its five
/// components.
///
/// The written form is `registry/namespace/repository:tag@digest`,
/// where every component except the repository may be absent. An
/// absent component is stored as the empty string, so the type has no
/// optional fields.
///
/// The digest is validated on every write: only `sha256:` with 64
/// lowercase hex digits and `sha512:` with 128 are accepted. The other
/// four components are plain fields.
///
/// # Examples
///
/// ```
/// # use oci_reference::*;
/// let reference = ImageReference::parse("reg.example.com:5000/org/app:1.2.3").unwrap();
///
/// assert_eq!(reference.registry, "reg.example.com:5000");
/// assert_eq!(reference.namespace, "org");
/// assert_eq!(reference.repository, "app");
/// assert_eq!(reference.tag, "1.2.3");
/// assert_eq!(reference.digest(), "");
///
/// assert_eq!(reference.to_string(), "reg.example.com:5000/org/app:1.2.3");
/// ```
///
/// ```
/// # use oci_reference::*;
/// let reference = ImageReference::new("ubuntu").with_tag("22.04");
///
/// assert_eq!(reference.to_string(), "ubuntu:22.04");
/// ```
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageReference {
    /// Address of the registry server, with an optional port.
    pub registry: String,

    /// Path segment grouping repositories under the registry.
    pub namespace: String,

    /// Image name, possibly with embedded `/`.
    pub repository: String,

    /// Image tag.
    pub tag: String,

    digest: String,
}

impl ImageReference {
    /// Create a reference to `repository`, with every other component
    /// empty.
    pub fn new(repository: impl Into<String>) -> Self {
        ImageReference {
            repository: repository.into(),
            ..Default::default()
        }
    }

    /// Parse a reference from its written form.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_reference::*;
    /// let reference = ImageReference::parse("localhost/ubuntu").unwrap();
    ///
    /// assert_eq!(reference.registry, "localhost");
    /// assert_eq!(reference.repository, "ubuntu");
    /// ```
    pub fn parse(reference: &str) -> Result<Self, ParseError> {
        parser::parse(reference)
    }

    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = registry.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Set the digest, like [`set_digest`](Self::set_digest), and
    /// return the reference.
    pub fn with_digest(mut self, digest: impl Into<String>) -> Result<Self, ValidationError> {
        self.set_digest(digest)?;
        Ok(self)
    }

    /// Digest pinning this reference, or an empty string.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Replace the digest.
    ///
    /// A non-empty value must be a valid digest. The empty string
    /// always succeeds, and clears the digest.
    pub fn set_digest(&mut self, value: impl Into<String>) -> Result<(), ValidationError> {
        let value = value.into();
        if !value.is_empty() {
            digest::validate(&value)?;
        }

        self.digest = value;
        Ok(())
    }

    /// Algorithm of the current digest, or `None` if there is no
    /// digest.
    pub fn digest_algorithm(&self) -> Option<DigestAlgorithm> {
        if self.digest.is_empty() {
            None
        } else {
            digest::validate(&self.digest).ok()
        }
    }

    /// The five components as `(key, value)` pairs, in rendering
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_reference::*;
    /// let reference = ImageReference::parse("reg.io/org/app").unwrap();
    ///
    /// assert_eq!(
    ///     reference.as_map(),
    ///     [
    ///         ("registry", "reg.io"),
    ///         ("namespace", "org"),
    ///         ("repository", "app"),
    ///         ("tag", ""),
    ///         ("digest", ""),
    ///     ]
    /// );
    /// ```
    pub fn as_map(&self) -> [(&'static str, &str); 5] {
        [
            ("registry", self.registry.as_str()),
            ("namespace", self.namespace.as_str()),
            ("repository", self.repository.as_str()),
            ("tag", self.tag.as_str()),
            ("digest", self.digest.as_str()),
        ]
    }

    /// Compare against a value of any type.
    ///
    /// Returns [`TypeMismatch`] when `other` is not an
    /// `ImageReference`, instead of treating the operands as unequal.
    ///
    /// # Examples
    ///
    /// ```
    /// # use oci_reference::*;
    /// let reference = ImageReference::parse("app:9.3").unwrap();
    ///
    /// assert_eq!(reference.eq_any(&reference.clone()), Ok(true));
    /// assert!(reference.eq_any(&"app:9.3").is_err());
    /// ```
    pub fn eq_any(&self, other: &dyn Any) -> Result<bool, TypeMismatch> {
        match other.downcast_ref::<Self>() {
            Some(that) => Ok(self == that),
            None => Err(TypeMismatch),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separate = false;
        for part in [&self.registry, &self.namespace, &self.repository] {
            if part.is_empty() {
                continue;
            }
            if separate {
                f.write_str("/")?;
            }
            f.write_str(part)?;
            separate = true;
        }

        if !self.tag.is_empty() {
            write!(f, ":{}", self.tag)?;
        }

        if !self.digest.is_empty() {
            write!(f, "@{}", self.digest)?;
        }

        Ok(())
    }
}

impl FromStr for ImageReference {
    type Err = ParseError;

    fn from_str(reference: &str) -> Result<Self, Self::Err> {
        parser::parse(reference)
    }
}

impl TryFrom<&str> for ImageReference {
    type Error = ParseError;

    fn try_from(reference: &str) -> Result<Self, Self::Error> {
        parser::parse(reference)
    }
}

impl TryFrom<String> for ImageReference {
    type Error = ParseError;

    fn try_from(reference: String) -> Result<Self, Self::Error> {
        parser::parse(&reference)
    }
}

impl From<ImageReference> for String {
    fn from(reference: ImageReference) -> String {
        reference.to_string()
    }
}

#[test]
fn digest_is_validated_on_every_write() {
    let err = ImageReference::new("app").with_digest("sha:123").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDigest(v) if v == "sha:123"));

    let mut reference = ImageReference::new("app");
    assert!(reference.set_digest("sha256:1234afe3").is_err());
    assert_eq!(reference.digest(), "");

    let digest = format!("sha256:{:064}", 0);
    reference.set_digest(digest.clone()).unwrap();
    assert_eq!(reference.digest(), digest);
    assert_eq!(reference.digest_algorithm(), Some(DigestAlgorithm::SHA256));

    reference.set_digest("").unwrap();
    assert_eq!(reference.digest(), "");
    assert_eq!(reference.digest_algorithm(), None);
}

#[test]
fn render_skips_empty_components() {
    let reference = ImageReference::new("ubuntu")
        .with_registry("docker.io")
        .with_tag("22.04");

    assert_eq!(reference.to_string(), "docker.io/ubuntu:22.04");

    assert_eq!(ImageReference::default().to_string(), "");
}
