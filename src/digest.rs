/// Algorithm of a digest pinning an image reference.
///
/// # Examples
///
/// ```
/// # use oci_reference::*;
/// const DIGEST: &str = "sha256:b330d9e6aa681d5fe2b11fcfe0ca51e1801d837dd26804b0ead9a09ca8246c40";
///
/// let reference = ImageReference::new("app").with_digest(DIGEST).unwrap();
/// assert_eq!(reference.digest_algorithm(), Some(DigestAlgorithm::SHA256));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum DigestAlgorithm {
    SHA256,
    SHA512,
}

/// Errors from digest validation.
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Value {0} is not a valid sha256 or sha512 digest.")]
    InvalidDigest(String),
}

/// Check that `value` is `algorithm:hash`, where the algorithm is one of
/// the two accepted ones, and the hash is a lowercase hexadecimal string
/// of the exact length for that algorithm.
pub(crate) fn validate(value: &str) -> Result<DigestAlgorithm, ValidationError> {
    let (algorithm, hash, expected_size) = {
        if let Some(h) = value.strip_prefix("sha256:") {
            (DigestAlgorithm::SHA256, h, 256 / 8 * 2)
        } else if let Some(h) = value.strip_prefix("sha512:") {
            (DigestAlgorithm::SHA512, h, 512 / 8 * 2)
        } else {
            return Err(ValidationError::InvalidDigest(value.to_owned()));
        }
    };

    if hash.len() == expected_size && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        Ok(algorithm)
    } else {
        Err(ValidationError::InvalidDigest(value.to_owned()))
    }
}

#[test]
fn accept_both_algorithms() {
    assert_eq!(
        validate(&format!("sha256:{:064}", 0)).unwrap(),
        DigestAlgorithm::SHA256
    );

    assert_eq!(
        validate(&format!("sha512:{:0128}", 0)).unwrap(),
        DigestAlgorithm::SHA512
    );
}

#[test]
fn reject_invalid_values() {
    macro_rules! rejected {
        ($value:expr) => {
            assert!(matches!(
                validate($value),
                Err(ValidationError::InvalidDigest(_))
            ))
        };
    }

    rejected!("sha:123");
    rejected!("md5:00000000000000000000000000000000");
    rejected!("sha256:1234afe3");
    rejected!(&format!("sha512:{:064}", 0));
    rejected!(&format!("sha256:{:063}x", 0));

    // Hash values are lowercase.
    rejected!(&format!("sha256:{:063}A", 0));

    let err = validate("sha:123").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Value sha:123 is not a valid sha256 or sha512 digest."
    );
}
