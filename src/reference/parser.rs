//! Parser for image reference strings.
//!
//! The grammar is ambiguous: a leading `reg.io` may be a registry or a
//! repository, and a `:` may separate a tag, a registry port, or the
//! algorithm of a digest. The parser runs in two phases:
//!
//! 1. [`tokenize`] scans the input once, from the last character to the
//!    first, and collects the name path segments plus the optional tag
//!    and digest. It assigns no meaning to the segments.
//! 2. [`classify`] decides which segments are the registry, the
//!    namespace, and the repository.

use super::*;

type Result<T> = std::result::Result<T, ParseError>;

pub(super) fn parse(reference: &str) -> Result<ImageReference> {
    let tokens = tokenize(reference)?;
    let (registry, namespace, repository) = classify(&tokens.segments);

    let reference = ImageReference {
        registry: registry.to_owned(),
        namespace: namespace.to_owned(),
        repository,
        tag: tokens.tag.to_owned(),
        digest: String::new(),
    };

    Ok(reference.with_digest(tokens.digest)?)
}

/// Output of [`tokenize`], before any meaning is assigned to the name
/// path segments.
struct Tokens<'a> {
    /// Name path segments, in left-to-right order. Never empty.
    segments: Vec<&'a str>,

    tag: &'a str,

    digest: &'a str,
}

/// Split `s` into name path segments, tag, and digest, scanning from
/// the last character to the first.
///
/// Any segment required by the grammar that turns out to be empty is
/// a [`ParseError::MissingComponent`].
fn tokenize(s: &str) -> Result<Tokens<'_>> {
    let mut segments = Vec::new();
    let mut tag = "";
    let mut digest = "";

    // Rightmost-segment colon candidate. It may turn out to be a tag
    // separator, a registry port, or part of a digest.
    let mut colon = None;
    let mut slashes = 0;

    // Exclusive end of the text not yet attributed.
    let mut end = s.len();

    for (pos, c) in s.char_indices().rev() {
        match c {
            ':' => colon = Some(pos),

            '@' => {
                // Everything to the right is the digest. A colon seen
                // so far separates the digest algorithm, not a tag.
                digest = &s[pos + 1..end];
                colon = None;
                end = pos;
            }

            '/' => {
                slashes += 1;

                let mut segment = &s[pos + 1..end];
                if slashes == 1 {
                    if let Some(colon) = colon {
                        // Rightmost segment boundary: the text after
                        // the colon candidate is the tag.
                        tag = &s[colon + 1..end];
                        segment = &s[pos + 1..colon];
                    }
                }

                if segment.is_empty() {
                    return Err(ParseError::MissingComponent("empty path segment"));
                }

                segments.push(segment);
                end = pos;
            }

            _ => {}
        }
    }

    // The remaining text is the leftmost segment.
    let mut segment = &s[..end];
    if slashes == 0 {
        if let Some(colon) = colon {
            if colon == 0 {
                return Err(ParseError::MissingComponent("no repository before tag"));
            }

            tag = &s[colon + 1..end];
            segment = &s[..colon];
        }
    }

    if segment.is_empty() {
        return Err(ParseError::MissingComponent("empty path segment"));
    }

    segments.push(segment);
    segments.reverse();

    Ok(Tokens { segments, tag, digest })
}

/// Decide which of the name path segments are the registry, the
/// namespace, and the repository.
///
/// Only the leftmost segment of a multi-segment reference can be a
/// registry, and only when it passes [`looks_like_a_registry`]. After
/// that, the leftmost remaining segment is the namespace when more
/// than one remains. Everything else is the repository.
fn classify<'a>(segments: &[&'a str]) -> (&'a str, &'a str, String) {
    let mut segments = segments;

    let mut registry = "";
    if segments.len() > 1 && looks_like_a_registry(segments[0]) {
        registry = segments[0];
        segments = &segments[1..];
    }

    let mut namespace = "";
    if segments.len() > 1 {
        namespace = segments[0];
        segments = &segments[1..];
    }

    (registry, namespace, segments.join("/"))
}

/// Check if `s` is the literal `localhost`, or a hostname containing
/// at least one dot, with an optional `:port` suffix.
///
/// The first hostname label must be alphanumeric. The labels after a
/// dot also accept `_` and `-`.
fn looks_like_a_registry(s: &str) -> bool {
    if s == "localhost" {
        return true;
    }

    let host = match s.split_once(':') {
        Some((host, port)) => {
            if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            host
        }

        None => s,
    };

    let mut labels = host.split('.');

    match labels.next() {
        Some(first) if !first.is_empty() => {
            if !first.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return false;
            }
        }
        _ => return false,
    }

    let mut dotted = 0;
    for label in labels {
        let valid = !label.is_empty()
            && label
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');

        if !valid {
            return false;
        }

        dotted += 1;
    }

    dotted > 0
}

#[test]
fn registry_lookalikes() {
    assert!(looks_like_a_registry("localhost"));
    assert!(looks_like_a_registry("reg.io"));
    assert!(looks_like_a_registry("reg.comp.io"));
    assert!(looks_like_a_registry("reg.io:3000"));
    assert!(looks_like_a_registry("reg.my_comp-1.io"));

    // A port alone does not make a registry.
    assert!(!looks_like_a_registry("localhost:5000"));
    assert!(!looks_like_a_registry("app:3000"));

    assert!(!looks_like_a_registry("org"));
    assert!(!looks_like_a_registry(""));
    assert!(!looks_like_a_registry(".io"));
    assert!(!looks_like_a_registry("reg..io"));
    assert!(!looks_like_a_registry("my_reg.io"));
    assert!(!looks_like_a_registry("reg.io:"));
    assert!(!looks_like_a_registry("reg.io:80a"));
    assert!(!looks_like_a_registry("reg.io:80:80"));
}

#[test]
fn split_tag_at_the_first_colon_candidate() {
    let tokens = tokenize("app:1:2").unwrap();
    assert_eq!(tokens.segments, ["app"]);
    assert_eq!(tokens.tag, "1:2");

    // An empty tag is accepted. Only name path segments are required
    // to be non-empty.
    let tokens = tokenize("app:").unwrap();
    assert_eq!(tokens.segments, ["app"]);
    assert_eq!(tokens.tag, "");
}

#[test]
fn colon_candidates_outside_the_rightmost_segment_are_kept() {
    let tokens = tokenize("reg.io:3000/ubi:9.3").unwrap();
    assert_eq!(tokens.segments, ["reg.io:3000", "ubi"]);
    assert_eq!(tokens.tag, "9.3");

    // Not a registry, so the port-looking text stays in the segment.
    let tokens = tokenize("a:1/b/c").unwrap();
    assert_eq!(tokens.segments, ["a:1", "b", "c"]);
    assert_eq!(tokens.tag, "");
}

#[test]
fn digest_resets_the_colon_candidate() {
    let digest = format!("sha256:{:064}", 0);

    let input = format!("app@{digest}");
    let tokens = tokenize(&input).unwrap();
    assert_eq!(tokens.segments, ["app"]);
    assert_eq!(tokens.tag, "");
    assert_eq!(tokens.digest, digest);

    let input = format!("app:9.3@{digest}");
    let tokens = tokenize(&input).unwrap();
    assert_eq!(tokens.segments, ["app"]);
    assert_eq!(tokens.tag, "9.3");
    assert_eq!(tokens.digest, digest);
}

#[test]
fn classify_multi_segment_names() {
    assert_eq!(
        classify(&["reg.io", "org", "tenant", "ubi"]),
        ("reg.io", "org", "tenant/ubi".to_owned())
    );

    assert_eq!(classify(&["localhost", "ubuntu"]), ("localhost", "", "ubuntu".to_owned()));

    assert_eq!(classify(&["library", "ubuntu"]), ("", "library", "ubuntu".to_owned()));

    // A single segment is never checked against the registry pattern.
    assert_eq!(classify(&["reg.io"]), ("", "", "reg.io".to_owned()));
}
