use oci_reference::{ImageReference, ParseError, ValidationError};

const FAKE_DIGEST: &str = "sha256:b330d9e6aa681d5fe2b11fcfe0ca51e1801d837dd26804b0ead9a09ca8246c40";

/// Encode `data` as a lowercase hex string.
fn hex(data: impl AsRef<[u8]>) -> String {
    use std::fmt::Write;

    data.as_ref().iter().fold(String::new(), |mut out, byte| {
        let _ = write!(&mut out, "{byte:02x}");
        out
    })
}

#[test]
fn parse_reference_components() {
    macro_rules! check {
        ($reference:expr, [ $registry:expr, $namespace:expr, $repository:expr, $tag:expr, $digest:expr ]) => {{
            let reference = ImageReference::parse(<_ as AsRef<str>>::as_ref(&$reference)).unwrap();
            assert_eq!(
                (
                    reference.registry.as_str(),
                    reference.namespace.as_str(),
                    reference.repository.as_str(),
                    reference.tag.as_str(),
                    reference.digest(),
                ),
                ($registry, $namespace, $repository, $tag, $digest),
                "input: {}",
                $reference,
            );
        }};
    }

    check!("ubuntu", ["", "", "ubuntu", "", ""]);
    check!("ubuntu:22.04", ["", "", "ubuntu", "22.04", ""]);
    check!("ubuntu:latest", ["", "", "ubuntu", "latest", ""]);
    check!("localhost/ubuntu", ["localhost", "", "ubuntu", "", ""]);
    check!("library/ubuntu", ["", "library", "ubuntu", "", ""]);
    check!("app:3000", ["", "", "app", "3000", ""]);

    // A port-looking suffix in a single-segment name is a tag.
    check!("reg.io:3000", ["", "", "reg.io", "3000", ""]);

    check!("reg.io/ubi:9.3", ["reg.io", "", "ubi", "9.3", ""]);
    check!("reg.comp.io/ubi:9.3", ["reg.comp.io", "", "ubi", "9.3", ""]);
    check!("reg.io:3000/ubi:9.3", ["reg.io:3000", "", "ubi", "9.3", ""]);

    // A digest needs the `@` marker. A bare colon is a tag separator.
    check!("sha256:1234afe3", ["", "", "sha256", "1234afe3", ""]);
    check!("org/sha256:1234afe3", ["", "org", "sha256", "1234afe3", ""]);
    check!("org/app/sha256:1234afe3", ["", "org", "app/sha256", "1234afe3", ""]);

    // Multiple path components in the name.
    check!("reg.io/org/ubi:9.3", ["reg.io", "org", "ubi", "9.3", ""]);
    check!("reg.io/org/tenant/ubi:9.3", ["reg.io", "org", "tenant/ubi", "9.3", ""]);
    check!(
        "reg.comp.io:3000/org/tenant/ubi:9.3",
        ["reg.comp.io:3000", "org", "tenant/ubi", "9.3", ""]
    );

    // With a digest.
    check!(
        format!("reg.io/org/ubi@{FAKE_DIGEST}"),
        ["reg.io", "org", "ubi", "", FAKE_DIGEST]
    );
    check!(
        format!("reg.io/org/ubi:9.3@{FAKE_DIGEST}"),
        ["reg.io", "org", "ubi", "9.3", FAKE_DIGEST]
    );
}

#[test]
fn parse_generated_digests() {
    use sha2::{Digest as _, Sha256, Sha512};

    let sha256 = hex(Sha256::digest(b"\x00\x01"));
    let reference = ImageReference::parse(&format!("reg.io/app@sha256:{sha256}")).unwrap();
    assert_eq!(reference.digest(), format!("sha256:{sha256}"));
    assert_eq!(reference.tag, "");

    let sha512 = hex(Sha512::digest(b"\x01\x02"));
    let reference = ImageReference::parse(&format!("reg.io/app:1.2@sha512:{sha512}")).unwrap();
    assert_eq!(reference.digest(), format!("sha512:{sha512}"));
    assert_eq!(reference.tag, "1.2");
}

#[test]
fn missing_name_components() {
    macro_rules! rejected {
        ($reference:expr) => {{
            let reference = $reference;
            let reference = <_ as AsRef<str>>::as_ref(&reference);
            assert!(
                matches!(
                    ImageReference::parse(reference),
                    Err(ParseError::MissingComponent(_)),
                ),
                "input: {}",
                reference,
            );
        }};
    }

    rejected!("");
    rejected!("app/:9.3");
    rejected!("reg.io/app/:9.3");
    rejected!(format!("reg.io/app/:9.3@{FAKE_DIGEST}"));
    rejected!("reg.io/org/app/:9.3");
    rejected!("reg.io/org//app:9.3");
    rejected!("/reg.io/org/app:9.3");
    rejected!(":9.3");
}

#[test]
fn parse_rejects_invalid_digests() {
    assert!(matches!(
        ImageReference::parse("reg.io/app@sha:123"),
        Err(ParseError::InvalidDigest(_)),
    ));

    // Uppercase hex digits are not valid in a digest.
    let uppercase = format!("app@sha256:{}", FAKE_DIGEST["sha256:".len()..].to_uppercase());
    assert!(matches!(
        ImageReference::parse(&uppercase),
        Err(ParseError::InvalidDigest(_)),
    ));
}

#[test]
fn render_canonical_form() {
    macro_rules! check {
        ($reference:expr, $expected:expr) => {
            assert_eq!($reference.to_string(), $expected)
        };
    }

    check!(ImageReference::new(""), "");
    check!(ImageReference::new("ubuntu"), "ubuntu");
    check!(ImageReference::new("ubuntu").with_namespace("library"), "library/ubuntu");
    check!(
        ImageReference::new("ubuntu")
            .with_namespace("library")
            .with_registry("docker.io"),
        "docker.io/library/ubuntu"
    );
    check!(ImageReference::new("ubuntu").with_tag("22.04"), "ubuntu:22.04");
    check!(ImageReference::new("ubuntu").with_tag("latest"), "ubuntu:latest");
    check!(
        ImageReference::new("ubuntu")
            .with_namespace("library")
            .with_registry("docker.io")
            .with_tag("22.04"),
        "docker.io/library/ubuntu:22.04"
    );
    check!(
        ImageReference::new("ubuntu")
            .with_tag("22.04")
            .with_digest(FAKE_DIGEST)
            .unwrap(),
        format!("ubuntu:22.04@{FAKE_DIGEST}")
    );
    check!(
        ImageReference::new("ubuntu").with_digest(FAKE_DIGEST).unwrap(),
        format!("ubuntu@{FAKE_DIGEST}")
    );
    check!(
        ImageReference::new("ubuntu")
            .with_registry("reg.io")
            .with_digest(FAKE_DIGEST)
            .unwrap(),
        format!("reg.io/ubuntu@{FAKE_DIGEST}")
    );

    // Multi-segment repository name.
    check!(
        ImageReference::new("org/user/app")
            .with_registry("reg.io")
            .with_tag("9.3"),
        "reg.io/org/user/app:9.3"
    );
}

#[test]
fn parse_round_trips_with_render() {
    let corpus = [
        "ubuntu".to_owned(),
        "ubuntu:22.04".to_owned(),
        "localhost/ubuntu".to_owned(),
        "library/ubuntu".to_owned(),
        "reg.io:3000/ubi:9.3".to_owned(),
        "reg.io/org/tenant/ubi:9.3".to_owned(),
        format!("reg.io/org/ubi@{FAKE_DIGEST}"),
        format!("reg.io/org/ubi:9.3@{FAKE_DIGEST}"),
    ];

    for reference in corpus {
        let parsed = ImageReference::parse(&reference).unwrap();
        assert_eq!(parsed.to_string(), reference);
        assert_eq!(ImageReference::parse(&parsed.to_string()).unwrap(), parsed);
    }
}

#[test]
fn direct_construction_validates_digests() {
    let err = ImageReference::new("app").with_digest("sha:123").unwrap_err();
    assert!(matches!(err, ValidationError::InvalidDigest(value) if value == "sha:123"));

    let reference = ImageReference::new("app")
        .with_registry("reg.io")
        .with_tag("9.3")
        .with_digest(FAKE_DIGEST)
        .unwrap();

    assert_eq!(reference.registry, "reg.io");
    assert_eq!(reference.namespace, "");
    assert_eq!(reference.repository, "app");
    assert_eq!(reference.tag, "9.3");
    assert_eq!(reference.digest(), FAKE_DIGEST);
}

#[test]
fn equality_is_field_wise() {
    let parsed = ImageReference::parse(&format!("reg.io/org/room/app:9.3@{FAKE_DIGEST}")).unwrap();
    let built = ImageReference::new("room/app")
        .with_registry("reg.io")
        .with_namespace("org")
        .with_tag("9.3")
        .with_digest(FAKE_DIGEST)
        .unwrap();

    assert_eq!(parsed, built);
    assert_eq!(built, parsed);

    // Any field breaks the equality.
    assert_ne!(parsed, built.clone().with_tag("9.4"));
    assert_ne!(parsed, built.clone().with_namespace(""));
    assert_ne!(
        parsed,
        built.clone().with_digest(FAKE_DIGEST.replace('0', "1")).unwrap()
    );

    assert_ne!(
        ImageReference::parse("ubuntu").unwrap(),
        ImageReference::new("ubuntu")
            .with_registry("docker.io")
            .with_namespace("library")
    );
}

#[test]
fn equality_against_other_types_is_an_error() {
    let reference = ImageReference::parse("app:9.3").unwrap();

    assert_eq!(reference.eq_any(&reference.clone()), Ok(true));
    assert_eq!(
        reference.eq_any(&ImageReference::parse("app:9.4").unwrap()),
        Ok(false)
    );

    assert!(reference.eq_any(&"app:9.3").is_err());
    assert!(reference.eq_any(&String::from("app:9.3")).is_err());
    assert!(reference.eq_any(&42).is_err());
}

#[test]
fn clones_are_independent() {
    let original = ImageReference::parse(&format!("reg.io/org/app:9.3@{FAKE_DIGEST}")).unwrap();
    let mut copy = original.clone();

    assert_eq!(copy, original);

    copy.tag = "10.0".to_owned();
    copy.set_digest("").unwrap();

    assert_eq!(original.tag, "9.3");
    assert_eq!(original.digest(), FAKE_DIGEST);
    assert_ne!(copy, original);
}

#[test]
fn export_as_ordered_map() {
    let reference = ImageReference::parse(&format!("reg.io/org/app:9.3@{FAKE_DIGEST}")).unwrap();

    assert_eq!(
        reference.as_map(),
        [
            ("registry", "reg.io"),
            ("namespace", "org"),
            ("repository", "app"),
            ("tag", "9.3"),
            ("digest", FAKE_DIGEST),
        ]
    );

    assert_eq!(
        ImageReference::new("app").as_map(),
        [
            ("registry", ""),
            ("namespace", ""),
            ("repository", "app"),
            ("tag", ""),
            ("digest", ""),
        ]
    );
}

#[test]
fn references_in_json() {
    let source = format!("\"reg.io/org/app:9.3@{FAKE_DIGEST}\"");

    let reference: ImageReference = serde_json::from_str(&source).unwrap();
    assert_eq!(reference.repository, "app");
    assert_eq!(reference.digest(), FAKE_DIGEST);

    assert_eq!(serde_json::to_string(&reference).unwrap(), source);

    assert!(serde_json::from_str::<ImageReference>("\"reg.io/app@sha:12\"").is_err());
    assert!(serde_json::from_str::<ImageReference>("\":9.3\"").is_err());
}

#[test]
fn parse_via_conversion_traits() {
    let reference: ImageReference = "reg.io/app:9.3".parse().unwrap();
    assert_eq!(reference.repository, "app");

    assert_eq!(ImageReference::try_from("reg.io/app:9.3").unwrap(), reference);
    assert_eq!(String::from(reference.clone()), "reg.io/app:9.3");
}
