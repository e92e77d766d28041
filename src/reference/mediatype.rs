use std::{fmt, str::FromStr};

/// Generate a media-type enum, its `FromStr`, `Display`, and
/// `Deserialize` implementations, and the associated constant `ALL`
/// with all the valid values.
macro_rules! media_types {
    ($(#[$doc:meta])* $name:ident { $($variant:ident = $mediatype:expr,)* }) => {
        $(#[$doc])*
        #[non_exhaustive]
        #[derive(Copy, Clone, PartialEq, Debug)]
        pub enum $name {
            $(
                #[doc = concat!("Variant for `", $mediatype, "`.")]
                $variant,
            )*
        }

        impl $name {
            /// List with all the media types in this enum.
            pub const ALL: &'static [&'static str] = &[ $($mediatype),* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $mediatype,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = InvalidMediaType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($mediatype => Ok($name::$variant),)*
                    _ => Err(InvalidMediaType),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct Visitor;

                impl<'de> serde::de::Visitor<'de> for Visitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str("Media type for OCI/Docker objects.")
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        v.parse().map_err(|_| E::custom(format!("Unknown type: {v}")))
                    }
                }

                deserializer.deserialize_str(Visitor)
            }
        }
    }
}

media_types!(
    /// Media types defined by the OCI image spec v1.
    ///
    /// Described in `media-types.md#oci-image-media-types` under
    /// `opencontainers/image-spec`.
    OciMediaType {
        ImageManifest = "application/vnd.oci.image.manifest.v1+json",
        ImageIndex = "application/vnd.oci.image.index.v1+json",
        ImageConfig = "application/vnd.oci.image.config.v1+json",
        LayerTar = "application/vnd.oci.image.layer.v1.tar",
        LayerTarGzip = "application/vnd.oci.image.layer.v1.tar+gzip",
        LayerTarZstd = "application/vnd.oci.image.layer.v1.tar+zstd",
        Descriptor = "application/vnd.oci.descriptor.v1+json",
        LayoutHeader = "application/vnd.oci.layout.header.v1+json",
        Empty = "application/vnd.oci.empty.v1+json",
        LayerNondistributableTar = "application/vnd.oci.image.layer.nondistributable.v1.tar",
        LayerNondistributableTarGzip = "application/vnd.oci.image.layer.nondistributable.v1.tar+gzip",
        LayerNondistributableTarZstd = "application/vnd.oci.image.layer.nondistributable.v1.tar+zstd",
    }
);

media_types!(
    /// Media types defined by Image Manifest Version 2, Schema 2.
    ///
    /// Described in `manifest-v2-2.md#media-types` under
    /// `distribution/distribution`.
    DockerMediaType {
        ManifestV2 = "application/vnd.docker.distribution.manifest.v2+json",
        ManifestListV2 = "application/vnd.docker.distribution.manifest.list.v2+json",
        ContainerConfig = "application/vnd.docker.container.image.v1+json",
        LayerTarGzip = "application/vnd.docker.image.rootfs.diff.tar.gzip",
    }
);

/// Error from `FromStr` when the string is not in the catalogue.
#[derive(thiserror::Error, Debug)]
#[error("Unknown media type.")]
pub struct InvalidMediaType;

/// Compatibility matrix between the OCI image spec and the Image
/// Manifest V2 S2 media types.
///
/// Described in `media-types.md#compatibility-matrix` under
/// `opencontainers/image-spec`.
pub const COMPATIBLE_MEDIA_TYPES: [(OciMediaType, DockerMediaType); 4] = [
    (OciMediaType::ImageManifest, DockerMediaType::ManifestV2),
    (OciMediaType::ImageIndex, DockerMediaType::ManifestListV2),
    (OciMediaType::ImageConfig, DockerMediaType::ContainerConfig),
    (OciMediaType::LayerTarGzip, DockerMediaType::LayerTarGzip),
];

impl OciMediaType {
    /// The Docker media type compatible with this one, if any.
    pub fn docker_compatible(self) -> Option<DockerMediaType> {
        COMPATIBLE_MEDIA_TYPES
            .iter()
            .find(|(oci, _)| *oci == self)
            .map(|(_, docker)| *docker)
    }
}

impl DockerMediaType {
    /// The OCI media type compatible with this one, if any.
    pub fn oci_compatible(self) -> Option<OciMediaType> {
        COMPATIBLE_MEDIA_TYPES
            .iter()
            .find(|(_, docker)| *docker == self)
            .map(|(oci, _)| *oci)
    }
}

#[test]
fn media_type_strings() {
    assert_eq!(
        "application/vnd.oci.image.index.v1+json".parse::<OciMediaType>().ok(),
        Some(OciMediaType::ImageIndex)
    );

    assert_eq!(
        "application/vnd.docker.container.image.v1+json".parse::<DockerMediaType>().ok(),
        Some(DockerMediaType::ContainerConfig)
    );

    assert!("text/plain".parse::<OciMediaType>().is_err());

    assert_eq!(OciMediaType::ALL.len(), 12);
    assert_eq!(DockerMediaType::ALL.len(), 4);

    for mediatype in OciMediaType::ALL {
        assert_eq!(mediatype.parse::<OciMediaType>().unwrap().as_str(), *mediatype);
    }
}

#[test]
fn compatible_types() {
    assert_eq!(
        OciMediaType::ImageManifest.docker_compatible(),
        Some(DockerMediaType::ManifestV2)
    );

    assert_eq!(
        DockerMediaType::LayerTarGzip.oci_compatible(),
        Some(OciMediaType::LayerTarGzip)
    );

    assert_eq!(OciMediaType::LayerTarZstd.docker_compatible(), None);
}

#[test]
fn media_type_in_json() {
    #[derive(serde::Deserialize, Debug)]
    struct Example {
        mt: OciMediaType,
    }

    assert!(matches!(
        serde_json::from_str(r#"{"mt": "application/vnd.oci.image.index.v1+json"}"#),
        Ok(Example {
            mt: OciMediaType::ImageIndex
        })
    ));
}
