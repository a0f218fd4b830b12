//! VLNV identity keys.
//!
//! Every IP-XACT document is identified by a vendor, library, name, and
//! version. The canonical text form is `vendor:library:name:version`.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// The kind of document a VLNV identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VlnvType {
    /// Not set.
    #[default]
    Invalid,
    BusDefinition,
    AbstractionDefinition,
    Component,
    Design,
    DesignConfiguration,
    Catalog,
    GeneratorChain,
}

impl VlnvType {
    /// Root element local name used for this document type.
    pub fn as_str(self) -> &'static str {
        match self {
            VlnvType::Invalid => "invalid",
            VlnvType::BusDefinition => "busDefinition",
            VlnvType::AbstractionDefinition => "abstractionDefinition",
            VlnvType::Component => "component",
            VlnvType::Design => "design",
            VlnvType::DesignConfiguration => "designConfiguration",
            VlnvType::Catalog => "catalog",
            VlnvType::GeneratorChain => "generatorChain",
        }
    }
}

impl fmt::Display for VlnvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VlnvType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "busDefinition" => Ok(VlnvType::BusDefinition),
            "abstractionDefinition" => Ok(VlnvType::AbstractionDefinition),
            "component" => Ok(VlnvType::Component),
            "design" => Ok(VlnvType::Design),
            "designConfiguration" => Ok(VlnvType::DesignConfiguration),
            "catalog" => Ok(VlnvType::Catalog),
            "generatorChain" => Ok(VlnvType::GeneratorChain),
            other => Err(ModelError::UnknownVlnvType(other.to_string())),
        }
    }
}

/// A vendor/library/name/version identifier.
///
/// Equality, ordering, and hashing consider the four text fields only; the
/// type tag describes what the key points at but is not part of its identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Vlnv {
    /// Document kind this key refers to.
    pub kind: VlnvType,
    /// Vendor, usually a reversed domain name.
    pub vendor: String,
    /// Library within the vendor.
    pub library: String,
    /// Document name.
    pub name: String,
    /// Version string.
    pub version: String,
}

impl Vlnv {
    /// Create a typed VLNV.
    pub fn new(
        kind: VlnvType,
        vendor: impl Into<String>,
        library: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Vlnv {
            kind,
            vendor: vendor.into(),
            library: library.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse the canonical form and tag the result with `kind`.
    pub fn parse_typed(s: &str, kind: VlnvType) -> Result<Self, ModelError> {
        let mut vlnv: Vlnv = s.parse()?;
        vlnv.kind = kind;
        Ok(vlnv)
    }

    /// Whether all four parts are non-empty.
    pub fn is_valid(&self) -> bool {
        self.parts().iter().all(|part| !part.trim().is_empty())
    }

    /// Whether any part has been given a value.
    ///
    /// An entirely empty VLNV is the "not set" state used for optional
    /// references such as `extends`.
    pub fn is_set(&self) -> bool {
        self.parts().iter().any(|part| !part.is_empty())
    }

    /// The four parts in canonical order.
    pub fn parts(&self) -> [&str; 4] {
        [
            self.vendor.as_str(),
            self.library.as_str(),
            self.name.as_str(),
            self.version.as_str(),
        ]
    }

    /// Conventional file name for the document, `name.version.xml`.
    pub fn file_name(&self) -> String {
        format!("{}.{}.xml", self.name, self.version)
    }
}

impl PartialEq for Vlnv {
    fn eq(&self, other: &Self) -> bool {
        self.parts() == other.parts()
    }
}

impl Eq for Vlnv {}

impl Hash for Vlnv {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts().hash(state);
    }
}

impl PartialOrd for Vlnv {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vlnv {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts().cmp(&other.parts())
    }
}

impl fmt::Display for Vlnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.vendor, self.library, self.name, self.version
        )
    }
}

impl FromStr for Vlnv {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [vendor, library, name, version] => Ok(Vlnv::new(
                VlnvType::Invalid,
                *vendor,
                *library,
                *name,
                *version,
            )),
            _ => Err(ModelError::InvalidVlnv {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn sample() -> Vlnv {
        Vlnv::new(VlnvType::BusDefinition, "tut.fi", "ip.hw", "bus", "1.0")
    }

    #[test]
    fn canonical_string_round_trips() {
        let vlnv = sample();
        assert_eq!(vlnv.to_string(), "tut.fi:ip.hw:bus:1.0");
        let parsed: Vlnv = "tut.fi:ip.hw:bus:1.0".parse().unwrap();
        assert_eq!(parsed, vlnv);
    }

    #[test]
    fn parse_rejects_wrong_part_count() {
        let err = "tut.fi:ip.hw:bus".parse::<Vlnv>().unwrap_err();
        assert!(matches!(err, ModelError::InvalidVlnv { .. }));
        assert!("a:b:c:d:e".parse::<Vlnv>().is_err());
    }

    #[test]
    fn identity_ignores_type_tag() {
        let mut other = sample();
        other.kind = VlnvType::Component;
        assert_eq!(sample(), other);

        let set: HashSet<Vlnv> = [sample(), other].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn validity_requires_every_part() {
        assert!(sample().is_valid());
        let mut missing = sample();
        missing.version = " ".into();
        assert!(!missing.is_valid());
        assert!(missing.is_set());
        assert!(!Vlnv::default().is_set());
    }

    #[test]
    fn type_names_parse_back() {
        for kind in [
            VlnvType::BusDefinition,
            VlnvType::AbstractionDefinition,
            VlnvType::Component,
        ] {
            assert_eq!(kind.as_str().parse::<VlnvType>().unwrap(), kind);
        }
        assert!("widget".parse::<VlnvType>().is_err());
    }
}
