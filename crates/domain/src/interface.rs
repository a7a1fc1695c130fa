//! Interfaces and interface masks.
//!
//! An interface is a view policy on a resource: it selects which fields of
//! the representation a request sees (`oic.if.r`), may write (`oic.if.rw`),
//! or whether generic introspection is added (`oic.if.baseline`).

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};

/// A single interface identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interface {
    #[serde(rename = "oic.if.baseline")]
    Baseline,
    #[serde(rename = "oic.if.ll")]
    LinksList,
    #[serde(rename = "oic.if.b")]
    Batch,
    #[serde(rename = "oic.if.r")]
    ReadOnly,
    #[serde(rename = "oic.if.rw")]
    ReadWrite,
    #[serde(rename = "oic.if.a")]
    Actuator,
    #[serde(rename = "oic.if.s")]
    Sensor,
}

impl Interface {
    /// Every interface, in mask bit order.
    pub const ALL: [Self; 7] = [
        Self::Baseline,
        Self::LinksList,
        Self::Batch,
        Self::ReadOnly,
        Self::ReadWrite,
        Self::Actuator,
        Self::Sensor,
    ];

    /// Wire name of the interface (`oic.if.*`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "oic.if.baseline",
            Self::LinksList => "oic.if.ll",
            Self::Batch => "oic.if.b",
            Self::ReadOnly => "oic.if.r",
            Self::ReadWrite => "oic.if.rw",
            Self::Actuator => "oic.if.a",
            Self::Sensor => "oic.if.s",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::Baseline => 1,
            Self::LinksList => 1 << 1,
            Self::Batch => 1 << 2,
            Self::ReadOnly => 1 << 3,
            Self::ReadWrite => 1 << 4,
            Self::Actuator => 1 << 5,
            Self::Sensor => 1 << 6,
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The interface name is not one of the known `oic.if.*` identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interface {0:?}")]
pub struct UnknownInterface(pub String);

impl FromStr for Interface {
    type Err = UnknownInterface;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|iface| iface.as_str() == s)
            .ok_or_else(|| UnknownInterface(s.to_string()))
    }
}

/// A set of interfaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InterfaceMask(u8);

impl InterfaceMask {
    /// The mask with no interface set.
    pub const EMPTY: Self = Self(0);

    /// Whether `iface` is part of the mask.
    #[must_use]
    pub fn contains(self, iface: Interface) -> bool {
        self.0 & iface.bit() != 0
    }

    /// Whether every interface of `self` is also in `other`.
    #[must_use]
    pub fn is_subset_of(self, other: Self) -> bool {
        self.0 & !other.0 == 0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Add an interface to the mask.
    pub fn insert(&mut self, iface: Interface) {
        self.0 |= iface.bit();
    }

    /// Iterate the interfaces in the mask, in bit order.
    pub fn iter(self) -> impl Iterator<Item = Interface> {
        Interface::ALL
            .into_iter()
            .filter(move |iface| self.contains(*iface))
    }

    /// Wire names of the interfaces in the mask, as emitted in `if` fields.
    #[must_use]
    pub fn names(self) -> Vec<String> {
        self.iter().map(|iface| iface.as_str().to_string()).collect()
    }
}

impl From<Interface> for InterfaceMask {
    fn from(iface: Interface) -> Self {
        Self(iface.bit())
    }
}

impl BitOr for InterfaceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOr<Interface> for InterfaceMask {
    type Output = Self;

    fn bitor(self, rhs: Interface) -> Self {
        Self(self.0 | rhs.bit())
    }
}

impl BitOr for Interface {
    type Output = InterfaceMask;

    fn bitor(self, rhs: Self) -> InterfaceMask {
        InterfaceMask(self.bit() | rhs.bit())
    }
}

impl FromIterator<Interface> for InterfaceMask {
    fn from_iter<I: IntoIterator<Item = Interface>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |mask, iface| mask | iface)
    }
}

impl Serialize for InterfaceMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for iface in self.iter() {
            seq.serialize_element(&iface)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for InterfaceMask {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ifaces = Vec::<Interface>::deserialize(deserializer)?;
        Ok(ifaces.into_iter().collect())
    }
}

impl fmt::Display for InterfaceMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(Interface::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
