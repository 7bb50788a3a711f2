// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! OPC UA `NodeId`s and their mapping to vault service identifiers.
//!
//! The vault identifies applications and requests by plain strings. On the
//! GDS side the same entities are addressed by `NodeId`s in the namespace the
//! GDS assigned to the adapter. Vault ids that parse as a GUID become Guid
//! nodes, everything else becomes a String node.
//!
//! Text form follows the OPC UA convention: `ns=2;s=app-1`, `i=85`,
//! `ns=3;g=09087e75-8e5e-499b-954f-f2a9603db28a`, `ns=1;b=AQID`. The `ns=0;`
//! prefix is omitted.

use std::fmt;
use std::str::FromStr;

use data_encoding::BASE64;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(u32),
    String(String),
    Guid(Uuid),
    Opaque(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub namespace_index: u16,
    pub identifier: Identifier,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("invalid node id {input:?}: {reason}")]
pub struct ParseNodeIdError {
    input: String,
    reason: &'static str,
}

impl NodeId {
    /// The null node id, `i=0`.
    pub const NULL: NodeId = NodeId {
        namespace_index: 0,
        identifier: Identifier::Numeric(0),
    };

    pub fn new(namespace_index: u16, identifier: Identifier) -> Self {
        Self {
            namespace_index,
            identifier,
        }
    }

    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self::new(namespace_index, Identifier::String(value.into()))
    }

    pub fn guid(namespace_index: u16, value: Uuid) -> Self {
        Self::new(namespace_index, Identifier::Guid(value))
    }

    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self::new(namespace_index, Identifier::Numeric(value))
    }

    /// `true` when the identifier holds its type's default value.
    pub fn is_null(&self) -> bool {
        match &self.identifier {
            Identifier::Numeric(value) => *value == 0,
            Identifier::String(value) => value.is_empty(),
            Identifier::Guid(value) => value.is_nil(),
            Identifier::Opaque(value) => value.is_empty(),
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index != 0 {
            write!(f, "ns={};", self.namespace_index)?;
        }
        match &self.identifier {
            Identifier::Numeric(value) => write!(f, "i={value}"),
            Identifier::String(value) => write!(f, "s={value}"),
            Identifier::Guid(value) => write!(f, "g={value}"),
            Identifier::Opaque(value) => write!(f, "b={}", BASE64.encode(value)),
        }
    }
}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = |reason| ParseNodeIdError {
            input: s.to_string(),
            reason,
        };

        let (namespace_index, rest) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (namespace, rest) = rest
                    .split_once(';')
                    .ok_or_else(|| error("missing ';' after namespace"))?;
                let namespace = namespace
                    .parse::<u16>()
                    .map_err(|_| error("namespace index is not a u16"))?;
                (namespace, rest)
            }
            None => (0, s),
        };

        let (kind, value) = rest
            .split_once('=')
            .ok_or_else(|| error("missing identifier type"))?;

        let identifier = match kind {
            "i" => Identifier::Numeric(
                value
                    .parse()
                    .map_err(|_| error("numeric identifier is not a u32"))?,
            ),
            "s" => Identifier::String(value.to_string()),
            "g" => Identifier::Guid(
                Uuid::parse_str(value).map_err(|_| error("guid identifier is malformed"))?,
            ),
            "b" => Identifier::Opaque(
                BASE64
                    .decode(value.as_bytes())
                    .map_err(|_| error("opaque identifier is not base64"))?,
            ),
            _ => return Err(error("unknown identifier type")),
        };

        Ok(Self::new(namespace_index, identifier))
    }
}

/// Maps a GDS node id to the vault's string id.
///
/// Returns `None` for null nodes, nodes outside `namespace_index`, and
/// numeric or opaque identifiers, none of which the vault can address.
pub fn service_id_from_node_id(node_id: &NodeId, namespace_index: u16) -> Option<String> {
    if node_id.is_null() || node_id.namespace_index != namespace_index {
        return None;
    }

    match &node_id.identifier {
        Identifier::String(value) => Some(value.clone()),
        Identifier::Guid(value) => Some(value.hyphenated().to_string()),
        Identifier::Numeric(_) | Identifier::Opaque(_) => None,
    }
}

/// Maps a vault id to a node id in `namespace_index`.
pub fn node_id_from_service_id(service_id: &str, namespace_index: u16) -> NodeId {
    match Uuid::try_parse(service_id) {
        Ok(guid) => NodeId::guid(namespace_index, guid),
        Err(_) => NodeId::string(namespace_index, service_id),
    }
}
