//! JSON fact files for seeding an atom space.
//!
//! ```json
//! {
//!   "links": [
//!     { "type": "AtTimeLink", "outgoing": ["5", "X"], "strength": 0.9, "count": 1 },
//!     { "type": "AndLink", "outgoing": [
//!         { "type": "AttractionLink", "outgoing": ["A", "B"] },
//!         { "type": "BeforeLink", "outgoing": ["A", "B"] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! A string member becomes a `NumberNode` when it parses as an integer and a
//! `ConceptNode` otherwise. Objects are nested links.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atom::{AtomId, AtomType, TruthValue};
use crate::error::{ConfigError, ConfigResult, PlnResult};
use crate::graph::AtomSpace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facts {
    #[serde(default)]
    pub links: Vec<FactLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactLink {
    #[serde(rename = "type")]
    pub link_type: String,
    pub outgoing: Vec<FactTerm>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactTerm {
    Node(String),
    Link(FactLink),
}

/// Parse facts from JSON text.
pub fn parse_facts(json: &str) -> ConfigResult<Facts> {
    serde_json::from_str(json).map_err(|e| ConfigError::FactsParse {
        message: e.to_string(),
    })
}

/// Read and parse a facts file.
pub fn load_facts(path: &Path) -> ConfigResult<Facts> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FactsRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_facts(&content)
}

impl Facts {
    /// Assert every top-level link into `space`, returning their ids in order.
    ///
    /// Truth is set only when `strength` or `count` is given; a missing
    /// strength defaults to 1.0 and a missing count to 1.0.
    pub fn assert_into(&self, space: &dyn AtomSpace) -> PlnResult<Vec<AtomId>> {
        let ids = self
            .links
            .iter()
            .map(|link| assert_link(link, space))
            .collect::<PlnResult<Vec<_>>>()?;
        tracing::debug!(links = ids.len(), "asserted facts");
        Ok(ids)
    }
}

fn assert_link(link: &FactLink, space: &dyn AtomSpace) -> PlnResult<AtomId> {
    let link_type = AtomType::parse(&link.link_type).ok_or_else(|| ConfigError::UnknownAtomType {
        name: link.link_type.clone(),
    })?;
    let outgoing = link
        .outgoing
        .iter()
        .map(|term| match term {
            FactTerm::Node(name) => Ok(space.add_node(node_type(name), name)),
            FactTerm::Link(inner) => assert_link(inner, space),
        })
        .collect::<PlnResult<Vec<_>>>()?;

    let id = space.link(link_type, &outgoing)?;
    if link.strength.is_some() || link.count.is_some() {
        let truth = TruthValue::new(link.strength.unwrap_or(1.0), link.count.unwrap_or(1.0));
        space.set_truth_value(id, truth)?;
    }
    Ok(id)
}

fn node_type(name: &str) -> AtomType {
    if name.trim().parse::<i64>().is_ok() {
        AtomType::NumberNode
    } else {
        AtomType::ConceptNode
    }
}
