//! HAL resource graph.
//!
//! # Design
//! A `ResourceObject` is the parsed form of one HAL document or sub-document:
//! plain properties plus the two reserved members, `_links` and `_embedded`.
//! HAL lets a relation hold either a single item or an array, and the two
//! forms mean different things to some servers, so `OneOrMany` keeps the
//! distinction instead of flattening everything into a `Vec`.
//!
//! Graphs are built once by a `Parser` and are read-only afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

pub const LINKS_KEY: &str = "_links";
pub const EMBEDDED_KEY: &str = "_embedded";

/// A HAL link object.
///
/// Only `href` is required. The remaining attributes are carried through
/// untouched; unknown attributes land in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templated: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: None,
            media_type: None,
            deprecation: None,
            name: None,
            profile: None,
            title: None,
            hreflang: None,
            extra: Map::new(),
        }
    }

    pub fn is_templated(&self) -> bool {
        self.templated.unwrap_or(false)
    }
}

/// A relation value: a single item or an array of items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            OneOrMany::One(item) => Some(item),
            OneOrMany::Many(items) => items.first(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            OneOrMany::One(item) => std::slice::from_ref(item).iter(),
            OneOrMany::Many(items) => items.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            OneOrMany::One(_) => 1,
            OneOrMany::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the relation was declared as an array, even a one-element one.
    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One node of a HAL graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceObject {
    properties: Map<String, Value>,
    links: BTreeMap<String, OneOrMany<Link>>,
    embedded: BTreeMap<String, OneOrMany<ResourceObject>>,
}

impl ResourceObject {
    pub fn new(
        properties: Map<String, Value>,
        links: BTreeMap<String, OneOrMany<Link>>,
        embedded: BTreeMap<String, OneOrMany<ResourceObject>>,
    ) -> Self {
        Self {
            properties,
            links,
            embedded,
        }
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn links(&self) -> &BTreeMap<String, OneOrMany<Link>> {
        &self.links
    }

    pub fn links_for(&self, rel: &str) -> Option<&OneOrMany<Link>> {
        self.links.get(rel)
    }

    /// First link registered under `rel`.
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.get(rel).and_then(OneOrMany::first)
    }

    pub fn self_link(&self) -> Option<&Link> {
        self.link("self")
    }

    pub fn embedded(&self) -> &BTreeMap<String, OneOrMany<ResourceObject>> {
        &self.embedded
    }

    pub fn embedded_for(&self, rel: &str) -> Option<&OneOrMany<ResourceObject>> {
        self.embedded.get(rel)
    }

    /// Rebuild the HAL JSON document. Empty `_links` / `_embedded` members
    /// are omitted.
    pub fn to_json(&self) -> Value {
        let mut doc = self.properties.clone();
        if !self.links.is_empty() {
            let links = self
                .links
                .iter()
                .map(|(rel, value)| (rel.clone(), links_to_json(value)))
                .collect();
            doc.insert(LINKS_KEY.to_string(), Value::Object(links));
        }
        if !self.embedded.is_empty() {
            let embedded = self
                .embedded
                .iter()
                .map(|(rel, value)| {
                    let json = match value {
                        OneOrMany::One(resource) => resource.to_json(),
                        OneOrMany::Many(resources) => {
                            Value::Array(resources.iter().map(ResourceObject::to_json).collect())
                        }
                    };
                    (rel.clone(), json)
                })
                .collect();
            doc.insert(EMBEDDED_KEY.to_string(), Value::Object(embedded));
        }
        Value::Object(doc)
    }
}

fn links_to_json(value: &OneOrMany<Link>) -> Value {
    // Link only holds strings, bools and JSON values, so conversion cannot fail.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl Serialize for ResourceObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Outcome of one HTTP exchange: the final status, plus the resource graph
/// when the response carried a HAL body.
#[derive(Debug, Clone, PartialEq)]
pub enum RootResourceObject {
    /// A HAL body was received and parsed.
    Resource { status: u16, resource: ResourceObject },
    /// 204 No Content: nothing to parse.
    NoContent { status: u16 },
}

impl RootResourceObject {
    pub fn status(&self) -> u16 {
        match self {
            RootResourceObject::Resource { status, .. }
            | RootResourceObject::NoContent { status } => *status,
        }
    }

    pub fn resource(&self) -> Option<&ResourceObject> {
        match self {
            RootResourceObject::Resource { resource, .. } => Some(resource),
            RootResourceObject::NoContent { .. } => None,
        }
    }

    pub fn into_resource(self) -> Option<ResourceObject> {
        match self {
            RootResourceObject::Resource { resource, .. } => Some(resource),
            RootResourceObject::NoContent { .. } => None,
        }
    }
}
