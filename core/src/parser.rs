//! Turning HAL JSON text into a `ResourceObject` graph.
//!
//! The client only depends on the `Parser` trait; `HalJsonParser` is the
//! default implementation and can be swapped out through
//! `HalClientFactory::with_parser`.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::resource::{Link, OneOrMany, ResourceObject, EMBEDDED_KEY, LINKS_KEY};

/// Converts a HAL JSON payload into a resource graph.
pub trait Parser: Send + Sync {
    fn parse(&self, json: &str) -> Result<ResourceObject, ParseError>;
}

/// `serde_json`-backed HAL parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalJsonParser;

impl Parser for HalJsonParser {
    fn parse(&self, json: &str) -> Result<ResourceObject, ParseError> {
        let value: Value = serde_json::from_str(json)?;
        match value {
            Value::Object(object) => resource_from_object(object),
            other => Err(ParseError::NotAnObject(kind_of(&other))),
        }
    }
}

fn resource_from_object(mut object: Map<String, Value>) -> Result<ResourceObject, ParseError> {
    let links = match object.remove(LINKS_KEY) {
        Some(value) => parse_links(value)?,
        None => BTreeMap::new(),
    };
    let embedded = match object.remove(EMBEDDED_KEY) {
        Some(value) => parse_embedded(value)?,
        None => BTreeMap::new(),
    };
    Ok(ResourceObject::new(object, links, embedded))
}

fn parse_links(value: Value) -> Result<BTreeMap<String, OneOrMany<Link>>, ParseError> {
    let Value::Object(relations) = value else {
        return Err(ParseError::InvalidLinks(format!(
            "expected an object, found {}",
            kind_of(&value)
        )));
    };

    let mut links = BTreeMap::new();
    for (rel, value) in relations {
        let parsed = match value {
            Value::Array(items) => OneOrMany::Many(
                items
                    .into_iter()
                    .map(|item| parse_link(&rel, item))
                    .collect::<Result<_, _>>()?,
            ),
            item => OneOrMany::One(parse_link(&rel, item)?),
        };
        links.insert(rel, parsed);
    }
    Ok(links)
}

fn parse_link(rel: &str, value: Value) -> Result<Link, ParseError> {
    if !value.is_object() {
        return Err(ParseError::InvalidLinks(format!(
            "relation '{rel}': expected a link object, found {}",
            kind_of(&value)
        )));
    }
    serde_json::from_value(value)
        .map_err(|e| ParseError::InvalidLinks(format!("relation '{rel}': {e}")))
}

fn parse_embedded(
    value: Value,
) -> Result<BTreeMap<String, OneOrMany<ResourceObject>>, ParseError> {
    let Value::Object(relations) = value else {
        return Err(ParseError::InvalidEmbedded(format!(
            "expected an object, found {}",
            kind_of(&value)
        )));
    };

    let mut embedded = BTreeMap::new();
    for (rel, value) in relations {
        let parsed = match value {
            Value::Array(items) => OneOrMany::Many(
                items
                    .into_iter()
                    .map(|item| parse_embedded_resource(&rel, item))
                    .collect::<Result<_, _>>()?,
            ),
            item => OneOrMany::One(parse_embedded_resource(&rel, item)?),
        };
        embedded.insert(rel, parsed);
    }
    Ok(embedded)
}

fn parse_embedded_resource(rel: &str, value: Value) -> Result<ResourceObject, ParseError> {
    match value {
        Value::Object(object) => resource_from_object(object),
        other => Err(ParseError::InvalidEmbedded(format!(
            "relation '{rel}': expected a resource object, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
