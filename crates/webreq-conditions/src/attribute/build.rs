//! Constructors turning declarative values into attributes.
//!
//! Every constructor has the signature the factory registers:
//! `fn(key, value) -> Result<ConditionAttribute, ConditionError>`.

use serde_json::Value;

use super::keys;
use super::ConditionAttribute;
use crate::error::ConditionError;
use crate::matcher::HeaderMatcher;
use crate::resource_type::ResourceType;
use crate::stage::{Stage, StageMask};

fn string_list<'v>(key: &str, value: &'v Value) -> Result<Vec<&'v str>, ConditionError> {
    let items = value
        .as_array()
        .ok_or_else(|| ConditionError::malformed(key, "expected a list of strings"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().ok_or_else(|| {
                ConditionError::malformed(key, format!("entry {index} is not a string"))
            })
        })
        .collect()
}

pub fn build_resource_type(key: &str, value: &Value) -> Result<ConditionAttribute, ConditionError> {
    let types = string_list(key, value)?
        .into_iter()
        .map(|name| {
            name.parse::<ResourceType>()
                .map_err(|e| ConditionError::malformed(key, e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ConditionAttribute::ResourceType(types))
}

pub fn build_content_type(key: &str, value: &Value) -> Result<ConditionAttribute, ConditionError> {
    let content_types = string_list(key, value)?
        .into_iter()
        .map(str::to_string)
        .collect();
    Ok(ConditionAttribute::ContentType {
        content_types,
        inclusive: key == keys::CONTENT_TYPE,
    })
}

fn header_matcher(key: &str, value: &Value) -> Result<HeaderMatcher, ConditionError> {
    HeaderMatcher::from_value(value).map_err(|e| ConditionError::malformed(key, e.to_string()))
}

pub fn build_request_headers(
    key: &str,
    value: &Value,
) -> Result<ConditionAttribute, ConditionError> {
    Ok(ConditionAttribute::RequestHeaders {
        matcher: header_matcher(key, value)?,
        positive: key == keys::REQUEST_HEADERS,
    })
}

pub fn build_response_headers(
    key: &str,
    value: &Value,
) -> Result<ConditionAttribute, ConditionError> {
    Ok(ConditionAttribute::ResponseHeaders {
        matcher: header_matcher(key, value)?,
        positive: key == keys::RESPONSE_HEADERS,
    })
}

pub fn build_third_party(key: &str, value: &Value) -> Result<ConditionAttribute, ConditionError> {
    let match_third_party = value
        .as_bool()
        .ok_or_else(|| ConditionError::malformed(key, "expected a boolean"))?;
    Ok(ConditionAttribute::ThirdParty { match_third_party })
}

pub fn build_stages(key: &str, value: &Value) -> Result<ConditionAttribute, ConditionError> {
    let mask = string_list(key, value)?
        .into_iter()
        .map(|name| {
            name.parse::<Stage>()
                .map_err(|e| ConditionError::malformed(key, e.to_string()))
        })
        .collect::<Result<StageMask, _>>()?;
    Ok(ConditionAttribute::Stages(mask))
}
