// Entity identity and the navigation context it is resolved from
use crate::error::FetchError;
use serde::Serialize;
use std::fmt;

/// Literal values a navigation context uses to encode "no id".
const ABSENT_SENTINELS: [&str; 2] = ["null", "undefined"];

/// Opaque identifier of the business whose dashboard is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query parameters of the page the dashboard is embedded in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationContext {
    params: Vec<(String, String)>,
}

impl NavigationContext {
    /// Parse a full URL, a bare `?a=b` query or an `a=b&c=d` string.
    pub fn parse(input: &str) -> Self {
        let query = match input.split_once('?') {
            Some((_, query)) => query,
            None if input.contains('=') => input,
            None => "",
        };
        let query = query.split('#').next().unwrap_or_default();

        let params = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self { params }
    }

    /// First value for `name`, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Resolve the entity id carried by `param` in the navigation context.
pub fn resolve_identity(context: &NavigationContext, param: &str) -> Result<EntityId, FetchError> {
    let value = context.param(param).map(str::trim).unwrap_or_default();

    if value.is_empty() || ABSENT_SENTINELS.contains(&value) {
        return Err(FetchError::AbsentIdentity);
    }

    Ok(EntityId(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_from_full_url() {
        let context =
            NavigationContext::parse("https://app.example.com/dashboard?userId=123&tab=2");
        let id = resolve_identity(&context, "userId").unwrap();
        assert_eq!(id.as_str(), "123");
    }

    #[test]
    fn test_resolve_decodes_component() {
        let context = NavigationContext::parse("?userId=acme%2Fwest+1#top");
        let id = resolve_identity(&context, "userId").unwrap();
        assert_eq!(id.as_str(), "acme/west 1");
    }

    #[test]
    fn test_absent_and_sentinel_values() {
        for input in ["", "?userId=", "?userId=null", "?userId=undefined", "?other=5", "userId"] {
            let context = NavigationContext::parse(input);
            assert_eq!(
                resolve_identity(&context, "userId"),
                Err(FetchError::AbsentIdentity),
                "input {input:?} should not resolve"
            );
        }
    }

    #[test]
    fn test_bare_query_without_question_mark() {
        let context = NavigationContext::parse("userId=77&year=2024");
        assert_eq!(context.param("year"), Some("2024"));
        assert_eq!(resolve_identity(&context, "userId").unwrap().as_str(), "77");
    }
}
