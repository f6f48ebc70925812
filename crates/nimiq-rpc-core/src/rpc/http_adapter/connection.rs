use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::error::CoreError;

pub(super) fn resolve_auth(
    user: Option<&str>,
    pass: Option<&str>,
) -> Result<Option<(String, String)>, CoreError> {
    match (user, pass) {
        (Some(u), Some(p)) => Ok(Some((u.to_owned(), p.to_owned()))),
        (Some(_), None) | (None, Some(_)) => Err(CoreError::InvalidConfig(
            "both rpc user and rpc pass must be set together".to_owned(),
        )),
        (None, None) => Ok(None),
    }
}

pub(super) fn parse_connection(connection: &str) -> Result<Url, CoreError> {
    let parsed = Url::parse(connection).map_err(|e| {
        CoreError::InvalidConfig(format!(
            "invalid connection `{connection}`: expected HTTP(S) URL ({e})"
        ))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(CoreError::InvalidConfig(format!(
            "unsupported connection scheme `{other}`; expected http or https"
        ))),
    }
}

/// Build the static header map sent with every request. Header contents are
/// opaque here; only their syntax is checked.
pub(super) fn build_headers(headers: &[(String, String)]) -> Result<HeaderMap, CoreError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            CoreError::InvalidConfig(format!("invalid header name `{name}`: {e}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            CoreError::InvalidConfig(format!("invalid value for header `{name}`: {e}"))
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}
