use serde::de::DeserializeOwned;
use url::Url;

use crate::{error::*, http::Response};

pub fn parse_url(url: impl AsRef<str>) -> Result<Url> {
    match Url::parse(url.as_ref()) {
        Ok(url) => Ok(url),
        Err(e) => Err(Error::InvalidSyntaxUrl {
            url: url.as_ref().to_owned(),
            source: e,
        }),
    }
}

/// Fails on non-2xx status or on a body that is not the expected JSON shape.
pub async fn read_json<T: DeserializeOwned>(
    resp: Response,
    requested_url: impl Into<String>,
) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::UnexpectedResponseCode {
            got: status,
            requested_url: requested_url.into(),
        });
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::MalformedResponse {
        requested_url: requested_url.into(),
        source: e,
    })
}

/// `null` and absent text fields are both treated as empty text.
pub fn text_or_empty(s: Option<String>) -> String {
    s.unwrap_or_default()
}
