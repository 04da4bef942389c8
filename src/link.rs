//! Save transport through the URL fragment.
//!
//! Current links carry `#v=<game version>&ev=<encoding version>&save=<token>`.
//! Older links only carry `#save=<token>` and are still read.

use tracing::warn;

use crate::error::{Result, SaveError};
use crate::saves::{OpenedSet, SaveCodec, SaveFormat};

const GAME_VERSION_PARAM: &str = "v";
const ENCODING_VERSION_PARAM: &str = "ev";
const SAVE_PARAM: &str = "save";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveLink {
    pub game_version: Option<String>,
    pub encoding_version: Option<u32>,
    pub token: String,
}

impl SaveLink {
    /// Link for a freshly encoded token, stamped with the format's versions.
    pub fn new(format: &SaveFormat, token: impl Into<String>) -> Self {
        Self {
            game_version: Some(format.game_version.clone()),
            encoding_version: Some(format.encoding_version),
            token: token.into(),
        }
    }

    /// Parse a location fragment, with or without the leading `#`.
    /// Returns `None` when there is no `save=` parameter.
    pub fn parse(fragment: &str) -> Option<Self> {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        let mut game_version = None;
        let mut encoding_version = None;
        let mut token = None;
        for (key, value) in fragment_params(fragment) {
            match key {
                GAME_VERSION_PARAM => game_version = Some(value.to_string()),
                ENCODING_VERSION_PARAM => encoding_version = value.parse().ok(),
                SAVE_PARAM => token = Some(value.to_string()),
                _ => {}
            }
        }
        Some(Self {
            game_version,
            encoding_version,
            token: token?,
        })
    }

    /// The token, if it has the exact length `format` produces.
    pub fn try_token(&self, format: &SaveFormat) -> Result<&str> {
        let expected = format.encoded_len();
        if self.token.len() != expected {
            return Err(SaveError::TokenLength {
                actual: self.token.len(),
                expected,
            });
        }
        Ok(&self.token)
    }

    /// Links written before versions were added to the fragment.
    pub fn is_legacy(&self) -> bool {
        self.game_version.is_none() && self.encoding_version.is_none()
    }

    pub fn to_fragment(&self) -> String {
        let mut params = Vec::with_capacity(3);
        if let Some(v) = &self.game_version {
            params.push(format!("{GAME_VERSION_PARAM}={v}"));
        }
        if let Some(ev) = self.encoding_version {
            params.push(format!("{ENCODING_VERSION_PARAM}={ev}"));
        }
        params.push(format!("{SAVE_PARAM}={}", self.token));
        params.join("&")
    }
}

/// Split a fragment into `key=value` pairs on the first `=` only, so the
/// token's base64 padding stays in the value.
fn fragment_params(fragment: &str) -> impl Iterator<Item = (&str, &str)> {
    fragment
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
}

fn is_save_param(key: &str) -> bool {
    matches!(key, GAME_VERSION_PARAM | ENCODING_VERSION_PARAM | SAVE_PARAM)
}

/// Append the save link to `url`'s fragment, replacing any save already there.
pub fn export_save_to_url(url: &str, link: &SaveLink) -> String {
    let (base, fragment) = url.split_once('#').unwrap_or((url, ""));
    let mut params: Vec<String> = fragment
        .split('&')
        .filter(|pair| {
            let key = pair.split_once('=').map_or(*pair, |(key, _)| key);
            !pair.is_empty() && !is_save_param(key)
        })
        .map(str::to_string)
        .collect();
    params.push(link.to_fragment());
    format!("{base}#{}", params.join("&"))
}

/// Token after the `save=` marker, if any.
pub fn get_save_token_from_url(fragment: &str) -> Option<String> {
    SaveLink::parse(fragment).map(|link| link.token)
}

/// A save counts as present only when its token has the exact encoded
/// length; truncated links are treated as no save.
pub fn has_save_in_url(fragment: &str, format: &SaveFormat) -> bool {
    SaveLink::parse(fragment).is_some_and(|link| link.try_token(format).is_ok())
}

/// Decode the save carried by `fragment` against the current `keys`.
/// `Ok(None)` when the fragment has no usable save.
pub fn get_save_from_url<K: AsRef<str>>(
    codec: &SaveCodec,
    keys: &[K],
    fragment: &str,
) -> Result<Option<OpenedSet>> {
    let Some(link) = SaveLink::parse(fragment) else {
        return Ok(None);
    };
    let token = match link.try_token(codec.format()) {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "ignoring save link");
            return Ok(None);
        }
    };
    if let Some(ev) = link.encoding_version {
        if ev > codec.format().encoding_version {
            warn!(
                link = ev,
                supported = codec.format().encoding_version,
                "save link uses a newer encoding version"
            );
        }
    }
    codec.decode(keys, token)
}
