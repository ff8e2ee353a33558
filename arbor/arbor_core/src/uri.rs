//! Class URIs.
//!
//! Classes are addressed as `<scheme>:<opaque-or-path>#<Fragment>` where the
//! fragment names the class. URIs are matched case-insensitively as whole
//! strings.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{Error, Result};

/// The reserved fragment naming the structural base of a URI's type family.
pub const NODE_FRAGMENT: &str = "Node";

/// A parsed class URI together with its registry key.
///
/// The key is the URI text as written, lower-cased. The parsed URL is only
/// used for validation and component access, so URIs that `url` would
/// normalize to the same form (`a/../b` and `b`) remain distinct classes.
#[derive(Clone)]
pub struct ClassUri {
    url: Url,
    text: String,
    key: String,
    fragment: String,
}

impl ClassUri {
    /// Parse a class URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri).map_err(|source| Error::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;
        Ok(Self::with_text(url, uri.to_string()))
    }

    /// Wrap an already parsed URL, keyed by its serialized form.
    pub fn from_url(url: Url) -> Self {
        let text = url.as_str().to_string();
        Self::with_text(url, text)
    }

    fn with_text(url: Url, text: String) -> Self {
        let fragment = url
            .fragment()
            .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        Self {
            key: text.to_lowercase(),
            url,
            text,
            fragment,
        }
    }

    /// The case-insensitive registry key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The class name carried in the fragment, percent-decoded (empty when
    /// absent).
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// The URI scheme.
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// A copy of this URI with only the fragment replaced.
    pub fn with_fragment(&self, fragment: &str) -> Self {
        let mut url = self.url.clone();
        url.set_fragment(Some(fragment));

        let prefix = self
            .text
            .split_once('#')
            .map_or(self.text.as_str(), |(prefix, _)| prefix);
        Self::with_text(url, format!("{prefix}#{fragment}"))
    }

    /// The URI of the structural base for this URI's type family.
    pub fn base_uri(&self) -> Self {
        self.with_fragment(NODE_FRAGMENT)
    }

    /// The underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The URI as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl PartialEq for ClassUri {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ClassUri {}

impl Hash for ClassUri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl FromStr for ClassUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ClassUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for ClassUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassUri({})", self.text)
    }
}
