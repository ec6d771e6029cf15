use std::fmt;

use serde::{Deserialize, Serialize};

/// Strategy used to put a submission on the judge.
#[derive(
    Serialize,
    Deserialize,
    EnumString,
    EnumVariantNames,
    IntoStaticStr,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DriverKind {
    /// Drives the submit form in headless Chromium.
    Browser,
    /// Posts the submit form directly.
    Http,
}

impl Default for DriverKind {
    fn default() -> Self {
        Self::Browser
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}
