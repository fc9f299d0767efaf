//! Maven to OSGi version transformation
//!
//! OSGi versions are `major.minor.micro(.qualifier)` with all three numeric
//! segments required; Maven versions are looser. This module normalizes the
//! shapes that occur in practice:
//!
//! - `x.y.z(.qualifier)(-SNAPSHOT)` where a qualifier is a `.`-led run of
//!   alphanumerics, `.`, `_`, or `-`; missing minor/patch become `0`
//! - the `x.y.z.cXX.Y` release-candidate convention, which becomes
//!   `x.y.z.cXX_Y` since the c-number is always a qualifier
//!
//! Anything else is an error. A `-SNAPSHOT` version, or any version when a
//! timestamp is forced, gets a GMT `vyyyyMMddHHmmss` qualifier appended:
//! joined with `-` when a qualifier is already present, with `.` otherwise.

use crate::core::BundlepackError;
use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;

/// Timestamp qualifier layout, GMT
const TIMESTAMP_FORMAT: &str = "v%Y%m%d%H%M%S";

/// Valid OSGi-convertible versions with an optional `-SNAPSHOT` suffix
/// (the qualifier group deliberately includes the leading period)
fn plain_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<major>[0-9]+)(\.(?P<minor>[0-9]+)(\.(?P<patch>[0-9]+)(?P<qualifier>\.[0-9A-Za-z._-]+?)?)?)?(-SNAPSHOT)?$",
        )
        .expect("plain version pattern is valid")
    })
}

/// The `x.y.z.cXX.Y` convention
fn cxx_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([0-9]+\.[0-9]+\.[0-9]+\.c[0-9]+)\.([0-9]+[0-9A-Za-z._-]*)$")
            .expect("cxx version pattern is valid")
    })
}

/// Transform a Maven version into a valid OSGi version
///
/// When `timestamp_qualifier` is false, only `-SNAPSHOT` versions get a
/// timestamp; when true, the timestamp is always attached.
pub fn osgi_version(version: &str, timestamp_qualifier: bool) -> Result<String, BundlepackError> {
    let snapshot = version.ends_with("-SNAPSHOT");

    let (mut result, has_qualifier) = if let Some(captures) = cxx_pattern().captures(version) {
        // c-number is always a qualifier
        (format!("{}_{}", &captures[1], &captures[2]), true)
    } else if let Some(captures) = plain_pattern().captures(version) {
        let major = &captures["major"];
        let minor = captures.name("minor").map_or("0", |m| m.as_str());
        let patch = captures.name("patch").map_or("0", |m| m.as_str());
        let qualifier = captures.name("qualifier").map_or("", |m| m.as_str());
        (
            format!("{major}.{minor}.{patch}{qualifier}"),
            !qualifier.is_empty(),
        )
    } else {
        return Err(BundlepackError::UnrecognizedVersion {
            version: version.to_string(),
        });
    };

    if snapshot || timestamp_qualifier {
        let stamp = Utc::now().format(TIMESTAMP_FORMAT);
        result.push(if has_qualifier { '-' } else { '.' });
        result.push_str(&stamp.to_string());
    }

    Ok(result)
}
