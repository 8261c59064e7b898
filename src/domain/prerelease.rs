//! Prerelease keywords
//!
//! A prerelease keyword has the shape `<marker>-<identifier>` (for example
//! `rc-beta`). When such a keyword is found in a commit message, the part
//! after the first `-` becomes the prerelease identifier (`preid`) used for
//! the bump, so `rc-beta` turns `1.0.0` into `1.0.1-beta.0`.

/// Prerelease identifier carried by a keyword, if any
///
/// `"rc-beta"` -> `Some("beta")`, `"rc-beta-2"` -> `Some("beta-2")`,
/// `"rc"` -> `None`.
pub fn preid_from_keyword(keyword: &str) -> Option<&str> {
    keyword
        .split_once('-')
        .map(|(_, identifier)| identifier.trim())
        .filter(|identifier| !identifier.is_empty())
}

/// Resolve the identifier to use: a keyword-derived one wins over the
/// configured default
pub fn resolve_preid(keyword: Option<&str>, configured: Option<&str>) -> Option<String> {
    keyword
        .and_then(preid_from_keyword)
        .or_else(|| configured.filter(|p| !p.is_empty()))
        .map(str::to_string)
}
