//! Naming/URL codec: object paths to public download URLs and back, group
//! keys for photo and blueprint sets, and filename normalization.
//!
//! Every destination name computed from these keys is a pure function of
//! (broker name, group key, position), so reruns produce the same paths.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::constants::{BLUEPRINTS_SUBPATH, EXCLUDED_FOLDER, PHOTOS_SUBPATH};

/// Percent-encode everything except ASCII alphanumerics and `-._~`. The
/// Firebase download URL requires the full object key encoded, separators
/// included.
const OBJECT_KEY_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const PUBLIC_URL_HOST: &str = "https://firebasestorage.googleapis.com/v0/b";
const PUBLIC_URL_QUERY: &str = "?alt=media";

/// Public-read download URL for an object in `bucket`.
pub fn public_url(bucket: &str, object_path: &str) -> String {
    format!(
        "{}/{}/o/{}{}",
        PUBLIC_URL_HOST,
        bucket,
        utf8_percent_encode(object_path, OBJECT_KEY_ENCODE),
        PUBLIC_URL_QUERY
    )
}

/// Inverse of [`public_url`]: recover the object path from a download URL.
///
/// The `?alt=media` query is optional so URLs extracted from failure log
/// lines (which end at `.jpg`) decode too. Returns `None` when the URL does
/// not belong to `bucket`.
pub fn object_path_from_public_url(bucket: &str, url: &str) -> Option<String> {
    let prefix = format!("{}/{}/o/", PUBLIC_URL_HOST, bucket);
    let encoded = url.strip_prefix(&prefix)?;
    let encoded = encoded.strip_suffix(PUBLIC_URL_QUERY).unwrap_or(encoded);
    let decoded = percent_decode_str(encoded).decode_utf8().ok()?;
    Some(decoded.into_owned())
}

/// Shared prefix of a photo set: the object path with a trailing two-digit
/// index and `.jpg` extension stripped (`.../unidad-01.jpg` -> `.../unidad-`).
///
/// Paths without the suffix are returned unchanged, which also makes the
/// function stable under re-application.
pub fn photo_group_key(object_path: &str) -> &str {
    if let Some(stem) = object_path.strip_suffix(".jpg") {
        let bytes = stem.as_bytes();
        if bytes.len() >= 2
            && bytes[bytes.len() - 2].is_ascii_digit()
            && bytes[bytes.len() - 1].is_ascii_digit()
        {
            return &stem[..stem.len() - 2];
        }
    }
    object_path
}

/// Group key of a blueprint object: its parent directory.
pub fn blueprint_group_key(object_path: &str) -> &str {
    object_path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

/// Whether a listed object should be skipped entirely: directory markers,
/// filesystem metadata artifacts, the excluded administrative folder, and
/// anything outside the `fotos/` and `planos/` sub-path conventions.
pub fn is_ignorable(object_path: &str) -> bool {
    if object_path.ends_with('/')
        || object_path.contains(".DS_Store")
        || !object_path.contains('/')
    {
        return true;
    }
    if object_path.to_lowercase().contains(EXCLUDED_FOLDER) {
        return true;
    }
    !object_path.contains(PHOTOS_SUBPATH) && !object_path.contains(BLUEPRINTS_SUBPATH)
}

/// Lowercase `text` and fold Spanish accented letters to their ASCII
/// equivalents. Advisory folder-name formatting only.
pub fn format_name(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'Á' => 'a',
            'é' | 'É' => 'e',
            'í' | 'Í' => 'i',
            'ó' | 'Ó' => 'o',
            'ú' | 'Ú' => 'u',
            'ñ' | 'Ñ' => 'n',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}
