//! Storage key handling.
//!
//! Three concerns live here:
//!
//! - extracting a bucket-relative key from any accepted reference form
//!   (virtual-hosted URL, path-style URL, `s3://bucket/key`, bare key),
//! - deriving the encoding variants an object might be stored under,
//! - generating keys for new uploads.

use btechverse_core::constants::{
    LOCATOR_SCHEME, REGIONAL_HOST_PREFIX, RESOURCE_KEY_PREFIX, STORAGE_DOMAIN_SUFFIX,
};
use btechverse_core::models::EncodingVariant;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Characters left unescaped when percent-encoding a URI component.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Same as [`URI_COMPONENT`] but keeps `/` so key segments stay intact.
const KEY_PATH: &AsciiSet = &URI_COMPONENT.remove(b'/');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("Invalid storage reference: {0}")]
    InvalidReference(String),
}

/// A key in one of its stored textual forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedKey {
    pub variant: EncodingVariant,
    pub key: String,
}

/// Extract the bucket-relative key from a storage reference.
///
/// Rules, first match wins:
/// 1. References containing the provider domain are parsed as URLs. A host
///    starting with `bucket` yields the whole path; a regional `s3.` host
///    yields the path after a leading `bucket/` segment; anything else
///    yields the whole path. Paths are decoded with `+` read as a space.
/// 2. `s3://bucket/key` yields `key`.
/// 3. Anything else is already a key and is returned unchanged.
pub fn extract_key(reference: &str, bucket: &str) -> Result<String, KeyError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(KeyError::InvalidReference(
            "reference is empty".to_string(),
        ));
    }

    if trimmed.contains(STORAGE_DOMAIN_SUFFIX) {
        return extract_from_url(trimmed, bucket);
    }

    if let Some(rest) = trimmed.strip_prefix(LOCATOR_SCHEME) {
        return extract_from_locator(rest, bucket, trimmed);
    }

    Ok(reference.to_string())
}

fn extract_from_url(reference: &str, bucket: &str) -> Result<String, KeyError> {
    let url = Url::parse(reference)
        .map_err(|e| KeyError::InvalidReference(format!("{}: {}", reference, e)))?;
    let host = url.host_str().unwrap_or_default();
    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);

    if host.starts_with(bucket) {
        return decode_key_path(path);
    }

    if host.starts_with(REGIONAL_HOST_PREFIX) {
        let decoded = decode_key_path(path)?;
        if let Some((first, rest)) = decoded.split_once('/') {
            if first == bucket {
                return Ok(rest.to_string());
            }
        }
        return Ok(decoded);
    }

    decode_key_path(path)
}

fn extract_from_locator(rest: &str, bucket: &str, reference: &str) -> Result<String, KeyError> {
    match rest.split_once('/') {
        Some((locator_bucket, key)) if locator_bucket == bucket && !key.is_empty() => {
            Ok(key.to_string())
        }
        Some((locator_bucket, _)) if locator_bucket != bucket => Err(KeyError::InvalidReference(
            format!("{} points at bucket '{}', expected '{}'", reference, locator_bucket, bucket),
        )),
        _ => Err(KeyError::InvalidReference(format!(
            "{} has no object key",
            reference
        ))),
    }
}

/// Decode a URL path into a key: `+` becomes a space, then percent-decoding.
///
/// A `%` not followed by two hex digits, or a decoded sequence that is not
/// UTF-8, makes the reference invalid.
pub fn decode_key_path(path: &str) -> Result<String, KeyError> {
    let spaced = path.replace('+', " ");
    if has_malformed_escape(&spaced) {
        return Err(KeyError::InvalidReference(format!(
            "malformed percent-encoding in '{}'",
            path
        )));
    }
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| KeyError::InvalidReference(format!("'{}' is not valid UTF-8: {}", path, e)))
}

fn has_malformed_escape(input: &str) -> bool {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return true;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    false
}

/// Percent-encode a key, leaving `/` separators unescaped.
pub fn encode_key_path(key: &str) -> String {
    utf8_percent_encode(key, KEY_PATH).to_string()
}

/// The forms an object may be stored under, in probe order: decoded,
/// percent-encoded, then spaces as `+`.
pub fn encoding_variants(key: &str) -> [EncodedKey; 3] {
    EncodingVariant::PROBE_ORDER.map(|variant| EncodedKey {
        variant,
        key: encode_variant(key, variant),
    })
}

fn encode_variant(key: &str, variant: EncodingVariant) -> String {
    match variant {
        EncodingVariant::Decoded => key.to_string(),
        EncodingVariant::UrlEncoded => encode_key_path(key),
        EncodingVariant::PlusEncoded => key.replace(' ', "+"),
    }
}

/// Public virtual-hosted URL of an object.
pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!(
        "https://{}.s3.{}.{}/{}",
        bucket,
        region,
        STORAGE_DOMAIN_SUFFIX,
        encode_key_path(key)
    )
}

/// Short-form `s3://<bucket>/<key>` reference.
pub fn locator_reference(bucket: &str, key: &str) -> String {
    format!("{}{}/{}", LOCATOR_SCHEME, bucket, key)
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Lower-cased extension of the original file name, falling back to the
/// content type when the name has none.
pub fn file_extension(file_name: &str, content_type: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| extension_for_content_type(content_type).to_string())
}

fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "application/pdf" => "pdf",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "application/vnd.ms-powerpoint" => "ppt",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "pptx",
        _ => "bin",
    }
}

/// Key for a new upload: `resources/<branch>/<category>/<millis>_<title>.<ext>`.
pub fn upload_key(
    branch: &str,
    category: &str,
    title: &str,
    extension: &str,
    timestamp_millis: i64,
) -> String {
    format!(
        "{}/{}/{}/{}_{}.{}",
        RESOURCE_KEY_PREFIX,
        branch,
        category,
        timestamp_millis,
        sanitize_title(title),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCKET: &str = "btech-verse";
    const KEY: &str = "resources/CSE/Notes/170000_DBMS.pdf";

    #[test]
    fn test_virtual_hosted_url() {
        let url = "https://btech-verse.s3.eu-north-1.amazonaws.com/resources/CSE/Notes/170000_DBMS.pdf";
        assert_eq!(extract_key(url, BUCKET).unwrap(), KEY);
    }

    #[test]
    fn test_path_style_url() {
        let url = "https://s3.eu-north-1.amazonaws.com/btech-verse/resources/CSE/Notes/170000_DBMS.pdf";
        assert_eq!(extract_key(url, BUCKET).unwrap(), KEY);
    }

    #[test]
    fn test_locator_scheme() {
        let locator = "s3://btech-verse/resources/CSE/Notes/170000_DBMS.pdf";
        assert_eq!(extract_key(locator, BUCKET).unwrap(), KEY);
    }

    #[test]
    fn test_bare_key_unchanged() {
        assert_eq!(extract_key(KEY, BUCKET).unwrap(), KEY);
        assert_eq!(
            extract_key("resources/CSE/My+Notes%20.pdf", BUCKET).unwrap(),
            "resources/CSE/My+Notes%20.pdf"
        );
    }

    #[test]
    fn test_bare_key_keeps_surrounding_whitespace() {
        assert_eq!(extract_key(" a.pdf", BUCKET).unwrap(), " a.pdf");
        assert_eq!(
            extract_key("resources/CSE/Notes/1_A.pdf ", BUCKET).unwrap(),
            "resources/CSE/Notes/1_A.pdf "
        );
    }

    #[test]
    fn test_locator_reference_round_trips() {
        let key = "resources/CSE/Notes/1_Data Structures.pdf";
        let reference = locator_reference(BUCKET, key);
        assert_eq!(reference, "s3://btech-verse/resources/CSE/Notes/1_Data Structures.pdf");
        assert_eq!(extract_key(&reference, BUCKET).unwrap(), key);
    }

    #[test]
    fn test_path_style_other_bucket_keeps_full_path() {
        let url = "https://s3.eu-north-1.amazonaws.com/other-bucket/resources/a.pdf";
        assert_eq!(
            extract_key(url, BUCKET).unwrap(),
            "other-bucket/resources/a.pdf"
        );
    }

    #[test]
    fn test_unknown_host_falls_back_to_path() {
        let url = "https://cdn.amazonaws.com/resources/CSE/Notes/My%20File.pdf";
        assert_eq!(
            extract_key(url, BUCKET).unwrap(),
            "resources/CSE/Notes/My File.pdf"
        );
    }

    #[test]
    fn test_plus_and_percent_forms_agree() {
        let plus = "https://btech-verse.s3.eu-north-1.amazonaws.com/resources/CSE/Notes/1_Data+Structures.pdf";
        let percent = "https://btech-verse.s3.eu-north-1.amazonaws.com/resources/CSE/Notes/1_Data%20Structures.pdf";
        let expected = "resources/CSE/Notes/1_Data Structures.pdf";
        assert_eq!(extract_key(plus, BUCKET).unwrap(), expected);
        assert_eq!(extract_key(percent, BUCKET).unwrap(), expected);
    }

    #[test]
    fn test_extract_then_encode_reproduces_path() {
        let paths = [
            "resources/CSE/Notes/170000_DBMS.pdf",
            "resources/Interview-Prep/Previous%20Papers/1_Mock%20Test%20(1).pdf",
            "resources/ECE/Lab%20Manuals/2_Signals%26Systems.pdf",
            "resources/ME/Notes/3_Thermo%E2%80%93dynamics.pdf",
        ];
        for path in paths {
            let url = format!("https://btech-verse.s3.eu-north-1.amazonaws.com/{}", path);
            let key = extract_key(&url, BUCKET).unwrap();
            assert_eq!(encode_key_path(&key), path, "round trip for {}", path);
        }
    }

    #[test]
    fn test_malformed_url_is_invalid_reference() {
        let err = extract_key("http://[::1/amazonaws.com/x", BUCKET).unwrap_err();
        assert!(matches!(err, KeyError::InvalidReference(_)));

        let no_scheme = extract_key("btech-verse.s3.amazonaws.com/key.pdf", BUCKET).unwrap_err();
        assert!(matches!(no_scheme, KeyError::InvalidReference(_)));
    }

    #[test]
    fn test_malformed_escape_is_invalid_reference() {
        let url = "https://btech-verse.s3.eu-north-1.amazonaws.com/resources/100%.pdf";
        assert!(matches!(
            extract_key(url, BUCKET),
            Err(KeyError::InvalidReference(_))
        ));
    }

    #[test]
    fn test_empty_reference_is_invalid() {
        assert!(extract_key("   ", BUCKET).is_err());
    }

    #[test]
    fn test_locator_for_other_bucket_is_invalid() {
        assert!(extract_key("s3://elsewhere/resources/a.pdf", BUCKET).is_err());
        assert!(extract_key("s3://btech-verse/", BUCKET).is_err());
    }

    #[test]
    fn test_encoding_variants_order() {
        let variants = encoding_variants("resources/CSE/Notes/1_My Notes (v2).pdf");
        assert_eq!(variants[0].variant, EncodingVariant::Decoded);
        assert_eq!(variants[0].key, "resources/CSE/Notes/1_My Notes (v2).pdf");
        assert_eq!(variants[1].variant, EncodingVariant::UrlEncoded);
        assert_eq!(variants[1].key, "resources/CSE/Notes/1_My%20Notes%20(v2).pdf");
        assert_eq!(variants[2].variant, EncodingVariant::PlusEncoded);
        assert_eq!(variants[2].key, "resources/CSE/Notes/1_My+Notes+(v2).pdf");
    }

    #[test]
    fn test_upload_key_format() {
        let key = upload_key("CSE", "Notes", "DBMS Unit-1 (v2)", "pdf", 1_700_000_000_000);
        assert_eq!(key, "resources/CSE/Notes/1700000000000_DBMS_Unit_1__v2_.pdf");
    }

    #[test]
    fn test_file_extension_fallback() {
        assert_eq!(file_extension("Slides.PPTX", "application/pdf"), "pptx");
        assert_eq!(file_extension("scan", "image/png"), "png");
    }

    #[test]
    fn test_object_url_round_trips() {
        let key = "resources/Interview-Prep/Mock Tests/1_Aptitude.pdf";
        let url = object_url(BUCKET, "eu-north-1", key);
        assert_eq!(extract_key(&url, BUCKET).unwrap(), key);
    }
}
