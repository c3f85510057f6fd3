//! Logo uploads. A logo is only ever stored next to the QR image and overlaid
//! when rendering; it never touches the encoded payload.

use crate::encoder::{decode_data_url, to_data_url};
use crate::error::QrError;

pub const MAX_LOGO_BYTES: u64 = 5 * 1024 * 1024;

/// Rejects an upload from its declared length, before the body is read.
pub fn check_declared_size(size: u64) -> Result<(), QrError> {
    if size > MAX_LOGO_BYTES {
        return Err(QrError::OversizedAsset {
            size,
            max: MAX_LOGO_BYTES,
        });
    }
    Ok(())
}

pub fn logo_ref_from_upload(content_type: &str, bytes: &[u8]) -> Result<String, QrError> {
    check_declared_size(bytes.len() as u64)?;
    let mime_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !is_image(&mime_type) {
        return Err(QrError::Validation("Logo must be an image".into()));
    }
    if bytes.is_empty() {
        return Err(QrError::Validation("Logo file is empty".into()));
    }
    Ok(to_data_url(&mime_type, bytes))
}

/// Checks a logo reference sent along with a generation request.
pub fn validate_logo_ref(logo_ref: &str) -> Result<(), QrError> {
    let logo = decode_data_url(logo_ref)
        .ok_or_else(|| QrError::Validation("Logo must be a base64 data URL".into()))?;
    if !is_image(&logo.mime_type) {
        return Err(QrError::Validation("Logo must be an image".into()));
    }
    check_declared_size(logo.bytes.len() as u64)
}

fn is_image(mime_type: &str) -> bool {
    mime_type
        .strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn accepts_logos_up_to_the_ceiling() {
        assert!(check_declared_size(0).is_ok());
        assert!(check_declared_size(MAX_LOGO_BYTES).is_ok());
        assert!(matches!(
            check_declared_size(MAX_LOGO_BYTES + 1),
            Err(QrError::OversizedAsset { size, max }) if size == MAX_LOGO_BYTES + 1 && max == MAX_LOGO_BYTES
        ));
    }

    #[test]
    fn builds_data_url_from_upload() {
        let logo_ref = logo_ref_from_upload("image/png; charset=binary", &[1, 2, 3]).unwrap();
        assert_eq!(logo_ref, "data:image/png;base64,AQID");
        assert!(validate_logo_ref(&logo_ref).is_ok());
    }

    #[test]
    fn rejects_non_image_uploads() {
        for content_type in ["text/plain", "application/octet-stream", "image/", ""] {
            assert!(matches!(
                logo_ref_from_upload(content_type, &[1]),
                Err(QrError::Validation(_))
            ));
        }
        assert!(matches!(
            logo_ref_from_upload("image/png", &[]),
            Err(QrError::Validation(_))
        ));
    }

    #[test]
    fn rejects_oversized_uploads() {
        let bytes = vec![0u8; MAX_LOGO_BYTES as usize + 1];
        assert!(matches!(
            logo_ref_from_upload("image/png", &bytes),
            Err(QrError::OversizedAsset { .. })
        ));
        let logo_ref = to_data_url("image/png", &bytes);
        assert!(matches!(
            validate_logo_ref(&logo_ref),
            Err(QrError::OversizedAsset { .. })
        ));
    }

    #[test]
    fn rejects_malformed_logo_refs() {
        for logo_ref in ["https://a.test/logo.png", "data:text/plain;base64,AQID", "data:image/png;base64,%%"] {
            assert!(matches!(validate_logo_ref(logo_ref), Err(QrError::Validation(_))), "{logo_ref}");
        }
    }
}
