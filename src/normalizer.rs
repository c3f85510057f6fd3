use crate::error::QrError;
use url::Url;

/// Fragment written onto every encoded URL.
pub const BRAND_FRAGMENT: &str = "Quick_QR";

pub fn validate(input: &str) -> bool {
    normalize(input).is_ok()
}

/// Parses `input` as an absolute URL with a host.
pub fn normalize(input: &str) -> Result<Url, QrError> {
    if input.trim().is_empty() {
        return Err(QrError::invalid_url());
    }
    let url = Url::parse(input).map_err(|err| {
        tracing::debug!("Rejected url {:?}: {}", input, err);
        QrError::invalid_url()
    })?;
    if !url.has_host() {
        tracing::debug!("Rejected url {:?}: missing host", input);
        return Err(QrError::invalid_url());
    }
    Ok(url)
}

/// Overwrites the fragment with [`BRAND_FRAGMENT`], leaving everything else as parsed.
pub fn brand(url: &Url) -> Url {
    let mut branded = url.clone();
    branded.set_fragment(Some(BRAND_FRAGMENT));
    branded
}
