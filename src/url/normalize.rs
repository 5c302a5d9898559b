use crate::UrlError;
use url::Url;

/// Canonicalizes a discovered link relative to the page it appeared on
///
/// Resolution follows URL-reference semantics (`base.join(raw)`), so both
/// absolute links and relative paths are handled. The canonical form is also
/// the fetch-target form: there is exactly one string per resource, used for
/// dedup comparison and for the request itself.
///
/// # Canonicalization Steps
///
/// 1. Resolve `raw` against `base`; a malformed reference is an error
/// 2. Reject non-HTTP(S) schemes (`mailto:`, `javascript:`, `tel:`, `data:`)
/// 3. Reject links that resolve back to `base` itself (fragment-only
///    references and bare self-links)
/// 4. Drop the fragment
/// 5. Strip a leading `www.` label from the host
///
/// # Returns
///
/// * `Ok(Some(url))` - the canonical URL
/// * `Ok(None)` - the link is valid but not crawlable (rejected)
/// * `Err(UrlError)` - the reference could not be resolved
pub fn normalize(raw: &str, base: &Url) -> Result<Option<Url>, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let mut resolved = base
        .join(raw)
        .map_err(|e| UrlError::Resolve(format!("{}: {}", raw, e)))?;

    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return Ok(None);
    }

    resolved.set_fragment(None);

    // A link that leads back to the page it was found on (an in-page anchor
    // or a bare self-reference) is never new work.
    if resolved == *base {
        return Ok(None);
    }

    strip_www(&mut resolved)?;

    Ok(Some(resolved))
}

/// Canonicalizes a seed URL
///
/// Applies the same transformation discovered links receive (fragment
/// dropped, `www.` stripped), so the dedup key and the fetch target are one
/// and the same string for the crawl root too.
pub fn canonicalize(url: &Url) -> Result<Url, UrlError> {
    let mut canonical = url.clone();
    canonical.set_fragment(None);
    strip_www(&mut canonical)?;
    Ok(canonical)
}

/// Removes a leading `www.` label from the URL host
///
/// The remaining host must be non-empty; a literal `www` host is left alone.
fn strip_www(url: &mut Url) -> Result<(), UrlError> {
    let host = url.host_str().ok_or(UrlError::MissingHost)?;
    if let Some(rest) = host.strip_prefix("www.") {
        if !rest.is_empty() {
            let rest = rest.to_string();
            url.set_host(Some(&rest))
                .map_err(|e| UrlError::Malformed(format!("failed to set host: {}", e)))?;
        }
    }
    Ok(())
}
