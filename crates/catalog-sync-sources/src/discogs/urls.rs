//! URL normalization for the source service.
//!
//! Listing pages link to `/release/12345-Album-Name` while the canonical
//! form and the API use the bare numeric id. Target-side external links
//! always store the canonical www form.

/// Truncate the last path segment at its first hyphen, dropping the display
/// slug. Idempotent; paths without a slug come back unchanged.
pub fn url_short_form(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((head, last)) => {
            let id = last.split_once('-').map(|(id, _)| id).unwrap_or(last);
            format!("{}/{}", head, id)
        }
        None => path.to_string(),
    }
}

/// Rewrite an API resource URL to the www form the target stores in its
/// external-link relations. www-form URLs pass through unchanged.
pub fn api_url_to_www(url: &str) -> String {
    let mut fixed = url.replacen("//api.", "//www.", 1);
    for (api_segment, www_segment) in [
        ("/releases/", "/release/"),
        ("/masters/", "/master/"),
        ("/artists/", "/artist/"),
    ] {
        if fixed.contains(api_segment) {
            fixed = fixed.replacen(api_segment, www_segment, 1);
            break;
        }
    }
    fixed
}

/// Numeric id in the last path segment of a canonical URL.
pub fn release_id(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
}
