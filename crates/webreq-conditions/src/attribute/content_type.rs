//! Content-Type parsing.

/// Extract the bare MIME type from a `Content-Type` value.
///
/// Parameters such as `charset` are dropped and the result is lowercased.
/// Returns `None` when the value has no `type/subtype` form.
pub fn mime_type(content_type: &str) -> Option<String> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();

    let (top, sub) = essence.split_once('/')?;
    if top.trim().is_empty() || sub.trim().is_empty() {
        return None;
    }
    Some(essence.to_ascii_lowercase())
}

/// Pick the effective `Content-Type` among repeated header values.
///
/// A value may itself be a comma-separated list. The last entry with a valid
/// MIME type wins; when none is valid the last entry is returned as is.
pub fn resolve_content_type<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut last = None;
    let mut last_valid = None;
    for entry in values
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
    {
        if mime_type(entry).is_some() {
            last_valid = Some(entry);
        }
        last = Some(entry);
    }
    last_valid.or(last).map(str::to_string)
}
