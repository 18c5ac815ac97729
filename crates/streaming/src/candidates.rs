/// Extensions probed, in order, for panorama references without one.
pub const DEFAULT_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// Split `reference` into the path part and any `?query`/`#fragment` suffix.
fn split_suffix(reference: &str) -> (&str, &str) {
    match reference.find(['?', '#']) {
        Some(i) => reference.split_at(i),
        None => (reference, ""),
    }
}

/// `true` if the last path segment of `reference` carries a file extension.
///
/// Leading-dot names (`.hidden`) and trailing dots (`name.`) do not count.
pub fn has_extension(reference: &str) -> bool {
    let (path, _) = split_suffix(reference);
    let segment = path.rsplit('/').next().unwrap_or(path);
    match segment.rfind('.') {
        Some(i) => i > 0 && i + 1 < segment.len(),
        None => false,
    }
}

/// Paths to try, in order, for a panorama reference.
///
/// A reference with an extension is used as-is; otherwise every extension is
/// appended in order. Query strings and fragments stay at the end.
pub fn panorama_candidates<S: AsRef<str>>(reference: &str, extensions: &[S]) -> Vec<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Vec::new();
    }
    if has_extension(reference) {
        return vec![reference.to_string()];
    }

    let (path, suffix) = split_suffix(reference);
    extensions
        .iter()
        .map(|ext| format!("{path}{}{suffix}", ext.as_ref()))
        .collect()
}
