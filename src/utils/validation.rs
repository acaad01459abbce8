use anyhow::{Result, anyhow};
use std::path::Path;

/// Sanitizes a client-supplied filename so it is safe to embed in a
/// scratch-directory path. Strips any path components, replaces reserved
/// characters, and clamps the length. An empty result is allowed; the
/// scratch store then falls back to timestamp-only naming.
pub fn sanitize_filename(filename: &str) -> String {
    // Get only the filename component (remove any path)
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    // Check for path traversal attempts
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    // Remove dangerous characters, keep only safe ones
    // We allow most Unicode characters but block path separators and reserved characters
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Prevent hidden files
    let sanitized = sanitized.trim_start_matches('.').to_string();

    // Limit length safely for UTF-8
    if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    }
}

/// Checks that the uploaded bytes look like an image. The declared
/// Content-Type is advisory; the magic bytes decide.
pub fn validate_image(content: &[u8], content_type: Option<&str>) -> Result<()> {
    if content.is_empty() {
        return Err(anyhow!("Uploaded image file is empty"));
    }

    if let Some(ct) = content_type {
        if let Ok(m) = ct.parse::<mime::Mime>() {
            if m.type_() != mime::IMAGE {
                return Err(anyhow!(
                    "Unsupported content type '{}', expected an image",
                    ct
                ));
            }
        }
    }

    match infer::get(content) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(()),
        Some(kind) => Err(anyhow!(
            "File content is {}, not an image",
            kind.mime_type()
        )),
        None => Err(anyhow!("File content is not a recognized image format")),
    }
}
