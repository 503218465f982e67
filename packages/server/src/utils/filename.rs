/// Longest display name accepted, in characters.
const MAX_NAME_CHARS: usize = 255;

/// Longest sanitized name carried inside a blob key, in bytes.
const MAX_KEY_NAME_LEN: usize = 100;

/// Result of validating a display name.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Name is empty or whitespace-only.
    Empty,
    /// Name is longer than the allowed maximum.
    TooLong,
    /// Name contains control characters (CR, LF, NUL, etc.).
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "File name cannot be empty",
            Self::TooLong => "File name must be at most 255 characters",
            Self::ControlCharacter => "Invalid file name: control characters are not allowed",
        }
    }
}

/// Validates a display name and returns it trimmed.
pub fn validate_display_name(name: &str) -> Result<&str, FilenameError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(FilenameError::TooLong);
    }

    // Names end up in Content-Disposition headers on the client side.
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    Ok(trimmed)
}

/// Reduces a display name to a single safe blob-key segment.
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; everything else becomes `_`.
/// Leading dots are replaced so the segment is never `.`/`..` or hidden.
pub fn sanitize_key_segment(name: &str) -> String {
    let mut segment: String = name
        .trim()
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .take(MAX_KEY_NAME_LEN)
        .collect();

    if segment.starts_with('.') {
        segment = segment.replacen('.', "_", 1);
    }

    if segment.is_empty() {
        return "file".to_string();
    }

    segment
}
