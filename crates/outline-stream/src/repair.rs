use crate::outline::OutlineItem;

/// Result of interpreting the accumulated args buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeResult {
    /// The buffer decoded and carried a `slides` array.
    Decoded(Vec<OutlineItem>),
    /// The buffer is not yet an interpretable outline payload; retry on the
    /// next delta.
    Incomplete,
}

/// Structurally completes a possibly-truncated JSON buffer.
///
/// Single stack-based scan tracking string/escape state and open scopes.
/// A scan ending inside an escape drops the dangling backslash, an open
/// string is closed, trailing whitespace and at most one structural comma
/// are trimmed, then the missing closers are appended innermost-first.
/// Already-balanced input is returned unchanged. The output is only a
/// candidate: callers still run a strict parse on it.
pub fn repair_truncated(input: &str) -> String {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                // a mismatched closer is left for the strict parse to reject
                if stack.last() == Some(&ch) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    if !in_string && stack.is_empty() {
        return input.to_string();
    }

    let mut repaired = input.to_string();
    if escaped {
        repaired.pop();
    }
    if in_string {
        repaired.push('"');
    }
    repaired.truncate(repaired.trim_end().len());
    if repaired.ends_with(',') {
        repaired.pop();
    }
    while let Some(closer) = stack.pop() {
        repaired.push(closer);
    }
    repaired
}

/// Attempts to interpret the full accumulated buffer as an outline payload
/// shaped `{ "slides": [ { "content": … }, … ], … }`.
///
/// Free function with no hidden state: the same buffer contents always
/// produce the same result, and a failed attempt is `Incomplete`, never an
/// error — mid-token buffers are expected on almost every delta.
pub fn decode_outline(buffer: &str) -> DecodeResult {
    if buffer.trim().is_empty() {
        return DecodeResult::Incomplete;
    }
    let repaired = repair_truncated(buffer);
    let value: serde_json::Value = match serde_json::from_str(&repaired) {
        Ok(value) => value,
        Err(_) => return DecodeResult::Incomplete,
    };
    let Some(slides) = value.get("slides") else {
        return DecodeResult::Incomplete;
    };
    match serde_json::from_value::<Vec<OutlineItem>>(slides.clone()) {
        Ok(items) => DecodeResult::Decoded(items),
        Err(_) => DecodeResult::Incomplete,
    }
}
