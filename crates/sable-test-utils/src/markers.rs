use sable_core::{TextRange, TextSize};

/// Extracts a selection from a fixture containing `[|` and `|]` markers.
///
/// Returns the fixture with markers removed and the range of the selected text.
pub fn extract_range(fixture: &str) -> (String, TextRange) {
    try_extract_range(fixture).expect("fixture missing [| ... |] markers")
}

/// Like [`extract_range`], `None` when the fixture has no `[|` marker.
pub fn try_extract_range(fixture: &str) -> Option<(String, TextRange)> {
    let start_marker = "[|";
    let end_marker = "|]";

    let start = fixture.find(start_marker)?;
    let after_start = start + start_marker.len();
    let end = after_start
        + fixture[after_start..]
            .find(end_marker)
            .expect("fixture missing |] marker");

    let mut text = String::with_capacity(fixture.len());
    text.push_str(&fixture[..start]);
    text.push_str(&fixture[after_start..end]);
    text.push_str(&fixture[end + end_marker.len()..]);

    let range = TextRange::new(offset(start), offset(end - start_marker.len()));
    Some((text, range))
}

/// Removes `$N` markers, returning the stripped text and `(N, offset)` pairs.
///
/// A `$` not followed by a digit is kept (`$"..."` interpolated strings).
pub fn strip_markers(text: &str) -> (String, Vec<(u32, TextSize)>) {
    let mut out = String::with_capacity(text.len());
    let mut markers = Vec::new();

    let bytes = text.as_bytes();
    let mut i = 0usize;
    let mut last = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }

            if j > i + 1 {
                // `$` and ASCII digits are single-byte, so `i` and `j` are char boundaries.
                out.push_str(&text[last..i]);
                let id: u32 = text[i + 1..j].parse().expect("marker id fits in u32");
                markers.push((id, offset(out.len())));
                i = j;
                last = j;
                continue;
            }
        }

        i += 1;
    }

    out.push_str(&text[last..]);

    (out, markers)
}

fn offset(len: usize) -> TextSize {
    TextSize::try_from(len).expect("fixture below 4GiB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_markers_preserves_unicode_and_offsets() {
        let input = "α$0😃β$10";
        let (text, markers) = strip_markers(input);

        assert_eq!(text, "α😃β");
        assert_eq!(
            markers,
            vec![(0, offset("α".len())), (10, offset("α😃β".len()))]
        );
    }

    #[test]
    fn strip_markers_keeps_interpolated_strings() {
        let input = "var s = $\"{x}\";$0 a$";
        let (text, markers) = strip_markers(input);

        assert_eq!(text, "var s = $\"{x}\"; a$");
        assert_eq!(markers, vec![(0, offset(15))]);
    }

    #[test]
    fn extract_range_handles_multibyte_chars() {
        let input = "a[|α😃β|]c";
        let (text, range) = extract_range(input);

        assert_eq!(text, "aα😃βc");
        assert_eq!(&text[range], "α😃β");
    }

    #[test]
    fn extract_range_ignores_block_comments() {
        let (text, range) = extract_range("void M([|Action<string /*name*/>|] a)");
        assert_eq!(&text[range], "Action<string /*name*/>");
        assert_eq!(try_extract_range("no markers"), None);
    }
}
