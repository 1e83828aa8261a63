//! Visible text of a markup fragment

/// Longest entity reference looked at, `&` and `;` included
const MAX_ENTITY_LEN: usize = 10;

/// Text a browser would show for `fragment`
///
/// Tags are dropped without leaving a gap, entity references are decoded in
/// the same pass (so `&amp;pound;` stays `&pound;`), whitespace runs collapse
/// to one space and the ends are trimmed.
pub fn text_content(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut rest = fragment;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => {
                rest = rest.find('>').map_or("", |end| &rest[end + 1..]);
                continue;
            }
            '&' => {
                if let Some((decoded, len)) = entity_at(rest) {
                    push_visible(&mut out, decoded);
                    rest = &rest[len..];
                    continue;
                }
            }
            _ => {}
        }
        push_visible(&mut out, ch);
        rest = &rest[ch.len_utf8()..];
    }

    out.truncate(out.trim_end().len());
    out
}

fn push_visible(out: &mut String, ch: char) {
    if !ch.is_whitespace() {
        out.push(ch);
    } else if !out.is_empty() && !out.ends_with(' ') {
        out.push(' ');
    }
}

/// Decode the entity reference `s` starts with, returning it and its length
fn entity_at(s: &str) -> Option<(char, usize)> {
    let end = s
        .char_indices()
        .take(MAX_ENTITY_LEN)
        .find(|&(_, c)| c == ';')
        .map(|(i, _)| i)?;

    let decoded = match &s[1..end] {
        "pound" => '£',
        "dollar" => '$',
        "comma" => ',',
        "amp" => '&',
        "nbsp" => ' ',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        name => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(|c| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, end + 1))
}
