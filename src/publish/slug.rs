use deunicode::deunicode;

/// URL slug for a document title.
///
/// Transliterates to ASCII, lowercases, turns `/` and whitespace into `-`, and
/// drops every other character that is not alphanumeric, `-` or `_`.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode(title).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    for c in ascii.chars() {
        match c {
            'a'..='z' | '0'..='9' | '_' => slug.push(c),
            '-' | '/' => push_dash(&mut slug),
            c if c.is_whitespace() => push_dash(&mut slug),
            _ => {}
        }
    }

    slug.trim_matches('-').to_string()
}

fn push_dash(slug: &mut String) {
    if !slug.is_empty() && !slug.ends_with('-') {
        slug.push('-');
    }
}
