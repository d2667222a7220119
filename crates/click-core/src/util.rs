//! Small helpers shared by controls and pages.

/// Derive a display label from a control name.
///
/// Splits camel case and separators into capitalized words, so
/// `firstName` becomes `First Name` and `email_address` becomes
/// `Email Address`.
pub fn to_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for c in name.chars() {
        if c == '_' || c == '-' || c == '.' {
            if !label.is_empty() && !label.ends_with(' ') {
                label.push(' ');
            }
            prev = Some(' ');
            continue;
        }

        match prev {
            None | Some(' ') => label.extend(c.to_uppercase()),
            Some(p) => {
                if c.is_uppercase() && !p.is_uppercase() {
                    label.push(' ');
                }
                label.push(c);
            }
        }
        prev = Some(c);
    }

    label.trim_end().to_string()
}

/// Normalize a page path to start with `/`.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
