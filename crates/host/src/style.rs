//! Inline style declaration lists.

/// Parse a `style` attribute / `cssText` value into ordered declarations.
/// Later duplicates overwrite earlier ones in place; malformed entries are skipped.
pub(crate) fn parse_declarations(text: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for decl in text.split(';') {
        let Some((name, value)) = decl.split_once(':') else {
            continue;
        };
        let name = normalize_name(name.trim());
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        set_declaration(&mut out, &name, value);
    }
    out
}

pub(crate) fn serialize_declarations(decls: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in decls {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push(';');
    }
    out
}

pub(crate) fn set_declaration(decls: &mut Vec<(String, String)>, name: &str, value: &str) {
    match decls.iter_mut().find(|(n, _)| n == name) {
        Some((_, v)) => {
            v.clear();
            v.push_str(value);
        }
        None => decls.push((name.to_string(), value.to_string())),
    }
}

/// Property names are ASCII case-insensitive except custom properties.
pub(crate) fn normalize_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_string()
    } else {
        name.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_serializes_declarations() {
        let decls = parse_declarations("Color: red; ; width:1px;bogus; --Gap: 2px");
        assert_eq!(
            decls,
            [
                ("color".to_string(), "red".to_string()),
                ("width".to_string(), "1px".to_string()),
                ("--Gap".to_string(), "2px".to_string()),
            ]
        );
        assert_eq!(
            serialize_declarations(&decls),
            "color: red; width: 1px; --Gap: 2px;"
        );
    }

    #[test]
    fn duplicate_declaration_keeps_first_position() {
        let decls = parse_declarations("color: red; width: 1px; color: blue");
        assert_eq!(serialize_declarations(&decls), "color: blue; width: 1px;");
    }
}
