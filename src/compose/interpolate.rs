use super::env::Environment;

/// Substitute environment variables in compose file text.
///
/// Supported forms: `$VAR`, `${VAR}`, `${VAR:-default}` (default when
/// unset or empty), `${VAR-default}` (default when unset) and `$$` as a
/// literal dollar sign. Unset variables expand to the empty string.
pub fn interpolate(input: &str, environment: &Environment) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            output.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                output.push('$');
            }
            Some('{') => {
                chars.next();
                let mut expression = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    expression.push(c);
                }
                if closed {
                    output.push_str(&expand_braced(&expression, environment));
                } else {
                    // unterminated expression, keep the text as-is
                    output.push_str("${");
                    output.push_str(&expression);
                }
            }
            Some(c) if c.is_ascii_alphabetic() || *c == '_' => {
                let mut name = String::new();
                while let Some(c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '_' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if let Some(value) = environment.lookup(&name) {
                    output.push_str(&value);
                }
            }
            _ => output.push('$'),
        }
    }

    output
}

fn expand_braced(expression: &str, environment: &Environment) -> String {
    if let Some((name, default)) = expression.split_once(":-") {
        match environment.lookup(name) {
            Some(value) if !value.is_empty() => value,
            _ => default.to_string(),
        }
    } else if let Some((name, default)) = expression.split_once('-') {
        environment.lookup(name).unwrap_or_else(|| default.to_string())
    } else {
        environment.lookup(expression).unwrap_or_default()
    }
}
