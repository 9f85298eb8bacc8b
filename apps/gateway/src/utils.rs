//! Gateway utility functions.

/// Expand `${VAR}` and `${VAR:-default}` patterns with environment values.
///
/// An unset variable without a default expands to an empty string. An
/// unterminated `${` is kept as written.
pub fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };

        let (name, default) = match after[..end].split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (&after[..end], None),
        };
        match std::env::var(name) {
            Ok(value) if !value.is_empty() || default.is_none() => out.push_str(&value),
            _ => out.push_str(default.unwrap_or_default()),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
