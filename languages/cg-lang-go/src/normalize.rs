//! Pure type-FQN normalization, shared by Pass 2a (return types) and Pass
//! 2b (variable bindings). Kept as a pure function of `(rawType,
//! importPath)` so idempotency (§8 invariant 5) is trivially testable.

const PRIMITIVES: &[&str] = &[
    "string", "int", "int8", "int16", "int32", "int64", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr", "float32", "float64", "complex64", "complex128", "bool", "byte", "rune",
    "error", "nil", "any",
];

/// Normalize a raw type expression into a type FQN.
///
/// Strips leading `*` and `[]` markers, then: a recognized primitive (or
/// one of the distinguished types `error`/`byte`/`rune`/`nil`) becomes
/// `builtin.<name>`; a name that already contains `.` is a cross-package
/// reference and is kept verbatim; anything else is qualified with
/// `package_path`.
pub fn normalize_type(raw: &str, package_path: &str) -> String {
    let stripped = strip_pointer_and_slice(raw.trim());

    if stripped.contains('.') {
        return stripped.to_string();
    }

    if PRIMITIVES.contains(&stripped) {
        return format!("builtin.{stripped}");
    }

    format!("{package_path}.{stripped}")
}

fn strip_pointer_and_slice(mut raw: &str) -> &str {
    loop {
        if let Some(rest) = raw.strip_prefix('*') {
            raw = rest.trim_start();
        } else if let Some(rest) = raw.strip_prefix("[]") {
            raw = rest.trim_start();
        } else {
            break;
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_becomes_builtin() {
        assert_eq!(normalize_type("string", "main"), "builtin.string");
        assert_eq!(normalize_type("*string", "main"), "builtin.string");
        assert_eq!(normalize_type("[]byte", "main"), "builtin.byte");
    }

    #[test]
    fn distinguished_types_are_builtin() {
        assert_eq!(normalize_type("error", "main"), "builtin.error");
        assert_eq!(normalize_type("nil", "main"), "builtin.nil");
    }

    #[test]
    fn cross_package_reference_is_kept_verbatim() {
        assert_eq!(normalize_type("*net/http.Response", "main"), "net/http.Response");
    }

    #[test]
    fn bare_local_name_is_qualified_with_package_path() {
        assert_eq!(normalize_type("User", "example.com/app/pkg"), "example.com/app/pkg.User");
    }

    #[test]
    fn normalization_is_idempotent() {
        for (raw, pkg) in [
            ("string", "main"),
            ("*net/http.Response", "main"),
            ("User", "example.com/app/pkg"),
        ] {
            let once = normalize_type(raw, pkg);
            let twice = normalize_type(&once, pkg);
            assert_eq!(once, twice);
        }
    }
}
