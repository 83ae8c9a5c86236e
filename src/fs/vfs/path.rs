//! Manipulação de caminhos absolutos.

/// Quantos caracteres iniciais de `a` e `b` coincidem.
pub fn count_match(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Separa um caminho absoluto em (dirname, basename).
///
/// `"/dev"` vira `("/", "dev")`, `"/a/b"` vira `("/a", "b")` e a raiz
/// vira `("/", "")`.
pub fn split(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return ("/", "");
    }
    match trimmed.rfind('/') {
        Some(0) => ("/", &trimmed[1..]),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => ("/", trimmed),
    }
}

/// Normaliza removendo a barra final (exceto na raiz).
pub fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_match() {
        assert_eq!(count_match("/dev", "/dev/stdin"), 4);
        assert_eq!(count_match("/", "/bin"), 1);
        assert_eq!(count_match("/proc", "/dev"), 1);
    }

    #[test]
    fn test_split() {
        assert_eq!(split("/dev"), ("/", "dev"));
        assert_eq!(split("/a/b"), ("/a", "b"));
        assert_eq!(split("/"), ("/", ""));
        assert_eq!(split("/dev/"), ("/", "dev"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/proc/"), "/proc");
        assert_eq!(normalize("/"), "/");
    }
}
