/// Database access layer
///
/// Free functions over `&PgPool`, one module per table family. Counters are
/// always derived from the `likes` and `comments` tables rather than cached
/// columns.
pub mod lesson_repo;
pub mod like_repo;
pub mod podcast_repo;
pub mod video_repo;

/// Turn a free-text search term into an `ILIKE` pattern matching it anywhere.
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("cats"), "%cats%");
        assert_eq!(contains_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
