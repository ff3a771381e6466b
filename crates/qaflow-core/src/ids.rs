/// Generates an opaque, prefixed identifier (e.g. `run-1a2b3c4d`).
///
/// Ids are intentionally opaque: callers must not parse structure out of
/// them beyond the human-readable prefix used for log grepping.
pub fn generate_id(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(12)
        .collect::<String>();
    format!("{prefix}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_generate_id_uses_requested_prefix_and_is_unique() {
        let first = generate_id("run");
        let second = generate_id("run");
        assert!(first.starts_with("run-"));
        assert!(second.starts_with("run-"));
        assert_ne!(first, second);
    }
}
