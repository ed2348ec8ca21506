use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// One-time token embedded in the public scheduling link. 32 alphanumeric
/// characters drawn from the OS CSPRNG carry roughly 190 bits of entropy;
/// uniqueness among active tokens is enforced by the store.
pub fn generate_scheduler_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let a = generate_scheduler_token();
        let b = generate_scheduler_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }
}
