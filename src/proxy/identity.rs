use rand::seq::SliceRandom;
use rand::Rng;

/// Fixed pool of client identities, one drawn at random per request attempt.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:45.0) Gecko/20100101 Firefox/45.0",
    "Opera/9.80 (Windows NT 6.2; WOW64) Presto/2.12.388 Version/12.17",
    "Mozilla/5.0 (Windows NT 6.1; WOW64; rv:47.0) Gecko/20100101 Firefox/47.0",
];

pub fn random_user_agent<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    USER_AGENTS.choose(rng).copied().unwrap_or(USER_AGENTS[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_user_agent_is_from_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let agent = random_user_agent(&mut rng);
            assert!(USER_AGENTS.contains(&agent));
        }
    }

    #[test]
    fn test_random_user_agent_is_deterministic_per_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..10 {
            assert_eq!(random_user_agent(&mut a), random_user_agent(&mut b));
        }
    }
}
