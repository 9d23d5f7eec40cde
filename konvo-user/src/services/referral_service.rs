use diesel::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;

use konvo_shared::errors::{AppError, AppResult};

use crate::schema::profiles;

const CODE_PREFIX: &str = "KONVO-";
const CODE_LEN: usize = 6;
const MAX_GENERATION_ATTEMPTS: u32 = 5;

fn random_code() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("{CODE_PREFIX}{suffix}")
}

/// Generate a referral code not yet present in the store. Collisions are
/// rare at this keyspace; a handful of attempts is plenty.
pub fn generate_referral_code(conn: &mut PgConnection) -> AppResult<String> {
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let code = random_code();
        let taken: i64 = profiles::table
            .filter(profiles::referral_code.eq(&code))
            .count()
            .get_result(conn)?;
        if taken == 0 {
            return Ok(code);
        }
    }
    Err(AppError::internal("could not generate a unique referral code"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_format() {
        let code = random_code();
        assert!(code.starts_with(CODE_PREFIX));
        assert_eq!(code.len(), CODE_PREFIX.len() + CODE_LEN);
        assert!(code[CODE_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn codes_vary() {
        let codes: std::collections::HashSet<String> = (0..50).map(|_| random_code()).collect();
        assert!(codes.len() > 1);
    }
}
