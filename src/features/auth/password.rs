use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::AppError;

/// 固定工作因子（OWASP 推荐的 Argon2id 最低配置：19 MiB / 2 次迭代 / 1 并行度）
const MEMORY_KIB: u32 = 19 * 1024;
const ITERATIONS: u32 = 2;
const PARALLELISM: u32 = 1;

fn hasher() -> Result<Argon2<'static>, AppError> {
    let params = Params::new(MEMORY_KIB, ITERATIONS, PARALLELISM, None)
        .map_err(|e| AppError::Internal(format!("argon2 params: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// 生成带随机盐的 PHC 格式口令哈希
pub fn hash_password(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("hash password: {e}")))?;
    Ok(hash.to_string())
}

/// 校验口令。
///
/// 口令不匹配返回 `Ok(false)`；只有哈希本身格式损坏才返回错误（属于部署问题而非“口令错误”）。
pub fn verify_password(plaintext: &str, digest: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AppError::Internal(format!("malformed password hash: {e}")))?;
    match hasher()?.verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!("verify password: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn hash_then_verify() {
        let digest = hash_password("admin123").expect("hash");
        assert!(digest.starts_with("$argon2id$"));
        assert!(verify_password("admin123", &digest).expect("verify"));
        assert!(!verify_password("wrong", &digest).expect("verify"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("demo123").expect("hash");
        let b = hash_password("demo123").expect("hash");
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_is_an_error_not_a_mismatch() {
        assert!(verify_password("admin123", "not-a-phc-string").is_err());
    }
}
