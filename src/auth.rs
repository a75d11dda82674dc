//! 접속 자격증명(JWT) 검증
//!
//! 토큰 발급은 외부 인증 서비스의 몫이고, 이 서버는 공유 시크릿으로
//! 서명과 만료만 확인한다. 검증 결과는 저장하지 않는다.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// 토큰에 담긴 클레임
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 사용자 식별자
    pub sub: String,
    /// 표시 이름 (구버전 토큰에는 없음)
    #[serde(default)]
    pub username: Option<String>,
    /// 만료 시각 (Unix timestamp)
    pub exp: u64,
    /// 발급 시각 (Unix timestamp)
    #[serde(default)]
    pub iat: u64,
}

/// 자격증명 검증 및 클레임 해독
///
/// 서명 불일치, 만료, 형식 오류는 모두 `InvalidCredential`로 귀결된다.
pub fn verify_credential(token: &str, secret: &str) -> Result<Claims, RelayError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(RelayError::InvalidCredential)
}
