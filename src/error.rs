//! 이벤트 처리 오류 분류

use crate::directory::DirectoryError;
use thiserror::Error;

/// 이벤트 처리 중 발생하는 오류
///
/// Display 문자열이 그대로 해당 연결의 `error` 이벤트 페이로드가 된다.
#[derive(Debug, Error)]
pub enum RelayError {
    /// 서명 불일치, 만료, 형식 오류 등 검증 불가능한 토큰
    #[error("Invalid credential")]
    InvalidCredential(#[source] jsonwebtoken::errors::Error),

    /// 영속성 서비스에 해당 방이 없음
    #[error("Room not found")]
    RoomNotFound,

    /// 방 소유자도 멤버도 아닌 사용자
    #[error("You are not a member of this room")]
    NotAuthorized,

    /// 필수 식별자가 빠진 이벤트. 발신자에게 알리지 않고 로그만 남긴다
    #[error("invalid event payload: {0}")]
    InvalidEventPayload(&'static str),

    /// 영속성 서비스 조회 실패. 일반화된 메시지로만 노출
    #[error("Room lookup failed")]
    CollaboratorUnavailable(#[from] DirectoryError),
}

impl RelayError {
    /// 발신 연결에 `error` 이벤트로 노출할지 여부
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, RelayError::InvalidEventPayload(_))
    }
}
