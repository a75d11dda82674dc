//! 환경 변수 기반 설정 관리

use std::env;

/// 서버 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    #[allow(dead_code)]
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
    pub typing: TypingConfig,
    pub directory: DirectoryConfig,
    pub log_level: String,
}

/// 인증 토큰 설정
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
}

/// 타이핑 표시 설정
#[derive(Debug, Clone)]
pub struct TypingConfig {
    pub expiry_ms: u64,
    pub sweep_interval_ms: u64,
}

/// 방 영속성 서비스 설정
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub service_url: Option<String>,
    pub request_timeout_ms: u64,
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5503".to_string())
                .parse()
                .unwrap_or(5503),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            auth: AuthConfig {
                secret: env::var("AUTH_TOKEN_SECRET")
                    .unwrap_or_else(|_| "codehive-dev-secret".to_string()),
            },
            typing: TypingConfig {
                expiry_ms: env::var("TYPING_EXPIRY_MS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
                sweep_interval_ms: env::var("TYPING_SWEEP_INTERVAL_MS")
                    .unwrap_or_else(|_| "60000".to_string())
                    .parse()
                    .unwrap_or(60000),
            },
            directory: DirectoryConfig {
                service_url: env::var("ROOM_SERVICE_URL").ok().filter(|s| !s.is_empty()),
                request_timeout_ms: env::var("ROOM_SERVICE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
            },
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
