//! GLANCE 핵심 에러 타입.
//!
//! 어댑터 crate는 자체 실패를 이 타입으로 래핑한다.
//! 인식/섀도 경로의 공개 연산은 에러를 자동화 루프 경계 밖으로
//! 전파하지 않는다 — 빈 문자열 degrade 또는 `Failure` variant로 흡수된다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 직렬화, 설정, I/O 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 인식 엔진 내부 오류 — 호출자에게는 빈 문자열로 흡수된다
    #[error("인식 에러: {0}")]
    Recognition(String),

    /// 네트워크 에러 (연결 실패, 타임아웃)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 비교 레코드 기록 실패 — 진단 채널에 경고만 남기고 태스크는 계속된다
    #[error("로그 기록 실패: {0}")]
    LogWrite(String),
}
