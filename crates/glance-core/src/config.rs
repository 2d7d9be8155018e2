//! GLANCE 설정 구조체.
//!
//! 설정 파일 로딩/저장은 외부 협력자(자동화 클라이언트의 설정 시스템)가
//! 담당한다. 이 모듈은 해석 완료된 값의 형태만 정의한다.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================
// 인식 백엔드 설정
// ============================================================

/// 인식 백엔드 식별자 — 우선순위 목록과 선택 로그에 사용
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendId {
    /// Tesseract 라이브러리 바인딩 (leptess, `ocr` feature)
    Tesseract,
    /// Tesseract 실행 파일 호출 (PATH에 설치된 경우)
    TesseractCli,
    /// 항상 빈 문자열을 반환하는 최후 폴백
    Noop,
}

impl BackendId {
    /// 로그용 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Tesseract => "tesseract",
            BackendId::TesseractCli => "tesseract-cli",
            BackendId::Noop => "noop",
        }
    }
}

/// 인식 계층 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// 백엔드 탐색 우선순위 (앞이 선호). noop은 항상 마지막에 덧붙는다.
    #[serde(default = "default_backend_priority")]
    pub backend_priority: Vec<BackendId>,
    /// 기본 언어 코드 (예: "en", "jp", "cn", "tw")
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            backend_priority: default_backend_priority(),
            language: default_language(),
        }
    }
}

fn default_backend_priority() -> Vec<BackendId> {
    vec![BackendId::Tesseract, BackendId::TesseractCli, BackendId::Noop]
}

fn default_language() -> String {
    "en".to_string()
}

// ============================================================
// 섀도 평가 설정
// ============================================================

/// 외부 비전 모델 제공자 타입 — 요청/응답 형식 및 인증 헤더 결정에 사용
///
/// URL 문자열 매칭 대신 명시적 enum으로 제공자를 구분한다.
/// 새 제공자 추가 시 variant를 추가하고 클라이언트에서 분기하면 된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VisionProviderType {
    /// Anthropic API — `x-api-key` 헤더 + `/v1/messages` 형식
    Anthropic,
    /// OpenAI 호환 API — `Authorization: Bearer` + `/v1/chat/completions` 형식
    OpenAi,
    /// 기타 제공자 — Bearer 토큰 + OpenAI 형식 파싱
    #[default]
    Generic,
}

/// 외부 비전 모델 API 엔드포인트 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionApiConfig {
    /// API URL (예: "https://api.example.com/v1/messages")
    pub endpoint: String,
    /// API 키 (메모리에만 유지, 비어 있으면 CREDENTIAL 실패로 귀결)
    #[serde(default)]
    pub api_key: String,
    /// 모델 이름 (없으면 제공자 기본값)
    pub model: Option<String>,
    /// 요청 타임아웃 (초) — 평가 태스크 수명의 유일한 상한
    #[serde(default = "default_api_timeout_secs")]
    pub timeout_secs: u64,
    /// 제공자 타입
    #[serde(default)]
    pub provider_type: VisionProviderType,
    /// 전송 전 이미지 긴 변 상한 (픽셀) — API 비용 절감용 축소
    #[serde(default = "default_max_image_edge")]
    pub max_image_edge: u32,
}

impl Default for VisionApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: None,
            timeout_secs: default_api_timeout_secs(),
            provider_type: VisionProviderType::default(),
            max_image_edge: default_max_image_edge(),
        }
    }
}

/// 섀도 평가 서브시스템 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// 섀도 평가 전체 활성화 여부 — false면 dispatch는 아무것도 하지 않는다
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 양성 매치만 평가 — false면 모든 매치 이벤트를 평가한다
    #[serde(default = "default_true")]
    pub positive_matches_only: bool,
    /// 비교 로그 파일 경로 (JSON Lines)
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    /// 평가 워커 수 — 동시 외부 호출 상한
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    /// 대기 큐 용량 — 초과 시 가장 오래된 이벤트부터 폐기 (drop-oldest)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// 외부 비전 모델 API 설정
    #[serde(default)]
    pub api: VisionApiConfig,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            positive_matches_only: true,
            log_path: default_log_path(),
            worker_count: default_worker_count(),
            queue_capacity: default_queue_capacity(),
            api: VisionApiConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_api_timeout_secs() -> u64 {
    10
}

fn default_max_image_edge() -> u32 {
    800
}

fn default_log_path() -> PathBuf {
    PathBuf::from("logs/vision_compare.jsonl")
}

fn default_worker_count() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    32
}
