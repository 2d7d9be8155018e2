//! No-op 백엔드 — 보장된 최후 폴백.
//!
//! 어떤 인식 의존성도 설치되어 있지 않은 환경에서 `select()`가 항상
//! 성공하도록 해준다. 모든 요청 형태에 대해 빈 문자열을 반환하며
//! 지연이 거의 0이다.

use parking_lot::Mutex;

use glance_core::config::BackendId;
use glance_core::models::recognition::RecognitionRequest;
use glance_core::ports::recognition_backend::RecognitionBackend;

/// 의존성 0의 빈 문자열 백엔드
pub struct NoopBackend {
    language: String,
    // 화이트리스트는 인식에 쓰이지 않지만 계약상 보관/복원은 지켜야 한다
    whitelist: Mutex<Option<String>>,
}

impl NoopBackend {
    /// 새 no-op 백엔드 생성
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            whitelist: Mutex::new(None),
        }
    }
}

impl RecognitionBackend for NoopBackend {
    fn id(&self) -> BackendId {
        BackendId::Noop
    }

    fn default_language(&self) -> &str {
        &self.language
    }

    fn set_whitelist(&self, whitelist: Option<&str>) {
        *self.whitelist.lock() = whitelist.map(String::from);
    }

    fn whitelist(&self) -> Option<String> {
        self.whitelist.lock().clone()
    }

    fn recognize(&self, _request: &RecognitionRequest<'_>) -> String {
        String::new()
    }
}
