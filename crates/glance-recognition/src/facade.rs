//! 인식 파사드 — 자동화 모듈이 소비하는 유일한 표면.
//!
//! 뒤에 어떤 엔진이 있는지는 절대 새어나가지 않는다. 호출자는
//! 아래 연산만 의존한다: `recognize`, `recognize_single_line`,
//! `recognize_batch`, `recognize_atomic`, `set_whitelist`.

use std::sync::Arc;

use image::DynamicImage;
use tracing::debug;

use glance_core::models::recognition::{RecognitionHint, RecognitionRequest};

use crate::duration::{self, DURATION_WHITELIST};
use crate::selector::BackendSelector;

/// 안정 인식 표면
///
/// 모든 연산은 동기이며 에러를 던지지 않는다 — 자동화 루프는 반환된
/// 문자열만 보고 다음 행동을 정한다.
pub struct Recognizer {
    selector: Arc<BackendSelector>,
}

impl Recognizer {
    /// 셀렉터를 받아 파사드 생성. 셀렉터 공유로 테스트에서 가짜 백엔드를
    /// 주입할 수 있다.
    pub fn new(selector: Arc<BackendSelector>) -> Self {
        Self { selector }
    }

    /// 일반 인식. `whitelist`는 이번 호출에만 적용된다.
    pub fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
        whitelist: Option<&str>,
    ) -> String {
        let backend = self.selector.select();
        let req = RecognitionRequest::new(image, language).with_whitelist(whitelist);
        let text = backend.recognize(&req);
        debug!(backend = backend.id().as_str(), len = text.len(), "인식 완료");
        text
    }

    /// 단일 행 인식 (백엔드 기본 언어)
    pub fn recognize_single_line(&self, image: &DynamicImage) -> String {
        let backend = self.selector.select();
        let req = RecognitionRequest::new(image, backend.default_language()).single_line();
        backend.recognize(&req)
    }

    /// 단일 행 이미지 배치 인식 — 입력과 1:1, 순서 보존
    pub fn recognize_batch(&self, images: &[DynamicImage]) -> Vec<String> {
        self.selector.select().recognize_batch(images)
    }

    /// 배치 동안만 화이트리스트를 덮어쓰는 원자적 인식
    pub fn recognize_atomic(
        &self,
        images: &[DynamicImage],
        whitelist: Option<&str>,
    ) -> Vec<Vec<char>> {
        self.selector.select().recognize_atomic(images, whitelist)
    }

    /// 지속 화이트리스트 설정. `None`은 제약 해제.
    pub fn set_whitelist(&self, whitelist: Option<&str>) {
        self.selector.select().set_whitelist(whitelist);
    }

    /// `HH:MM:SS` 소요 시간 인식 + 파싱
    pub fn recognize_duration(&self, image: &DynamicImage) -> chrono::Duration {
        let backend = self.selector.select();
        let req = RecognitionRequest::new(image, backend.default_language())
            .with_whitelist(Some(DURATION_WHITELIST))
            .single_line()
            .with_hint(RecognitionHint::Duration);
        duration::parse_duration(&backend.recognize(&req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop::NoopBackend;
    use crate::selector::BackendDescriptor;
    use glance_core::config::BackendId;
    use image::RgbaImage;

    fn noop_recognizer() -> Recognizer {
        let selector = BackendSelector::new(
            vec![BackendDescriptor::new(
                BackendId::Noop,
                || true,
                || Arc::new(NoopBackend::new("en")),
            )],
            "en",
        );
        Recognizer::new(Arc::new(selector))
    }

    fn img() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(60, 20))
    }

    #[test]
    fn recognize_on_noop_returns_empty_never_errors() {
        let recognizer = noop_recognizer();
        assert_eq!(recognizer.recognize(&img(), "en", None), "");
        assert_eq!(recognizer.recognize(&img(), "??", Some("0123456789")), "");
        assert_eq!(recognizer.recognize_single_line(&img()), "");
    }

    #[test]
    fn batch_through_facade_is_one_to_one() {
        let recognizer = noop_recognizer();
        let images = vec![img(), img(), img(), img()];
        let results = recognizer.recognize_batch(&images);
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(String::is_empty));
    }

    #[test]
    fn atomic_through_facade_restores_whitelist() {
        let recognizer = noop_recognizer();
        recognizer.set_whitelist(Some("ABC"));
        let _ = recognizer.recognize_atomic(&[img()], Some("012"));
        assert_eq!(
            recognizer.selector.select().whitelist(),
            Some("ABC".to_string())
        );
    }

    #[test]
    fn set_whitelist_none_clears() {
        let recognizer = noop_recognizer();
        recognizer.set_whitelist(Some("ABC"));
        recognizer.set_whitelist(None);
        assert!(recognizer.selector.select().whitelist().is_none());
    }

    #[test]
    fn duration_on_noop_is_zero() {
        let recognizer = noop_recognizer();
        assert_eq!(recognizer.recognize_duration(&img()).num_seconds(), 0);
    }
}
