//! 텍스트 인식 백엔드 포트.
//!
//! 자동화 루프는 단일 스레드 동기 구조이므로 인식 계약도 동기다 —
//! 호출자는 텍스트가 나올 때까지 의도적으로 블록된다.
//! `recognize`는 절대 실패하지 않는다: 엔진 내부 오류는 구현체가 흡수하고
//! 빈 문자열을 반환한다 ("텍스트 없음"과 구분되지 않는 수용된 트레이드오프).

use image::DynamicImage;

use crate::config::BackendId;
use crate::models::recognition::RecognitionRequest;

/// 텍스트 인식 엔진 계약
///
/// 구현체: `TesseractBackend` (leptess), `TesseractCliBackend` (실행 파일),
/// `NoopBackend` (최후 폴백)
pub trait RecognitionBackend: Send + Sync {
    /// 백엔드 식별자
    fn id(&self) -> BackendId;

    /// 구성된 기본 언어 코드 — 배치 계열 호출이 사용
    fn default_language(&self) -> &str;

    /// 지속 화이트리스트 설정. `None`은 제약 해제.
    fn set_whitelist(&self, whitelist: Option<&str>);

    /// 현재 지속 화이트리스트
    fn whitelist(&self) -> Option<String>;

    /// 단일 이미지 인식. 항상 문자열을 반환한다 (실패 시 빈 문자열).
    fn recognize(&self, request: &RecognitionRequest<'_>) -> String;

    /// 단일 행 이미지 배치 인식 — 입력과 1:1, 순서 보존
    fn recognize_batch(&self, images: &[DynamicImage]) -> Vec<String> {
        images
            .iter()
            .map(|img| {
                let whitelist = self.whitelist();
                let req = RecognitionRequest::new(img, self.default_language())
                    .with_whitelist(whitelist.as_deref())
                    .single_line();
                self.recognize(&req)
            })
            .collect()
    }

    /// 배치 동안만 화이트리스트를 덮어쓰는 원자적 인식.
    /// 결과는 이미지별 문자 시퀀스. 중간에 어떤 이미지가 실패(패닉 포함)해도
    /// 이전 화이트리스트는 복원된다.
    fn recognize_atomic(
        &self,
        images: &[DynamicImage],
        whitelist: Option<&str>,
    ) -> Vec<Vec<char>> {
        let _guard = match whitelist {
            Some(wl) => {
                let prior = self.whitelist();
                self.set_whitelist(Some(wl));
                Some(WhitelistGuard {
                    backend: self,
                    prior,
                })
            }
            None => None,
        };

        images
            .iter()
            .map(|img| {
                let whitelist = self.whitelist();
                let req = RecognitionRequest::new(img, self.default_language())
                    .with_whitelist(whitelist.as_deref())
                    .single_line();
                self.recognize(&req).chars().collect()
            })
            .collect()
    }
}

/// 드롭 시 이전 화이트리스트를 복원하는 가드
struct WhitelistGuard<'a, B: RecognitionBackend + ?Sized> {
    backend: &'a B,
    prior: Option<String>,
}

impl<B: RecognitionBackend + ?Sized> Drop for WhitelistGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.set_whitelist(self.prior.as_deref());
    }
}
