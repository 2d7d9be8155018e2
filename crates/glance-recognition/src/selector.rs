//! 백엔드 셀렉터 — 우선순위 probe + 프로세스 수명 캐시.
//!
//! probe는 비쌀 수 있다 (프로세스 스폰, 라이브러리 초기화) — 첫
//! `select()` 호출에서 우선순위대로 1회씩만 수행하고 결과를 고정한다.
//! 재-probe는 지원하지 않는다: 환경이 바뀌면 프로세스를 재시작한다.
//!
//! 모듈 전역 싱글턴이 아니라 명시적 객체다 — 테스트는 가짜 descriptor로
//! 셀렉터를 조립해 주입한다.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use tracing::{debug, info, warn};

use glance_core::config::{BackendId, RecognitionConfig};
use glance_core::ports::recognition_backend::RecognitionBackend;

use crate::noop::NoopBackend;
use crate::tesseract_cli::TesseractCliBackend;

/// 후보 백엔드 서술자 — 식별자 + 가용성 probe + 생성 thunk
pub struct BackendDescriptor {
    /// 백엔드 식별자
    pub id: BackendId,
    /// 가용성 probe. 부수효과 없이 설치 여부만 판단해야 한다.
    pub probe: Box<dyn Fn() -> bool + Send + Sync>,
    /// 선택 시 1회 호출되는 생성 thunk
    pub build: Box<dyn Fn() -> Arc<dyn RecognitionBackend> + Send + Sync>,
}

impl BackendDescriptor {
    /// descriptor 생성 헬퍼
    pub fn new(
        id: BackendId,
        probe: impl Fn() -> bool + Send + Sync + 'static,
        build: impl Fn() -> Arc<dyn RecognitionBackend> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            probe: Box::new(probe),
            build: Box::new(build),
        }
    }
}

/// 백엔드 셀렉터
///
/// `select()`는 게으르고, 멱등이며, 스레드 안전하고, 실패하지 않는다 —
/// 아무 probe도 성공하지 못하면 no-op 백엔드가 선택된다.
pub struct BackendSelector {
    descriptors: Vec<BackendDescriptor>,
    fallback_language: String,
    selected: OnceLock<Arc<dyn RecognitionBackend>>,
}

impl BackendSelector {
    /// 임의 descriptor 목록으로 셀렉터 생성 (테스트 주입 지점)
    pub fn new(descriptors: Vec<BackendDescriptor>, fallback_language: impl Into<String>) -> Self {
        Self {
            descriptors,
            fallback_language: fallback_language.into(),
            selected: OnceLock::new(),
        }
    }

    /// 설정의 우선순위 목록으로 프로덕션 셀렉터 생성
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new(
            default_descriptors(config),
            config.language.clone(),
        )
    }

    /// 선택된 백엔드 반환. 첫 호출에서 probe, 이후에는 캐시.
    pub fn select(&self) -> Arc<dyn RecognitionBackend> {
        self.selected.get_or_init(|| self.probe_in_order()).clone()
    }

    /// 이미 선택이 일어났는지 (진단용)
    pub fn is_selected(&self) -> bool {
        self.selected.get().is_some()
    }

    fn probe_in_order(&self) -> Arc<dyn RecognitionBackend> {
        for descriptor in &self.descriptors {
            // probe/생성의 패닉은 "사용 불가"로 취급하고 다음 후보로 넘어간다
            let available =
                catch_unwind(AssertUnwindSafe(|| (descriptor.probe)())).unwrap_or(false);
            if !available {
                debug!(backend = descriptor.id.as_str(), "백엔드 사용 불가");
                continue;
            }
            match catch_unwind(AssertUnwindSafe(|| (descriptor.build)())) {
                Ok(backend) => {
                    info!(backend = descriptor.id.as_str(), "인식 백엔드 선택");
                    return backend;
                }
                Err(_) => {
                    warn!(
                        backend = descriptor.id.as_str(),
                        "probe는 성공했으나 생성 중 패닉 — 다음 후보로"
                    );
                }
            }
        }

        warn!("사용 가능한 인식 백엔드 없음 — no-op으로 강등 (인식 결과는 항상 빈 문자열)");
        Arc::new(NoopBackend::new(self.fallback_language.clone()))
    }
}

/// 설정된 우선순위로 프로덕션 descriptor 목록 구성.
/// 목록에 noop이 없어도 `select()`의 최종 폴백이 항상 존재한다.
pub fn default_descriptors(config: &RecognitionConfig) -> Vec<BackendDescriptor> {
    let mut descriptors = Vec::new();
    for id in &config.backend_priority {
        match id {
            BackendId::Tesseract => {
                #[cfg(feature = "ocr")]
                {
                    let language = config.language.clone();
                    descriptors.push(BackendDescriptor::new(
                        BackendId::Tesseract,
                        crate::tesseract::TesseractBackend::available,
                        move || {
                            Arc::new(crate::tesseract::TesseractBackend::new(language.clone()))
                        },
                    ));
                }
                #[cfg(not(feature = "ocr"))]
                {
                    debug!("ocr feature 미컴파일 — tesseract 백엔드 후보에서 제외");
                }
            }
            BackendId::TesseractCli => {
                let language = config.language.clone();
                descriptors.push(BackendDescriptor::new(
                    BackendId::TesseractCli,
                    TesseractCliBackend::available,
                    move || Arc::new(TesseractCliBackend::new(language.clone())),
                ));
            }
            BackendId::Noop => {
                let language = config.language.clone();
                descriptors.push(BackendDescriptor::new(
                    BackendId::Noop,
                    || true,
                    move || Arc::new(NoopBackend::new(language.clone())),
                ));
            }
        }
    }
    descriptors
}
