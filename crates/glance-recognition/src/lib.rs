//! # glance-recognition
//!
//! 다중 백엔드 텍스트 인식 계층.
//!
//! 자동화 모듈은 [`facade::Recognizer`] 하나만 바라본다. 뒤에서는
//! [`selector::BackendSelector`]가 설치된 엔진을 우선순위대로 probe하여
//! 프로세스 수명 동안 하나를 고정 선택한다. 아무것도 설치되어 있지
//! 않으면 no-op 백엔드로 우아하게 강등된다 — 선택은 실패할 수 없다.
//!
//! ## 백엔드
//!
//! - [`tesseract`] — leptess 바인딩 (`ocr` feature)
//! - [`tesseract_cli`] — PATH의 tesseract 실행 파일
//! - [`noop`] — 항상 빈 문자열, 의존성 0

pub mod duration;
pub mod facade;
pub mod noop;
pub mod preprocess;
pub mod selector;
#[cfg(feature = "ocr")]
pub mod tesseract;
pub mod tesseract_cli;

mod lang;

pub use facade::Recognizer;
pub use selector::{BackendDescriptor, BackendSelector};
