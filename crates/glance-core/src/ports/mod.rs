//! Hexagonal Architecture 포트 인터페이스.
//!
//! - [`recognition_backend`] — 텍스트 인식 엔진 계약 (동기)
//! - [`vision_judge`] — 외부 비전 모델 계약 (비동기, 무실패 시그니처)
//! - [`record_sink`] — 비교 레코드 append 전용 싱크

pub mod record_sink;
pub mod recognition_backend;
pub mod vision_judge;

pub use record_sink::RecordSink;
pub use recognition_backend::RecognitionBackend;
pub use vision_judge::VisionJudge;
