//! 도메인 데이터 구조체.

pub mod comparison;
pub mod judgment;
pub mod match_event;
pub mod recognition;

pub use comparison::ComparisonRecord;
pub use judgment::{VisionErrorKind, VisionJudgment};
pub use match_event::{MatchEvent, MatchOutcome};
pub use recognition::{RecognitionHint, RecognitionRequest};
