//! # glance-shadow
//!
//! 병렬 섀도 평가 서브시스템.
//!
//! 템플릿 매처가 양성 매치를 낼 때마다 같은 이미지를 외부 비전 모델에
//! 비동기로 제출하고, 전통 시스템 결과와 모델 판정을 나란히 담은
//! 레코드를 append 전용 JSON Lines 로그에 남긴다.
//!
//! 주 자동화 루프와의 계약: [`dispatcher::ShadowDispatcher::dispatch`]는
//! 절대 블록하지 않고, 절대 에러를 돌려주지 않으며, 평가 결과는 자동화
//! 행동에 영향을 주지 않는다 — 순수 관찰/비교용이다.

pub mod dispatcher;
pub mod log_sink;
pub mod vision_client;

pub use dispatcher::{DispatchStats, ShadowDispatcher};
pub use log_sink::{JsonlSink, MemorySink};
pub use vision_client::RemoteVisionJudge;
