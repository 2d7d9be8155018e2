//! # glance-core
//!
//! GLANCE 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 인식 크레이트와 섀도 평가 크레이트가 공유하는 핵심 타입을 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (serde Serialize/Deserialize)
//! - [`ports`] — Hexagonal Architecture 포트 인터페이스
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 해석 완료된 설정 구조체 (로딩은 외부 협력자 담당)

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
