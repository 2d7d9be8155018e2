//! 템플릿 매치 이벤트 모델.
//!
//! 외부 템플릿 매처가 스크린 영역과 참조 템플릿을 비교할 때마다 하나씩
//! 생성한다. 소유권은 디스패처로 이동하며 이미지는 이후 변경되지 않는다.

use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// 전통(상관계수) 시스템의 매치 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// 매치 판정
    pub matched: bool,
    /// 유사도 점수 (0.0 ~ 1.0)
    pub similarity: f64,
    /// 매칭 방식 태그 (예: "match", "match_binary")
    pub method: String,
}

/// 템플릿 비교 1회의 결과 이벤트
#[derive(Debug, Clone)]
pub struct MatchEvent {
    /// 전체 스크린샷 (또는 검사 영역)
    pub screen: DynamicImage,
    /// 참조 템플릿 이미지
    pub template: DynamicImage,
    /// 템플릿 식별자 (예: "STAGE_3_4")
    pub template_id: String,
    /// 전통 시스템 결과
    pub outcome: MatchOutcome,
    /// 비교 시각
    pub timestamp: DateTime<Utc>,
}

impl MatchEvent {
    /// 새 매치 이벤트 생성 (시각은 호출 시점)
    pub fn new(
        screen: DynamicImage,
        template: DynamicImage,
        template_id: impl Into<String>,
        outcome: MatchOutcome,
    ) -> Self {
        Self {
            screen,
            template,
            template_id: template_id.into(),
            outcome,
            timestamp: Utc::now(),
        }
    }
}
