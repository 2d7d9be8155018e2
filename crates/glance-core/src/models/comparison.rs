//! 비교 레코드 모델.
//!
//! 디스패치된 평가 1건당 정확히 하나 생성되어 싱크에 1회 기록된다.
//! 기록 후 갱신/삭제 없음.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::judgment::VisionJudgment;
use super::match_event::{MatchEvent, MatchOutcome};

/// 전통 시스템 결과와 비전 모델 판정을 나란히 담는 로그 레코드
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// 유닉스 초 (소수부 포함)
    pub timestamp: f64,
    /// 템플릿 식별자
    pub template_id: String,
    /// 전통 시스템 결과
    pub traditional_system: MatchOutcome,
    /// 비전 모델 판정 (성공 또는 실패 변형)
    pub llm_system: VisionJudgment,
}

impl ComparisonRecord {
    /// 매치 이벤트 + 판정으로부터 레코드 생성. 시각은 생성 시점.
    pub fn from_event(event: &MatchEvent, judgment: VisionJudgment) -> Self {
        Self {
            timestamp: unix_seconds(Utc::now()),
            template_id: event.template_id.clone(),
            traditional_system: event.outcome.clone(),
            llm_system: judgment,
        }
    }
}

/// `DateTime<Utc>` → 유닉스 초 (마이크로초 정밀도)
fn unix_seconds(t: DateTime<Utc>) -> f64 {
    t.timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::judgment::VisionErrorKind;
    use image::{DynamicImage, RgbaImage};

    fn make_event(matched: bool) -> MatchEvent {
        MatchEvent::new(
            DynamicImage::ImageRgba8(RgbaImage::new(8, 8)),
            DynamicImage::ImageRgba8(RgbaImage::new(4, 4)),
            "STAGE_3_4",
            MatchOutcome {
                matched,
                similarity: 0.91,
                method: "match".to_string(),
            },
        )
    }

    #[test]
    fn record_from_event_copies_outcome() {
        let event = make_event(true);
        let record = ComparisonRecord::from_event(
            &event,
            VisionJudgment::failure(VisionErrorKind::Timeout, "llava-phi3", "타임아웃"),
        );
        assert_eq!(record.template_id, "STAGE_3_4");
        assert!(record.traditional_system.matched);
        assert!((record.traditional_system.similarity - 0.91).abs() < f64::EPSILON);
        assert!(record.timestamp > 1_600_000_000.0);
    }

    #[test]
    fn record_json_shape_matches_log_contract() {
        let event = make_event(true);
        let record = ComparisonRecord::from_event(
            &event,
            VisionJudgment::failure(VisionErrorKind::Timeout, "llava-phi3", "10초 초과"),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["traditional_system"]["matched"], true);
        assert_eq!(json["traditional_system"]["similarity"], 0.91);
        assert_eq!(json["traditional_system"]["method"], "match");
        assert_eq!(json["llm_system"]["error"], "TIMEOUT");
    }

    #[test]
    fn unix_seconds_precision() {
        let t = DateTime::from_timestamp(1_724_390_000, 250_000_000).unwrap();
        let secs = unix_seconds(t);
        assert!((secs - 1_724_390_000.25).abs() < 1e-6);
    }
}
