//! 외부 비전 모델 판정 모델.
//!
//! 섀도 비전 클라이언트는 모든 호출에 대해 반드시 판정을 생성한다 —
//! 실패도 `Failure` variant로 표현되며 조용히 버려지지 않는다.

use serde::{Deserialize, Serialize};

/// 비전 호출 실패 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisionErrorKind {
    /// 하드 타임아웃 초과
    Timeout,
    /// 네트워크/전송 실패 (연결 거부, 5xx 등)
    Transport,
    /// 응답 파싱 실패 (JSON도 키워드 폴백도 실패)
    ParseError,
    /// 자격증명 문제 (키 미설정, 401/403)
    Credential,
    /// 클라이언트 내부 결함 (패닉 격리 경계)
    Internal,
}

/// 외부 비전 모델의 구조화된 판정
///
/// JSON 직렬화 시 태그 없이 펼쳐진다 — 비교 로그의 `llm_system` 필드가
/// `{found, bounding_box, confidence, model}` 또는 `{error, model, message}`
/// 중 하나가 된다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VisionJudgment {
    /// 정상 판정
    Success {
        /// 템플릿 발견 여부
        found: bool,
        /// 발견 위치 `[x1, y1, x2, y2]`
        bounding_box: Option<[i32; 4]>,
        /// 신뢰도 (0.0 ~ 1.0)
        confidence: f64,
        /// 판정에 사용된 모델 식별자
        model: String,
        /// 키워드 폴백 파싱 경로로 얻은 판정 여부
        #[serde(default, skip_serializing_if = "is_false")]
        low_confidence: bool,
    },
    /// 실패 — 레코드에 남기기 위한 유형화된 변형
    Failure {
        /// 실패 분류
        error: VisionErrorKind,
        /// 호출 대상이던 모델 식별자
        model: String,
        /// 진단용 상세 메시지
        message: String,
    },
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl VisionJudgment {
    /// 실패 판정 생성 헬퍼
    pub fn failure(
        error: VisionErrorKind,
        model: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        VisionJudgment::Failure {
            error,
            model: model.into(),
            message: message.into(),
        }
    }

    /// 실패 변형 여부
    pub fn is_failure(&self) -> bool {
        matches!(self, VisionJudgment::Failure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_flat() {
        let j = VisionJudgment::Success {
            found: true,
            bounding_box: Some([100, 150, 240, 320]),
            confidence: 0.95,
            model: "gemini-2.5-flash".to_string(),
            low_confidence: false,
        };
        let json = serde_json::to_value(&j).unwrap();
        assert_eq!(json["found"], true);
        assert_eq!(json["bounding_box"][2], 240);
        assert!(json.get("low_confidence").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn low_confidence_flag_survives_when_set() {
        let j = VisionJudgment::Success {
            found: false,
            bounding_box: None,
            confidence: 0.3,
            model: "llava-phi3".to_string(),
            low_confidence: true,
        };
        let json = serde_json::to_value(&j).unwrap();
        assert_eq!(json["low_confidence"], true);
    }

    #[test]
    fn failure_serializes_error_kind_screaming() {
        let j = VisionJudgment::failure(VisionErrorKind::Timeout, "llava-phi3", "10초 초과");
        let json = serde_json::to_value(&j).unwrap();
        assert_eq!(json["error"], "TIMEOUT");
        assert_eq!(json["model"], "llava-phi3");

        let j = VisionJudgment::failure(VisionErrorKind::ParseError, "m", "");
        let json = serde_json::to_value(&j).unwrap();
        assert_eq!(json["error"], "PARSE_ERROR");
    }

    #[test]
    fn untagged_deserialize_picks_correct_variant() {
        let j: VisionJudgment = serde_json::from_str(
            r#"{"found": true, "bounding_box": null, "confidence": 0.8, "model": "m"}"#,
        )
        .unwrap();
        assert!(!j.is_failure());

        let j: VisionJudgment =
            serde_json::from_str(r#"{"error": "TRANSPORT", "model": "m", "message": "거부"}"#)
                .unwrap();
        assert!(j.is_failure());
    }
}
