//! 외부 비전 모델 클라이언트.
//!
//! 스크린샷과 템플릿 이미지를 외부 멀티모달 모델에 제출하고 "템플릿이
//! 보이는가"에 대한 구조화된 판정을 받는다.
//!
//! 이 경계는 절대 에러를 던지지 않는다 — 타임아웃, 전송 실패, 자격증명
//! 문제, 파싱 실패 전부 `VisionJudgment::Failure`로 변환되어 비교
//! 레코드에 남는다.

use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as B64, Engine};
use image::{DynamicImage, ImageFormat};
use serde::Deserialize;
use tracing::{debug, warn};

use glance_core::config::{VisionApiConfig, VisionProviderType};
use glance_core::error::CoreError;
use glance_core::models::judgment::{VisionErrorKind, VisionJudgment};
use glance_core::ports::vision_judge::VisionJudge;

// ============================================================
// 키워드 폴백 규칙
// ============================================================

/// 부정 키워드 — 긍정보다 먼저 검사한다 ("not found"가 "found"를 포함)
const NEGATIVE_KEYWORDS: &[&str] = &[
    "not found",
    "not visible",
    "not present",
    "cannot find",
    "does not appear",
    "no match",
];

/// 긍정 키워드
const POSITIVE_KEYWORDS: &[&str] = &["found", "visible", "present", "match"];

/// 키워드 폴백 경로의 고정 신뢰도
const FALLBACK_CONFIDENCE: f64 = 0.3;

// ============================================================
// RemoteVisionJudge — 외부 비전 모델 API 클라이언트
// ============================================================

/// 외부 비전 모델 클라이언트
///
/// 지원 API:
/// - Anthropic: `POST /v1/messages` + base64 image content block
/// - OpenAI 호환: `POST /v1/chat/completions` + data URL image
/// - 범용 (로컬 Ollama 등): OpenAI 형식 + 느슨한 응답 파싱
#[derive(Debug)]
pub struct RemoteVisionJudge {
    /// HTTP 클라이언트
    http_client: reqwest::Client,
    /// API 엔드포인트 URL
    endpoint: String,
    /// API 키 (메모리에만 유지)
    api_key: String,
    /// 모델 이름
    model: String,
    /// 제공자 타입 — 요청/응답 형식 결정
    provider_type: VisionProviderType,
    /// 하드 타임아웃
    timeout: Duration,
    /// 전송 전 이미지 긴 변 상한 (API 비용 절감)
    max_image_edge: u32,
}

impl RemoteVisionJudge {
    /// 새 클라이언트 생성
    pub fn new(config: &VisionApiConfig) -> Result<Self, CoreError> {
        if config.endpoint.is_empty() {
            return Err(CoreError::Config(
                "비전 모델 엔드포인트 미설정".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::Network(format!("HTTP 클라이언트 생성 실패: {e}")))?;

        let model = config
            .model
            .clone()
            .unwrap_or_else(|| default_model(config.provider_type).to_string());

        debug!(
            endpoint = %config.endpoint,
            model = %model,
            timeout = config.timeout_secs,
            "RemoteVisionJudge 초기화"
        );

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model,
            provider_type: config.provider_type,
            timeout: Duration::from_secs(config.timeout_secs),
            max_image_edge: config.max_image_edge,
        })
    }

    /// 실제 호출 경로. 실패는 `Failure` 판정으로 변환되어 돌아온다.
    async fn call_model(
        &self,
        screen: &DynamicImage,
        template: &DynamicImage,
        template_id: &str,
    ) -> Result<String, VisionJudgment> {
        // 유료 제공자는 자격증명 없이는 호출 자체가 무의미하다
        if self.api_key.is_empty() && self.provider_type != VisionProviderType::Generic {
            return Err(self.failure(VisionErrorKind::Credential, "API 키 미설정"));
        }

        let screen_b64 = self.encode_for_transport(screen)?;
        let template_b64 = self.encode_for_transport(template)?;
        let request_body = self.build_request_body(&screen_b64, &template_b64, template_id);

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            template_id = template_id,
            "섀도 비전 호출"
        );

        let mut builder = self
            .http_client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&request_body);

        builder = match self.provider_type {
            VisionProviderType::Anthropic => builder
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01"),
            VisionProviderType::OpenAi => {
                builder.header("Authorization", format!("Bearer {}", self.api_key))
            }
            VisionProviderType::Generic => {
                if self.api_key.is_empty() {
                    builder
                } else {
                    builder.header("Authorization", format!("Bearer {}", self.api_key))
                }
            }
        };

        // 하드 타임아웃 — 평가 태스크 수명의 유일한 상한
        let response = match tokio::time::timeout(self.timeout, builder.send()).await {
            Err(_) => {
                return Err(self.failure(
                    VisionErrorKind::Timeout,
                    format!("{}초 초과", self.timeout.as_secs()),
                ))
            }
            Ok(Err(e)) if e.is_timeout() => {
                return Err(self.failure(VisionErrorKind::Timeout, e.to_string()))
            }
            Ok(Err(e)) => return Err(self.failure(VisionErrorKind::Transport, e.to_string())),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        let body = match tokio::time::timeout(self.timeout, response.text()).await {
            Err(_) => {
                return Err(self.failure(VisionErrorKind::Timeout, "응답 본문 수신 중 타임아웃"))
            }
            Ok(Err(e)) => return Err(self.failure(VisionErrorKind::Transport, e.to_string())),
            Ok(Ok(body)) => body,
        };

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(self.failure(
                VisionErrorKind::Credential,
                format!("인증 거부 ({status})"),
            ));
        }
        if !status.is_success() {
            warn!(status = %status, "비전 API 오류 응답");
            return Err(self.failure(
                VisionErrorKind::Transport,
                format!(
                    "API 오류 ({}): {}",
                    status,
                    body.chars().take(200).collect::<String>()
                ),
            ));
        }

        Ok(body)
    }

    /// 전송용 축소 + PNG 인코딩 + base64
    fn encode_for_transport(&self, image: &DynamicImage) -> Result<String, VisionJudgment> {
        let scaled = downscale_for_transport(image, self.max_image_edge);
        let mut png = Vec::new();
        scaled
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| {
                self.failure(VisionErrorKind::Internal, format!("이미지 인코딩 실패: {e}"))
            })?;
        Ok(B64.encode(&png))
    }

    /// 제공자 형식에 맞춘 요청 본문
    fn build_request_body(
        &self,
        screen_b64: &str,
        template_b64: &str,
        template_id: &str,
    ) -> serde_json::Value {
        let prompt = build_prompt(template_id);
        match self.provider_type {
            VisionProviderType::Anthropic => serde_json::json!({
                "model": self.model,
                "max_tokens": 512,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": screen_b64}},
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": template_b64}},
                        {"type": "text", "text": prompt}
                    ]
                }]
            }),
            VisionProviderType::OpenAi | VisionProviderType::Generic => serde_json::json!({
                "model": self.model,
                "max_tokens": 512,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": prompt},
                        {"type": "image_url", "image_url": {"url": format!("data:image/png;base64,{screen_b64}")}},
                        {"type": "image_url", "image_url": {"url": format!("data:image/png;base64,{template_b64}")}}
                    ]
                }]
            }),
        }
    }

    fn failure(&self, kind: VisionErrorKind, message: impl Into<String>) -> VisionJudgment {
        VisionJudgment::failure(kind, self.model.clone(), message)
    }
}

#[async_trait]
impl VisionJudge for RemoteVisionJudge {
    async fn judge(
        &self,
        screen: &DynamicImage,
        template: &DynamicImage,
        template_id: &str,
    ) -> VisionJudgment {
        let body = match self.call_model(screen, template, template_id).await {
            Ok(body) => body,
            Err(failure) => return failure,
        };
        let text = extract_text(&body, self.provider_type);
        parse_judgment(&text, &self.model)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// 제공자별 기본 모델
fn default_model(provider: VisionProviderType) -> &'static str {
    match provider {
        VisionProviderType::Anthropic => "claude-sonnet-4-5-20250929",
        VisionProviderType::OpenAi => "gpt-4o-mini",
        VisionProviderType::Generic => "llava-phi3",
    }
}

/// 템플릿 매칭 프롬프트 — 모델에게 JSON 응답을 요구한다
fn build_prompt(template_id: &str) -> String {
    format!(
        "You are analyzing a screenshot from a mobile game to find a specific UI element.\n\
         \n\
         TASK: Determine if the template image (second image) appears in the screenshot (first image).\n\
         \n\
         Template name: {template_id}\n\
         \n\
         Respond with JSON only:\n\
         {{\"found\": boolean, \"bounding_box\": [x1, y1, x2, y2], \"confidence\": float, \"explanation\": \"string\"}}"
    )
}

/// 긴 변이 `max_edge`를 넘으면 비율 유지 축소
fn downscale_for_transport(image: &DynamicImage, max_edge: u32) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    if max_edge == 0 || w.max(h) <= max_edge {
        return image.clone();
    }
    image.thumbnail(max_edge, max_edge)
}

/// 응답 본문에서 모델 출력 텍스트 추출.
/// 제공자 형식이 깨져 있으면 본문 전체를 텍스트로 취급한다 — 다음 단계의
/// 키워드 폴백이 처리할 기회를 준다.
fn extract_text(body: &str, provider: VisionProviderType) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };

    let extracted = match provider {
        VisionProviderType::Anthropic => value
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.iter().find_map(|b| b.get("text")?.as_str())),
        VisionProviderType::OpenAi | VisionProviderType::Generic => value
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message")?.get("content")?.as_str())
            // Ollama generate 형식
            .or_else(|| value.get("response").and_then(|r| r.as_str())),
    };

    extracted.map(String::from).unwrap_or_else(|| body.to_string())
}

/// 모델 출력 파싱 — 1차 JSON, 2차 키워드 폴백, 둘 다 실패면 PARSE_ERROR
fn parse_judgment(text: &str, model: &str) -> VisionJudgment {
    #[derive(Deserialize)]
    struct VerdictPayload {
        found: bool,
        #[serde(default)]
        bounding_box: Option<Vec<f64>>,
        #[serde(default)]
        confidence: Option<f64>,
    }

    // 마크다운 코드 블록 대응 — 가장 바깥 중괄호만 잘라낸다
    if let Some(json_str) = extract_json_block(text) {
        if let Ok(payload) = serde_json::from_str::<VerdictPayload>(json_str) {
            let bounding_box = payload.bounding_box.and_then(|b| {
                (b.len() == 4).then(|| [b[0] as i32, b[1] as i32, b[2] as i32, b[3] as i32])
            });
            return VisionJudgment::Success {
                found: payload.found,
                bounding_box,
                confidence: payload.confidence.unwrap_or(0.5),
                model: model.to_string(),
                low_confidence: false,
            };
        }
    }

    // 2차 — 명명된 키워드 규칙
    if let Some(found) = keyword_fallback(text) {
        return VisionJudgment::Success {
            found,
            bounding_box: None,
            confidence: FALLBACK_CONFIDENCE,
            model: model.to_string(),
            low_confidence: true,
        };
    }

    VisionJudgment::failure(
        VisionErrorKind::ParseError,
        model,
        format!(
            "파싱 불가 응답: {}",
            text.chars().take(120).collect::<String>()
        ),
    )
}

/// 가장 바깥 `{..}` 블록 추출
fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// 키워드 휴리스틱 — 부정 먼저, 그다음 긍정. 둘 다 없으면 None.
fn keyword_fallback(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    if NEGATIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(false);
    }
    if POSITIVE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(true);
    }
    None
}

// ============================================================
// 테스트
// ============================================================
