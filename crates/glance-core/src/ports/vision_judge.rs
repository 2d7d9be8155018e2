//! 외부 비전 모델 포트.
//!
//! 시그니처에 실패가 없다 — 타임아웃, 전송 오류, 파싱 실패 전부
//! `VisionJudgment::Failure`로 표현된다. 이 경계 밖으로 에러가 나가면
//! 구현 결함이다.

use async_trait::async_trait;
use image::DynamicImage;

use crate::models::judgment::VisionJudgment;

/// 외부 비전 모델에게 "템플릿이 스크린에 보이는가"를 묻는 계약
///
/// 구현체: `RemoteVisionJudge` (Anthropic/OpenAI 호환/범용 엔드포인트)
#[async_trait]
pub trait VisionJudge: Send + Sync {
    /// 스크린과 템플릿을 제출하고 구조화된 판정을 받는다.
    ///
    /// 디스패처 관점에서는 동기적 1회 호출이다. 비동기성은 디스패처가
    /// 워커 태스크로 만들어낸다.
    async fn judge(
        &self,
        screen: &DynamicImage,
        template: &DynamicImage,
        template_id: &str,
    ) -> VisionJudgment;

    /// 판정에 사용하는 모델 식별자 (레코드에 기록)
    fn model_id(&self) -> &str;
}
