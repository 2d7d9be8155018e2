//! 인식 요청 모델.

use image::DynamicImage;

/// 인식 결과 해석 힌트 — 백엔드가 전처리/후처리를 조정할 때 참고
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognitionHint {
    /// `HH:MM:SS` 형태의 소요 시간
    Duration,
    /// 순수 숫자
    Numeric,
}

/// 단일 인식 요청. 생성 후 불변.
///
/// 이미지는 호출자 소유를 빌린다 — 자동화 루프가 같은 스크린샷을
/// 여러 영역 인식에 재사용하기 때문이다.
#[derive(Debug, Clone, Copy)]
pub struct RecognitionRequest<'a> {
    /// 인식 대상 이미지 (영역 crop 완료 상태)
    pub image: &'a DynamicImage,
    /// 언어 코드 (예: "en", "jp") — 백엔드가 고정 테이블로 엔진 코드에 매핑
    pub language: &'a str,
    /// 문자 화이트리스트 — 엔진 수준 제약으로 적용 (후처리 필터가 아님)
    pub whitelist: Option<&'a str>,
    /// 단일 행 모드 요청 여부
    pub single_line: bool,
    /// 해석 힌트
    pub hint: Option<RecognitionHint>,
}

impl<'a> RecognitionRequest<'a> {
    /// 기본 요청 생성 (다중 행, 화이트리스트 없음)
    pub fn new(image: &'a DynamicImage, language: &'a str) -> Self {
        Self {
            image,
            language,
            whitelist: None,
            single_line: false,
            hint: None,
        }
    }

    /// 화이트리스트 지정
    pub fn with_whitelist(mut self, whitelist: Option<&'a str>) -> Self {
        self.whitelist = whitelist;
        self
    }

    /// 단일 행 모드 지정
    pub fn single_line(mut self) -> Self {
        self.single_line = true;
        self
    }

    /// 해석 힌트 지정
    pub fn with_hint(mut self, hint: RecognitionHint) -> Self {
        self.hint = Some(hint);
        self
    }
}
