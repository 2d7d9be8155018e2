//! Tesseract 라이브러리 백엔드 — `leptess` 바인딩.
//!
//! `ocr` feature 활성화 시에만 빌드된다. 엔진 인스턴스는 호출마다
//! 생성한다 (LepTess는 Send가 아니고, 화이트리스트/PSM이 호출마다
//! 달라지므로 재사용 이득이 없다).
//!
//! 모든 내부 실패는 빈 문자열로 흡수된다 — 자동화 루프에 에러를
//! 전파하지 않는 것이 인식 경계의 계약이다.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use parking_lot::Mutex;
use tracing::{debug, warn};

use glance_core::config::BackendId;
use glance_core::error::CoreError;
use glance_core::models::recognition::RecognitionRequest;
use glance_core::ports::recognition_backend::RecognitionBackend;

use crate::lang::to_tesseract_lang;
use crate::preprocess;

/// leptess 기반 풀 OCR 백엔드
pub struct TesseractBackend {
    language: String,
    whitelist: Mutex<Option<String>>,
}

impl TesseractBackend {
    /// 새 백엔드 생성. `language`는 클라이언트 언어 코드 (고정 테이블로 매핑).
    pub fn new(language: impl Into<String>) -> Self {
        let language = language.into();
        debug!(
            language = %language,
            engine_lang = to_tesseract_lang(&language),
            "TesseractBackend 초기화"
        );
        Self {
            language,
            whitelist: Mutex::new(None),
        }
    }

    /// tessdata가 로드 가능한지 probe. 엔진 생성이 성공하면 사용 가능.
    pub fn available() -> bool {
        leptess::LepTess::new(None, "eng").is_ok()
    }

    /// 실제 인식 경로. 실패는 호출 측 `recognize`에서 흡수된다.
    fn try_recognize(&self, request: &RecognitionRequest<'_>) -> Result<String, CoreError> {
        if request.image.width() == 0 || request.image.height() == 0 {
            return Ok(String::new());
        }

        let processed = preprocess::prepare(request.image);

        // leptess는 인코딩된 이미지 바이트를 받는다 (pixReadMem)
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(processed)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| CoreError::Recognition(format!("전처리 이미지 인코딩 실패: {e}")))?;

        let mut lt = leptess::LepTess::new(None, to_tesseract_lang(&self.language))
            .map_err(|e| CoreError::Recognition(format!("엔진 초기화 실패: {e}")))?;

        lt.set_image_from_mem(&png)
            .map_err(|e| CoreError::Recognition(format!("이미지 설정 실패: {e}")))?;

        if request.single_line {
            // PSM 7 — 이미지를 단일 텍스트 행으로 취급
            lt.set_variable(leptess::Variable::TesseditPagesegMode, "7")
                .map_err(|e| CoreError::Recognition(format!("PSM 설정 실패: {e}")))?;
        }

        // 화이트리스트는 엔진 수준 제약 — 후처리 필터가 아니다
        let whitelist = request
            .whitelist
            .map(String::from)
            .or_else(|| self.whitelist.lock().clone());
        if let Some(wl) = whitelist {
            lt.set_variable(leptess::Variable::TesseditCharWhitelist, &wl)
                .map_err(|e| CoreError::Recognition(format!("화이트리스트 설정 실패: {e}")))?;
        }

        let text = lt
            .get_utf8_text()
            .map_err(|e| CoreError::Recognition(format!("텍스트 추출 실패: {e}")))?;

        Ok(clean_output(&text))
    }
}

/// 엔진 출력 정리 — 트림, 개행을 공백으로, form feed 제거
fn clean_output(text: &str) -> String {
    text.trim().replace('\n', " ").replace('\u{c}', "")
}

impl RecognitionBackend for TesseractBackend {
    fn id(&self) -> BackendId {
        BackendId::Tesseract
    }

    fn default_language(&self) -> &str {
        &self.language
    }

    fn set_whitelist(&self, whitelist: Option<&str>) {
        *self.whitelist.lock() = whitelist.map(String::from);
    }

    fn whitelist(&self) -> Option<String> {
        self.whitelist.lock().clone()
    }

    fn recognize(&self, request: &RecognitionRequest<'_>) -> String {
        match self.try_recognize(request) {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Tesseract 인식 실패 — 빈 결과로 강등");
                String::new()
            }
        }
    }
}
