//! Tesseract 실행 파일 백엔드.
//!
//! 라이브러리 바인딩 없이 PATH의 `tesseract` 바이너리를 호출한다.
//! leptess를 빌드할 수 없는 환경(시스템 라이브러리 부재)에서의 중간
//! 폴백. probe는 프로세스 스폰 확인이라 비용이 있으므로 셀렉터가
//! 프로세스당 1회만 수행한다.

use std::io::Write;
use std::process::{Command, Stdio};

use image::DynamicImage;
use parking_lot::Mutex;
use tracing::warn;

use glance_core::config::BackendId;
use glance_core::error::CoreError;
use glance_core::models::recognition::RecognitionRequest;
use glance_core::ports::recognition_backend::RecognitionBackend;

use crate::lang::to_tesseract_lang;
use crate::preprocess;

/// `tesseract` 실행 파일 기반 백엔드
pub struct TesseractCliBackend {
    language: String,
    whitelist: Mutex<Option<String>>,
}

impl TesseractCliBackend {
    /// 새 백엔드 생성
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            whitelist: Mutex::new(None),
        }
    }

    /// `tesseract --version` 스폰 확인
    pub fn available() -> bool {
        Command::new("tesseract")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn try_recognize(&self, request: &RecognitionRequest<'_>) -> Result<String, CoreError> {
        if request.image.width() == 0 || request.image.height() == 0 {
            return Ok(String::new());
        }

        let processed = preprocess::prepare(request.image);

        let mut input = tempfile::Builder::new()
            .prefix("glance-ocr-")
            .suffix(".png")
            .tempfile()?;
        {
            let mut png = Vec::new();
            DynamicImage::ImageLuma8(processed)
                .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
                .map_err(|e| CoreError::Recognition(format!("전처리 이미지 인코딩 실패: {e}")))?;
            input.write_all(&png)?;
            input.flush()?;
        }

        let whitelist = request
            .whitelist
            .map(String::from)
            .or_else(|| self.whitelist.lock().clone());
        let args = build_args(
            &input.path().to_string_lossy(),
            to_tesseract_lang(&self.language),
            request.single_line,
            whitelist.as_deref(),
        );

        let output = Command::new("tesseract")
            .args(&args)
            .stderr(Stdio::null())
            .output()
            .map_err(|e| CoreError::Recognition(format!("tesseract 실행 실패: {e}")))?;

        if !output.status.success() {
            return Err(CoreError::Recognition(format!(
                "tesseract 비정상 종료: {}",
                output.status
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(clean_output(&text))
    }
}

/// CLI 인자 구성 — 단위 테스트 가능하도록 분리
fn build_args(
    input_path: &str,
    engine_lang: &str,
    single_line: bool,
    whitelist: Option<&str>,
) -> Vec<String> {
    let mut args = vec![
        input_path.to_string(),
        "stdout".to_string(),
        "-l".to_string(),
        engine_lang.to_string(),
        "--oem".to_string(),
        "3".to_string(),
    ];
    if single_line {
        args.push("--psm".to_string());
        args.push("7".to_string());
    }
    if let Some(wl) = whitelist {
        // tesseract 설정 파서에서 '-'는 범위로 읽히므로 이스케이프
        let escaped = wl.replace('-', "\\-");
        args.push("-c".to_string());
        args.push(format!("tessedit_char_whitelist={escaped}"));
    }
    args
}

/// 엔진 출력 정리 — 트림, 개행을 공백으로, form feed 제거
fn clean_output(text: &str) -> String {
    text.trim().replace('\n', " ").replace('\u{c}', "")
}

impl RecognitionBackend for TesseractCliBackend {
    fn id(&self) -> BackendId {
        BackendId::TesseractCli
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
                warn!(error = %e, "Tesseract CLI 인식 실패 — 빈 결과로 강등");
                String::new()
            }
        }
    }
}
