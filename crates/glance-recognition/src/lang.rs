//! 언어 코드 → Tesseract 언어 코드 고정 매핑.

/// 클라이언트 언어 코드를 Tesseract 언어 코드로 변환.
/// 모르는 코드는 영어로 폴백한다.
pub(crate) fn to_tesseract_lang(code: &str) -> &'static str {
    match code {
        "en" => "eng",
        "jp" => "jpn+eng",
        "cn" => "chi_sim+eng",
        "tw" => "chi_tra+eng",
        _ => "eng",
    }
}
