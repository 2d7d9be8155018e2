//! 소요 시간(`HH:MM:SS`) 후처리.
//!
//! 게임 UI의 시간 표시는 숫자가 비슷한 글자로 오인되기 쉽다 —
//! 엔진 화이트리스트에 오인 글자를 포함시켜 인식한 뒤 여기서 되돌린다.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// 시간 인식용 화이트리스트 — 숫자/콜론 + 상습 오인 글자
pub const DURATION_WHITELIST: &str = "0123456789:IDSB";

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}):?(\d{2}):?(\d{2})").expect("고정 패턴"));

/// 숫자로 상습 오인되는 글자 교정 (I→1, D→0, S→5, B→8)
pub fn normalize_glyphs(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'I' => '1',
            'D' => '0',
            'S' => '5',
            'B' => '8',
            other => other,
        })
        .collect()
}

/// `01:30:00` 형태 문자열을 Duration으로 파싱.
/// 파싱 불가면 경고를 남기고 0을 반환한다 — 인식 경계는 실패하지 않는다.
pub fn parse_duration(text: &str) -> chrono::Duration {
    let normalized = normalize_glyphs(text);
    match DURATION_RE.captures(&normalized) {
        Some(caps) => {
            // 캡처 그룹은 전부 \d 고정이므로 파싱은 실패할 수 없다
            let hours: i64 = caps[1].parse().unwrap_or(0);
            let minutes: i64 = caps[2].parse().unwrap_or(0);
            let seconds: i64 = caps[3].parse().unwrap_or(0);
            chrono::Duration::seconds(hours * 3600 + minutes * 60 + seconds)
        }
        None => {
            warn!(raw = %text, "유효하지 않은 시간 문자열 — 0으로 강등");
            chrono::Duration::zero()
        }
    }
}
