//! 비교 레코드 싱크 포트.

use crate::error::CoreError;
use crate::models::comparison::ComparisonRecord;

/// append 전용 레코드 싱크
///
/// 여러 평가 태스크가 동시에 append하므로 구현체는 쓰기를 직렬화해야
/// 한다 — 레코드 1건 = 온전한 1회 기록, 부분/교차 기록 금지.
pub trait RecordSink: Send + Sync {
    /// 레코드 1건 기록. 실패는 호출 측에서 경고 처리되며 태스크를
    /// 중단시키지 않는다.
    fn append(&self, record: &ComparisonRecord) -> Result<(), CoreError>;
}
