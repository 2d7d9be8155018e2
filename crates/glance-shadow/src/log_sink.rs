//! 비교 로그 싱크.
//!
//! 여러 평가 태스크가 동시에 append하므로 쓰기는 뮤텍스로 직렬화한다 —
//! 레코드 1건 = 온전한 JSON 1행, 부분/교차 기록 없음.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use parking_lot::Mutex;

use glance_core::error::CoreError;
use glance_core::models::comparison::ComparisonRecord;
use glance_core::ports::record_sink::RecordSink;

// ============================================================
// JsonlSink — append 전용 JSON Lines 파일
// ============================================================

/// JSON Lines 파일 싱크
pub struct JsonlSink {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    /// 경로에 append 모드로 싱크 생성. 부모 디렉터리는 없으면 만든다.
    pub fn create(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl RecordSink for JsonlSink {
    fn append(&self, record: &ComparisonRecord) -> Result<(), CoreError> {
        let line = serde_json::to_string(record)?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{line}").map_err(|e| CoreError::LogWrite(e.to_string()))?;
        // 평가 태스크는 프로세스 종료를 기다리지 않으므로 행 단위로 flush
        writer.flush().map_err(|e| CoreError::LogWrite(e.to_string()))?;
        Ok(())
    }
}

// ============================================================
// MemorySink — 테스트/검사용 인메모리 싱크
// ============================================================

/// 레코드를 메모리에 쌓는 싱크
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ComparisonRecord>>,
}

impl MemorySink {
    /// 빈 싱크 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 기록된 레코드 수
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// 레코드가 없는지
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// 기록된 레코드 사본
    pub fn records(&self) -> Vec<ComparisonRecord> {
        self.records.lock().clone()
    }
}

impl RecordSink for MemorySink {
    fn append(&self, record: &ComparisonRecord) -> Result<(), CoreError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glance_core::models::judgment::{VisionErrorKind, VisionJudgment};
    use glance_core::models::match_event::MatchOutcome;

    fn record(template_id: &str) -> ComparisonRecord {
        ComparisonRecord {
            timestamp: 1_724_390_000.0,
            template_id: template_id.to_string(),
            traditional_system: MatchOutcome {
                matched: true,
                similarity: 0.9,
                method: "match".to_string(),
            },
            llm_system: VisionJudgment::failure(VisionErrorKind::Timeout, "m", "타임아웃"),
        }
    }

    #[test]
    fn jsonl_sink_writes_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.jsonl");
        let sink = JsonlSink::create(&path).unwrap();

        sink.append(&record("A")).unwrap();
        sink.append(&record("B")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let parsed: ComparisonRecord = serde_json::from_str(line).unwrap();
            assert!(parsed.traditional_system.matched);
        }
    }

    #[test]
    fn jsonl_sink_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/logs/compare.jsonl");
        let sink = JsonlSink::create(&path).unwrap();
        sink.append(&record("A")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn jsonl_sink_appends_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.jsonl");
        {
            let sink = JsonlSink::create(&path).unwrap();
            sink.append(&record("A")).unwrap();
        }
        {
            let sink = JsonlSink::create(&path).unwrap();
            sink.append(&record("B")).unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }

    #[test]
    fn memory_sink_accumulates() {
        let sink = MemorySink::new();
        assert!(sink.is_empty());
        sink.append(&record("A")).unwrap();
        sink.append(&record("B")).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.records()[1].template_id, "B");
    }

    #[test]
    fn concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stress.jsonl");
        let sink = std::sync::Arc::new(JsonlSink::create(&path).unwrap());

        let mut handles = Vec::new();
        for t in 0..8 {
            let sink = sink.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    sink.append(&record(&format!("T{t}_{i}"))).unwrap();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            serde_json::from_str::<ComparisonRecord>(line).expect("교차 기록 없는 온전한 JSON");
        }
    }
}
