//! 비차단 섀도 디스패처.
//!
//! 주 자동화 루프는 [`ShadowDispatcher::dispatch`]를 호출하고 즉시
//! 돌아간다. 실제 평가는 백그라운드 워커 태스크가 큐에서 꺼내 수행한다.
//!
//! 큐가 가득 차면 가장 오래된 이벤트부터 폐기한다 (drop-oldest).
//! 섀도 로그는 최신 동작의 표본이 오래된 밀린 표본보다 가치 있다.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use glance_core::config::ShadowConfig;
use glance_core::error::CoreError;
use glance_core::models::comparison::ComparisonRecord;
use glance_core::models::judgment::{VisionErrorKind, VisionJudgment};
use glance_core::models::match_event::MatchEvent;
use glance_core::ports::record_sink::RecordSink;
use glance_core::ports::vision_judge::VisionJudge;

use crate::log_sink::JsonlSink;
use crate::vision_client::RemoteVisionJudge;

// ============================================================
// 통계
// ============================================================

/// 디스패처 동작 스냅샷
///
/// 모든 이벤트가 소화된 시점에는 `completed + dropped == dispatched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// 큐에 들어간 이벤트 수
    pub dispatched: u64,
    /// 평가 완료 + 레코드 기록 시도까지 마친 이벤트 수
    pub completed: u64,
    /// 큐 포화로 폐기된 이벤트 수
    pub dropped: u64,
    /// 게이트(비활성화, 음성 매치)에 걸러진 이벤트 수
    pub suppressed: u64,
}

// ============================================================
// ShadowDispatcher
// ============================================================

struct Inner {
    config: ShadowConfig,
    queue: Mutex<VecDeque<MatchEvent>>,
    notify: Notify,
    shutdown: AtomicBool,
    dispatched: AtomicU64,
    completed: AtomicU64,
    dropped: AtomicU64,
    suppressed: AtomicU64,
}

/// 섀도 평가 디스패처
///
/// Drop 시 워커에게 종료를 알린다. 큐에 남은 이벤트는 폐기되지 않고
/// 처리 중이던 이벤트까지는 완료된다.
pub struct ShadowDispatcher {
    inner: Arc<Inner>,
}

impl ShadowDispatcher {
    /// 설정으로부터 전체 파이프라인 조립 — 원격 비전 클라이언트 + JSONL 싱크
    ///
    /// tokio 런타임 컨텍스트 안에서 호출해야 한다.
    pub fn from_config(config: ShadowConfig) -> Result<Self, CoreError> {
        let judge: Arc<dyn VisionJudge> = Arc::new(RemoteVisionJudge::new(&config.api)?);
        let sink: Arc<dyn RecordSink> = Arc::new(JsonlSink::create(&config.log_path)?);
        Ok(Self::spawn(config, judge, sink))
    }

    /// 판정자와 싱크를 직접 주입해 디스패처 생성 + 워커 기동
    ///
    /// tokio 런타임 컨텍스트 안에서 호출해야 한다.
    pub fn spawn(
        config: ShadowConfig,
        judge: Arc<dyn VisionJudge>,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        let worker_count = config.worker_count.max(1);
        let inner = Arc::new(Inner {
            config,
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
            dispatched: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        });

        info!(
            workers = worker_count,
            queue_capacity = inner.config.queue_capacity,
            model = judge.model_id(),
            "섀도 디스패처 기동"
        );

        for worker_id in 0..worker_count {
            let inner = inner.clone();
            let judge = judge.clone();
            let sink = sink.clone();
            tokio::spawn(async move {
                worker_loop(worker_id, inner, judge, sink).await;
            });
        }

        Self { inner }
    }

    /// 매치 이벤트 제출. 절대 블록하지 않고 절대 실패하지 않는다.
    ///
    /// 비활성화 상태이거나 `positive_matches_only` 게이트에 걸리면
    /// 이벤트는 조용히 버려진다. 큐 포화 시 가장 오래된 이벤트를 폐기하고
    /// 새 이벤트를 받는다.
    pub fn dispatch(&self, event: MatchEvent) {
        let inner = &self.inner;
        if !inner.config.enabled {
            inner.suppressed.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if inner.config.positive_matches_only && !event.outcome.matched {
            inner.suppressed.fetch_add(1, Ordering::Relaxed);
            return;
        }

        {
            let mut queue = inner.queue.lock();
            if queue.len() >= inner.config.queue_capacity {
                let discarded = queue.pop_front();
                inner.dropped.fetch_add(1, Ordering::Relaxed);
                if let Some(discarded) = discarded {
                    debug!(
                        template_id = %discarded.template_id,
                        "섀도 큐 포화 — 가장 오래된 이벤트 폐기"
                    );
                }
            }
            queue.push_back(event);
        }
        inner.dispatched.fetch_add(1, Ordering::Relaxed);
        inner.notify.notify_one();
    }

    /// 현재 통계 스냅샷
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.inner.dispatched.load(Ordering::Relaxed),
            completed: self.inner.completed.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            suppressed: self.inner.suppressed.load(Ordering::Relaxed),
        }
    }

    /// 큐가 비고 모든 워커가 대기 상태가 될 때까지의 근사 — 테스트 보조
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }
}

impl Drop for ShadowDispatcher {
    fn drop(&mut self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }
}

// ============================================================
// 워커 루프
// ============================================================

async fn worker_loop(
    worker_id: usize,
    inner: Arc<Inner>,
    judge: Arc<dyn VisionJudge>,
    sink: Arc<dyn RecordSink>,
) {
    debug!(worker_id, "섀도 워커 시작");
    loop {
        // 락 가드가 await를 넘어가지 않도록 pop은 별도 함수에서
        while let Some(event) = pop_event(&inner) {
            process(&inner, &*judge, &*sink, event).await;
        }

        // 종료 확인 전에 waiter 등록 — 확인과 대기 사이의 알림 유실 방지
        let notified = inner.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }
        notified.await;
    }
    debug!(worker_id, "섀도 워커 종료");
}

fn pop_event(inner: &Inner) -> Option<MatchEvent> {
    inner.queue.lock().pop_front()
}

/// 이벤트 1건 평가. 판정자 패닉은 INTERNAL 실패 레코드로 흡수한다 —
/// 어떤 경로로든 이벤트당 레코드는 정확히 하나.
async fn process(
    inner: &Inner,
    judge: &dyn VisionJudge,
    sink: &dyn RecordSink,
    event: MatchEvent,
) {
    let judged = AssertUnwindSafe(judge.judge(&event.screen, &event.template, &event.template_id))
        .catch_unwind()
        .await;

    let judgment = match judged {
        Ok(judgment) => judgment,
        Err(_) => {
            warn!(template_id = %event.template_id, "평가 태스크 패닉 — INTERNAL 실패로 기록");
            VisionJudgment::failure(
                VisionErrorKind::Internal,
                judge.model_id(),
                "평가 태스크 패닉",
            )
        }
    };

    let record = ComparisonRecord::from_event(&event, judgment);
    if let Err(e) = sink.append(&record) {
        // 로그 실패는 자동화에 영향을 주지 않는다 — 경고만 남긴다
        warn!(template_id = %record.template_id, error = %e, "비교 레코드 기록 실패");
    }
    inner.completed.fetch_add(1, Ordering::Relaxed);
}

// ============================================================
// 테스트
// ============================================================
