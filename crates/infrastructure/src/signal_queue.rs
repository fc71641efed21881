use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use filesponge_core::{
    Delivery, DeliveryReceiver, Locator, Outcome, PendingSignal, Rejection, Signal, SignalKind,
};
use metrics::counter;
use tokio::sync::{oneshot, Notify};
use tokio::time::Instant;
use tracing::{debug, info};

/// 内存信号队列
///
/// 每个 (Actor, 信号类型) 一个实例，内部状态由单把互斥锁保护，
/// 不同实例之间互不竞争。同一定位符最多只有一个待处理条目，
/// 重复提交不会改变其在FIFO中的位置。
///
/// 消费端通过 [`Notify`] 等待新信号，等待以绝对截止时间计算，
/// 虚假唤醒不会延长总等待时间。
#[derive(Debug)]
pub struct SignalQueue {
    actor: String,
    kind: SignalKind,
    state: Mutex<QueueState>,
    notify: Notify,
}

#[derive(Debug, Default)]
struct QueueState {
    /// FIFO顺序：(序号, 定位符)
    order: VecDeque<(u64, Locator)>,
    entries: HashMap<Locator, PendingEntry>,
    next_seq: u64,
    closed: bool,
    stats: QueueStats,
}

#[derive(Debug)]
struct PendingEntry {
    seq: u64,
    submitted_at: DateTime<Utc>,
    coalesced: u32,
    confirmations: Vec<oneshot::Sender<Delivery>>,
}

impl PendingEntry {
    fn resolve(self, delivery: Delivery) {
        for confirmation in self.confirmations {
            // 提交方可能已经不再关心结果
            let _ = confirmation.send(delivery.clone());
        }
    }
}

/// 队列统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// 当前待处理条目数
    pub pending: usize,
    /// 新建条目总数
    pub submitted: u64,
    /// 被合并到已有条目的重复提交次数
    pub coalesced: u64,
    pub consumed: u64,
    pub cancelled: u64,
    pub closed: bool,
}

enum Take {
    Signal(PendingSignal),
    Empty,
    Closed,
}

impl SignalQueue {
    pub fn new(actor: impl Into<String>, kind: SignalKind) -> Self {
        Self {
            actor: actor.into(),
            kind,
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
        }
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 提交信号
    ///
    /// 已存在相同定位符的待处理条目时视为已接受。只有队列关闭时返回拒绝，
    /// 从不返回 `NoValue`。
    pub fn submit(&self, locator: &Locator) -> Outcome {
        self.submit_inner(locator, None)
    }

    /// 提交信号并获取确认接收端
    ///
    /// 若与已有条目合并，接收端挂到该条目上，条目被消费或取消时同样会收到通知。
    pub fn submit_with_confirmation(&self, locator: &Locator) -> Outcome<DeliveryReceiver> {
        let (tx, rx) = oneshot::channel();
        self.submit_inner(locator, Some(tx)).map(|_| rx)
    }

    fn submit_inner(
        &self,
        locator: &Locator,
        confirmation: Option<oneshot::Sender<Delivery>>,
    ) -> Outcome {
        let mut state = self.lock();

        if state.closed {
            debug!(
                actor = %self.actor,
                kind = %self.kind,
                locator = %locator,
                "Signal rejected, queue closed"
            );
            return Outcome::Rejected(Rejection::QueueClosed);
        }

        if let Some(entry) = state.entries.get_mut(locator) {
            entry.coalesced = entry.coalesced.saturating_add(1);
            entry.confirmations.extend(confirmation);
            state.stats.coalesced += 1;
            drop(state);

            debug!(
                actor = %self.actor,
                kind = %self.kind,
                locator = %locator,
                "Signal already pending, coalesced"
            );
            counter!(
                "filesponge_signals_coalesced_total",
                "actor" => self.actor.clone(),
                "kind" => self.kind.as_str()
            )
            .increment(1);
            return Outcome::Accepted(());
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            locator.clone(),
            PendingEntry {
                seq,
                submitted_at: Utc::now(),
                coalesced: 1,
                confirmations: confirmation.into_iter().collect(),
            },
        );
        state.order.push_back((seq, locator.clone()));
        state.stats.submitted += 1;
        let pending = state.entries.len();
        drop(state);

        self.notify.notify_one();

        debug!(
            actor = %self.actor,
            kind = %self.kind,
            locator = %locator,
            pending,
            "Signal queued"
        );
        counter!(
            "filesponge_signals_submitted_total",
            "actor" => self.actor.clone(),
            "kind" => self.kind.as_str()
        )
        .increment(1);

        Outcome::Accepted(())
    }

    /// 取出最早提交的待处理信号
    ///
    /// `timeout` 为0时立即返回；否则等待到有信号或截止时间到达。
    /// 队列关闭（包括等待期间关闭）时返回 `Rejected(QueueClosed)`。
    pub async fn consume_next(&self, timeout: Duration) -> Outcome<PendingSignal> {
        // 超出时钟范围的超时视为无限等待
        let deadline = Instant::now().checked_add(timeout);

        loop {
            // 先登记等待再检查状态，避免检查与等待之间的通知丢失
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_take() {
                Take::Signal(signal) => return Outcome::Accepted(signal),
                Take::Closed => return Outcome::Rejected(Rejection::QueueClosed),
                Take::Empty => {}
            }

            if timeout.is_zero() {
                return Outcome::NoValue;
            }

            match deadline {
                Some(deadline) => {
                    if tokio::time::timeout_at(deadline, notified).await.is_err() {
                        return match self.try_take() {
                            Take::Signal(signal) => Outcome::Accepted(signal),
                            Take::Closed => Outcome::Rejected(Rejection::QueueClosed),
                            Take::Empty => Outcome::NoValue,
                        };
                    }
                }
                None => notified.await,
            }
        }
    }

    fn try_take(&self) -> Take {
        let mut state = self.lock();

        if state.closed {
            return Take::Closed;
        }

        let Some((seq, locator)) = state.order.pop_front() else {
            return Take::Empty;
        };

        let entry = match state.entries.remove(&locator) {
            Some(entry) if entry.seq == seq => entry,
            other => panic!(
                "signal queue invariant violated for {locator}: order slot {seq} has entry {:?}",
                other.map(|entry| entry.seq)
            ),
        };
        state.stats.consumed += 1;
        drop(state);

        let signal = PendingSignal {
            signal: Signal::new(locator, self.kind),
            actor: self.actor.clone(),
            submitted_at: entry.submitted_at,
            coalesced: entry.coalesced,
        };
        entry.resolve(Delivery::Consumed {
            actor: self.actor.clone(),
        });

        debug!(
            actor = %self.actor,
            kind = %self.kind,
            locator = %signal.locator(),
            "Signal consumed"
        );
        counter!(
            "filesponge_signals_consumed_total",
            "actor" => self.actor.clone(),
            "kind" => self.kind.as_str()
        )
        .increment(1);

        Take::Signal(signal)
    }

    /// 取消尚未被消费的信号，返回是否存在该条目
    pub fn cancel(&self, locator: &Locator) -> bool {
        let mut state = self.lock();

        let Some(entry) = state.entries.remove(locator) else {
            return false;
        };
        state.order.retain(|(seq, _)| *seq != entry.seq);
        state.stats.cancelled += 1;
        drop(state);

        entry.resolve(Delivery::Cancelled);

        debug!(
            actor = %self.actor,
            kind = %self.kind,
            locator = %locator,
            "Signal cancelled"
        );
        counter!(
            "filesponge_signals_cancelled_total",
            "actor" => self.actor.clone(),
            "kind" => self.kind.as_str()
        )
        .increment(1);

        true
    }

    /// 永久关闭队列
    ///
    /// 取消所有待处理条目并唤醒所有等待中的消费者。重复调用无副作用。
    pub fn close(&self) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.order.clear();
        let drained: Vec<_> = state.entries.drain().map(|(_, entry)| entry).collect();
        state.stats.cancelled += drained.len() as u64;
        drop(state);

        self.notify.notify_waiters();

        let cancelled = drained.len();
        for entry in drained {
            entry.resolve(Delivery::Cancelled);
        }

        if cancelled > 0 {
            counter!(
                "filesponge_signals_cancelled_total",
                "actor" => self.actor.clone(),
                "kind" => self.kind.as_str()
            )
            .increment(cancelled as u64);
        }

        info!(
            "Closed {} signal queue of actor '{}' ({} pending signals cancelled)",
            self.kind, self.actor, cancelled
        );
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, locator: &Locator) -> bool {
        self.lock().entries.contains_key(locator)
    }

    /// 按FIFO顺序列出待处理的定位符
    pub fn pending(&self) -> Vec<Locator> {
        self.lock()
            .order
            .iter()
            .map(|(_, locator)| locator.clone())
            .collect()
    }

    /// 获取队列统计信息
    pub fn stats(&self) -> QueueStats {
        let state = self.lock();
        QueueStats {
            pending: state.entries.len(),
            closed: state.closed,
            ..state.stats.clone()
        }
    }
}
