use std::sync::Arc;

use filesponge_core::{DeliveryReceiver, FileActor, Locator, Outcome, Rejection, SignalKind};
use metrics::counter;
use tracing::{debug, warn};

use crate::registry::ActorRegistry;

/// 路由结果：信号被提交到了哪个Actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTicket {
    pub actor: String,
    pub kind: SignalKind,
    pub locator: Locator,
}

/// 带提交确认的路由结果
#[derive(Debug)]
pub struct ConfirmedRoute {
    pub ticket: RouteTicket,
    pub delivery: DeliveryReceiver,
}

/// 信号调度器
///
/// 按注册表的优先级顺序探测Actor，把信号交给第一个接受该定位符的Actor。
/// 不做负载均衡，路由结果对同一注册表是确定的。
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: ActorRegistry,
}

impl Dispatcher {
    pub fn new(registry: ActorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    /// 返回将会处理该定位符的Actor，不提交信号
    pub fn route(&self, locator: &Locator) -> Option<Arc<dyn FileActor>> {
        self.registry
            .find_handler(locator)
            .map(|registration| Arc::clone(registration.actor()))
    }

    /// 请求下载文件
    pub fn request_download(&self, locator: &Locator) -> Outcome<RouteTicket> {
        self.request(SignalKind::Download, locator)
    }

    /// 请求删除文件
    pub fn request_delete(&self, locator: &Locator) -> Outcome<RouteTicket> {
        self.request(SignalKind::Delete, locator)
    }

    pub fn request_download_confirmed(&self, locator: &Locator) -> Outcome<ConfirmedRoute> {
        self.request_confirmed(SignalKind::Download, locator)
    }

    pub fn request_delete_confirmed(&self, locator: &Locator) -> Outcome<ConfirmedRoute> {
        self.request_confirmed(SignalKind::Delete, locator)
    }

    /// 路由并提交信号
    ///
    /// 没有Actor接受时返回 `Rejected(Unroutable)`，Actor队列已关闭时返回
    /// `Rejected(QueueClosed)`。从不返回 `NoValue`。
    pub fn request(&self, kind: SignalKind, locator: &Locator) -> Outcome<RouteTicket> {
        let Some(actor) = self.route(locator) else {
            return self.unroutable(kind, locator);
        };

        let outcome = actor.submit(kind, locator);
        self.log_submission(kind, locator, actor.name(), &outcome);
        outcome.map(|_| RouteTicket {
            actor: actor.name().to_string(),
            kind,
            locator: locator.clone(),
        })
    }

    pub fn request_confirmed(
        &self,
        kind: SignalKind,
        locator: &Locator,
    ) -> Outcome<ConfirmedRoute> {
        let Some(actor) = self.route(locator) else {
            return self.unroutable(kind, locator);
        };

        let outcome = actor.submit_confirmed(kind, locator);
        self.log_submission(kind, locator, actor.name(), &outcome);
        outcome.map(|delivery| ConfirmedRoute {
            ticket: RouteTicket {
                actor: actor.name().to_string(),
                kind,
                locator: locator.clone(),
            },
            delivery,
        })
    }

    fn unroutable<T>(&self, kind: SignalKind, locator: &Locator) -> Outcome<T> {
        warn!("No actor can handle {} request for {}", kind, locator);
        counter!("filesponge_dispatch_unroutable_total", "kind" => kind.as_str()).increment(1);
        Outcome::Rejected(Rejection::Unroutable)
    }

    fn log_submission<T>(
        &self,
        kind: SignalKind,
        locator: &Locator,
        actor: &str,
        outcome: &Outcome<T>,
    ) {
        match outcome {
            Outcome::Accepted(_) => debug!(
                actor,
                kind = %kind,
                locator = %locator,
                "Signal dispatched"
            ),
            Outcome::Rejected(reason) => warn!(
                "Actor '{}' rejected {} request for {}: {}",
                actor, kind, locator, reason
            ),
            Outcome::NoValue => {
                // 提交操作不会产生无值结果
                unreachable!("submission to actor '{actor}' returned no value")
            }
        }
    }
}
