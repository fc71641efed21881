use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use filesponge_core::{
    ActorConfig, CapabilityProbe, DeliveryReceiver, FileActor, Locator, Outcome, PendingSignal,
    SignalKind,
};
use tracing::info;

use crate::signal_queue::{QueueStats, SignalQueue};

/// 按前缀匹配定位符的探测器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixProbe {
    prefixes: Vec<String>,
}

impl PrefixProbe {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

impl CapabilityProbe for PrefixProbe {
    fn accepts(&self, locator: &Locator) -> bool {
        let raw = locator.as_str();
        self.prefixes.iter().any(|prefix| raw.starts_with(prefix.as_str()))
    }

    fn describe(&self) -> String {
        format!("prefix[{}]", self.prefixes.join(", "))
    }
}

/// 基于内存信号队列的镜像Actor
///
/// 下载和删除各有一个独立的 [`SignalQueue`]，两者互不竞争。
pub struct MirrorActor {
    name: String,
    probe: Box<dyn CapabilityProbe>,
    downloads: SignalQueue,
    deletes: SignalQueue,
}

impl MirrorActor {
    pub fn new(name: impl Into<String>, probe: impl CapabilityProbe + 'static) -> Self {
        let name = name.into();
        Self {
            downloads: SignalQueue::new(name.clone(), SignalKind::Download),
            deletes: SignalQueue::new(name.clone(), SignalKind::Delete),
            probe: Box::new(probe),
            name,
        }
    }

    /// 根据配置创建使用前缀探测的Actor
    pub fn from_config(config: &ActorConfig) -> Self {
        let actor = Self::new(
            config.name.clone(),
            PrefixProbe::new(config.prefixes.iter().cloned()),
        );
        info!(
            "Created mirror actor '{}' with probe {}",
            actor.name,
            actor.probe.describe()
        );
        actor
    }

    pub fn queue(&self, kind: SignalKind) -> &SignalQueue {
        match kind {
            SignalKind::Download => &self.downloads,
            SignalKind::Delete => &self.deletes,
        }
    }

    pub fn stats(&self, kind: SignalKind) -> QueueStats {
        self.queue(kind).stats()
    }
}

impl fmt::Debug for MirrorActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MirrorActor")
            .field("name", &self.name)
            .field("probe", &self.probe.describe())
            .field("downloads", &self.downloads.len())
            .field("deletes", &self.deletes.len())
            .finish()
    }
}

#[async_trait]
impl FileActor for MirrorActor {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, locator: &Locator) -> bool {
        self.probe.accepts(locator)
    }

    fn download_file(&self, locator: &Locator) -> Outcome {
        self.downloads.submit(locator)
    }

    fn delete_file(&self, locator: &Locator) -> Outcome {
        self.deletes.submit(locator)
    }

    fn download_file_confirmed(&self, locator: &Locator) -> Outcome<DeliveryReceiver> {
        self.downloads.submit_with_confirmation(locator)
    }

    fn delete_file_confirmed(&self, locator: &Locator) -> Outcome<DeliveryReceiver> {
        self.deletes.submit_with_confirmation(locator)
    }

    async fn download_next(&self, timeout: Duration) -> Outcome<PendingSignal> {
        self.downloads.consume_next(timeout).await
    }

    async fn delete_next(&self, timeout: Duration) -> Outcome<PendingSignal> {
        self.deletes.consume_next(timeout).await
    }

    fn cancel(&self, kind: SignalKind, locator: &Locator) -> bool {
        self.queue(kind).cancel(locator)
    }

    fn close(&self) {
        self.downloads.close();
        self.deletes.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_probe() {
        let probe = PrefixProbe::new(["https://a.example/", "ftp://"]);
        assert!(probe.accepts(&Locator::new("https://a.example/file")));
        assert!(probe.accepts(&Locator::new("ftp://host/file")));
        assert!(!probe.accepts(&Locator::new("https://b.example/file")));
        assert_eq!(probe.describe(), "prefix[https://a.example/, ftp://]");
    }

    #[tokio::test]
    async fn test_kinds_use_independent_queues() {
        let actor = MirrorActor::new("m", |_: &Locator| true);
        let locator = Locator::new("https://x/y");

        assert!(actor.download_file(&locator).is_accepted());
        assert!(actor.delete_file(&locator).is_accepted());
        assert_eq!(actor.queue(SignalKind::Download).len(), 1);
        assert_eq!(actor.queue(SignalKind::Delete).len(), 1);

        let delete = actor.delete_next(Duration::ZERO).await.accepted().unwrap();
        assert_eq!(delete.kind(), SignalKind::Delete);
        assert!(actor.delete_next(Duration::ZERO).await.is_no_value());
        assert_eq!(actor.stats(SignalKind::Download).pending, 1);
    }

    #[tokio::test]
    async fn test_from_config_and_close() {
        let config = ActorConfig::new("cfg", 0, vec!["https://cfg/".to_string()]);
        let actor = MirrorActor::from_config(&config);
        assert_eq!(actor.name(), "cfg");
        assert!(actor.can_handle(&Locator::new("https://cfg/file")));
        assert!(!actor.can_handle(&Locator::new("https://other/file")));

        actor.close();
        assert!(actor.download_file(&Locator::new("https://cfg/file")).is_rejected());
        assert!(actor
            .poll_next(SignalKind::Delete, Duration::from_millis(5))
            .await
            .is_rejected());
    }
}
