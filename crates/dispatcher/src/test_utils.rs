#[cfg(test)]
pub mod mocks {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use filesponge_core::{
        Delivery, DeliveryReceiver, FileActor, Locator, Outcome, PendingSignal, Rejection, Signal,
        SignalKind,
    };
    use tokio::sync::oneshot;

    /// 固定探测结果、记录所有提交的Actor
    #[derive(Clone)]
    pub struct ScriptedActor {
        inner: Arc<Inner>,
    }

    struct Inner {
        name: String,
        accepts: bool,
        closed: AtomicBool,
        probes: AtomicUsize,
        submissions: Mutex<Vec<Signal>>,
        confirmations: Mutex<Vec<oneshot::Sender<Delivery>>>,
    }

    impl ScriptedActor {
        pub fn new(name: &str, accepts: bool) -> Self {
            Self {
                inner: Arc::new(Inner {
                    name: name.to_string(),
                    accepts,
                    closed: AtomicBool::new(false),
                    probes: AtomicUsize::new(0),
                    submissions: Mutex::new(Vec::new()),
                    confirmations: Mutex::new(Vec::new()),
                }),
            }
        }

        pub fn into_dyn(self) -> Arc<dyn FileActor> {
            Arc::new(self)
        }

        pub fn probe_count(&self) -> usize {
            self.inner.probes.load(Ordering::SeqCst)
        }

        pub fn submissions(&self) -> Vec<Signal> {
            self.inner.submissions.lock().unwrap().clone()
        }

        fn record(&self, kind: SignalKind, locator: &Locator) -> Outcome {
            if self.inner.closed.load(Ordering::SeqCst) {
                return Outcome::Rejected(Rejection::QueueClosed);
            }
            self.inner
                .submissions
                .lock()
                .unwrap()
                .push(Signal::new(locator.clone(), kind));
            Outcome::Accepted(())
        }

        fn record_confirmed(
            &self,
            kind: SignalKind,
            locator: &Locator,
        ) -> Outcome<DeliveryReceiver> {
            self.record(kind, locator).map(|_| {
                let (tx, rx) = oneshot::channel();
                self.inner.confirmations.lock().unwrap().push(tx);
                rx
            })
        }
    }

    #[async_trait]
    impl FileActor for ScriptedActor {
        fn name(&self) -> &str {
            &self.inner.name
        }

        fn can_handle(&self, _locator: &Locator) -> bool {
            self.inner.probes.fetch_add(1, Ordering::SeqCst);
            self.inner.accepts
        }

        fn download_file(&self, locator: &Locator) -> Outcome {
            self.record(SignalKind::Download, locator)
        }

        fn delete_file(&self, locator: &Locator) -> Outcome {
            self.record(SignalKind::Delete, locator)
        }

        fn download_file_confirmed(&self, locator: &Locator) -> Outcome<DeliveryReceiver> {
            self.record_confirmed(SignalKind::Download, locator)
        }

        fn delete_file_confirmed(&self, locator: &Locator) -> Outcome<DeliveryReceiver> {
            self.record_confirmed(SignalKind::Delete, locator)
        }

        async fn download_next(&self, _timeout: Duration) -> Outcome<PendingSignal> {
            Outcome::NoValue
        }

        async fn delete_next(&self, _timeout: Duration) -> Outcome<PendingSignal> {
            Outcome::NoValue
        }

        fn cancel(&self, _kind: SignalKind, _locator: &Locator) -> bool {
            false
        }

        fn close(&self) {
            self.inner.closed.store(true, Ordering::SeqCst);
        }
    }
}
