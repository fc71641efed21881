use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use filesponge_core::{AppConfig, FileActor, FilespongeError, FilespongeResult, Locator};
use filesponge_infrastructure::MirrorActor;
use tracing::{debug, info};

/// 已注册的Actor及其探测优先级
#[derive(Clone)]
pub struct ActorRegistration {
    actor: Arc<dyn FileActor>,
    priority: i32,
}

impl ActorRegistration {
    pub fn actor(&self) -> &Arc<dyn FileActor> {
        &self.actor
    }

    pub fn name(&self) -> &str {
        self.actor.name()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

impl fmt::Debug for ActorRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRegistration")
            .field("name", &self.name())
            .field("priority", &self.priority)
            .finish()
    }
}

/// 有序、只读的Actor注册表
///
/// 按优先级升序排列，优先级相同时保持注册顺序。构建后不可修改，
/// 克隆只复制引用。
#[derive(Clone, Debug)]
pub struct ActorRegistry {
    registrations: Arc<[ActorRegistration]>,
}

#[derive(Default)]
pub struct ActorRegistryBuilder {
    registrations: Vec<ActorRegistration>,
}

impl ActorRegistryBuilder {
    pub fn register(mut self, actor: Arc<dyn FileActor>, priority: i32) -> Self {
        self.registrations.push(ActorRegistration { actor, priority });
        self
    }

    pub fn build(mut self) -> FilespongeResult<ActorRegistry> {
        let mut names = HashSet::new();
        for registration in &self.registrations {
            if !names.insert(registration.name().to_string()) {
                return Err(FilespongeError::duplicate_actor(registration.name()));
            }
        }

        // 稳定排序，同优先级保持注册顺序
        self.registrations.sort_by_key(|registration| registration.priority);

        let order: Vec<_> = self
            .registrations
            .iter()
            .map(|registration| format!("{}({})", registration.name(), registration.priority))
            .collect();
        info!("Actor registry built: [{}]", order.join(", "));

        Ok(ActorRegistry {
            registrations: self.registrations.into(),
        })
    }
}

impl ActorRegistry {
    pub fn builder() -> ActorRegistryBuilder {
        ActorRegistryBuilder::default()
    }

    /// 根据配置创建基于前缀探测的镜像Actor
    pub fn from_config(config: &AppConfig) -> FilespongeResult<Self> {
        config
            .enabled_actors()
            .fold(Self::builder(), |builder, actor_config| {
                let actor: Arc<dyn FileActor> = Arc::new(MirrorActor::from_config(actor_config));
                builder.register(actor, actor_config.priority)
            })
            .build()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorRegistration> {
        self.registrations.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FileActor>> {
        self.registrations
            .iter()
            .find(|registration| registration.name() == name)
            .map(ActorRegistration::actor)
    }

    /// 按优先级顺序返回第一个能处理该定位符的Actor
    pub fn find_handler(&self, locator: &Locator) -> Option<&ActorRegistration> {
        let handler = self
            .registrations
            .iter()
            .find(|registration| registration.actor.can_handle(locator));

        match handler {
            Some(registration) => debug!(
                locator = %locator,
                actor = registration.name(),
                "Probe accepted"
            ),
            None => debug!(locator = %locator, "No actor accepts locator"),
        }

        handler
    }

    /// 关闭所有Actor，唤醒所有等待中的Worker
    pub fn close_all(&self) {
        for registration in self.registrations.iter() {
            registration.actor.close();
        }
        info!("Closed {} actors", self.registrations.len());
    }
}
