use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

/// 单个镜像Actor的配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    pub name: String,
    /// 探测顺序，数值越小越先探测
    #[serde(default)]
    pub priority: i32,
    /// 该Actor接受的定位符前缀
    pub prefixes: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl ActorConfig {
    pub fn new(name: impl Into<String>, priority: i32, prefixes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            priority,
            prefixes,
            enabled: true,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Actor名称不能为空"));
        }

        if self.prefixes.is_empty() {
            return Err(anyhow::anyhow!("Actor {} 至少需要一个定位符前缀", self.name));
        }

        if self.prefixes.iter().any(|prefix| prefix.is_empty()) {
            return Err(anyhow::anyhow!("Actor {} 的定位符前缀不能为空字符串", self.name));
        }

        Ok(())
    }
}

pub(crate) fn default_actors() -> Vec<ActorConfig> {
    vec![ActorConfig::new(
        "default-mirror",
        0,
        vec!["http://".to_string(), "https://".to_string()],
    )]
}
