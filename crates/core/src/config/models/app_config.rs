use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::{
    actor::{default_actors, ActorConfig},
    observability::ObservabilityConfig,
    worker::WorkerConfig,
};

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub worker: WorkerConfig,
    pub observability: ObservabilityConfig,
    pub actors: Vec<ActorConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            worker: WorkerConfig::default(),
            observability: ObservabilityConfig::default(),
            actors: default_actors(),
        }
    }
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: FILESPONGE_, nesting: __)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        // 1. Load config file if provided
        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = [
                "config/filesponge.toml",
                "filesponge.toml",
                "/etc/filesponge/config.toml",
            ];

            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // 2. Environment variable overrides - highest priority
        builder = builder.add_source(
            Environment::with_prefix("FILESPONGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// 已启用的Actor，按配置顺序
    pub fn enabled_actors(&self) -> impl Iterator<Item = &ActorConfig> {
        self.actors.iter().filter(|actor| actor.enabled)
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.worker.validate().context("Worker配置验证失败")?;

        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        let mut names = HashSet::new();
        for actor in &self.actors {
            actor
                .validate()
                .with_context(|| format!("Actor配置验证失败: {}", actor.name))?;
            if !names.insert(actor.name.as_str()) {
                return Err(anyhow::anyhow!("Actor名称重复: {}", actor.name));
            }
        }

        if self.enabled_actors().next().is_none() {
            return Err(anyhow::anyhow!("至少需要启用一个Actor"));
        }

        Ok(())
    }
}
