use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use filesponge_errors::{FilespongeError, FilespongeResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 远程文件资源定位符
///
/// 不透明的不可变值，相等性与哈希均由其规范字符串决定。
/// 克隆只增加引用计数，可在线程间自由共享。
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator(Arc<str>);

impl Locator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Arc::from(value.into()))
    }

    /// 解析外部输入，拒绝空白定位符
    pub fn parse(raw: &str) -> FilespongeResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FilespongeError::invalid_locator(raw));
        }
        Ok(Self::new(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({:?})", &*self.0)
    }
}

impl FromStr for Locator {
    type Err = FilespongeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for Locator {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Locator {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Locator::parse(&raw).map_err(serde::de::Error::custom)
    }
}
