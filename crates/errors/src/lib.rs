use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilespongeError {
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("无效的资源定位符: {0:?}")]
    InvalidLocator(String),
    #[error("无效的请求: {0}")]
    InvalidRequest(String),
    #[error("重复注册的Actor: {name}")]
    DuplicateActor { name: String },
    #[error("传输错误: {0}")]
    Transport(String),
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type FilespongeResult<T> = Result<T, FilespongeError>;

impl FilespongeError {
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn invalid_locator<S: Into<String>>(raw: S) -> Self {
        Self::InvalidLocator(raw.into())
    }
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }
    pub fn duplicate_actor<S: Into<String>>(name: S) -> Self {
        Self::DuplicateActor { name: name.into() }
    }
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }
    pub fn is_retryable(&self) -> bool {
        matches!(self, FilespongeError::Transport(_) | FilespongeError::Io(_))
    }
}

impl From<anyhow::Error> for FilespongeError {
    fn from(err: anyhow::Error) -> Self {
        FilespongeError::Internal(err.to_string())
    }
}
