use std::fmt;

/// 请求被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// 没有任何已注册Actor能处理该定位符
    Unroutable,
    /// 队列已关闭（Actor正在停止）
    QueueClosed,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Unroutable => f.write_str("unroutable"),
            Rejection::QueueClosed => f.write_str("queue closed"),
        }
    }
}

/// 三态结果：接受 / 拒绝 / 截止时间前无值
///
/// 所有路由和队列操作都用它返回预期内的结果，不使用错误类型。
/// `NoValue` 只会出现在带超时的轮询操作上。
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T = ()> {
    Accepted(T),
    Rejected(Rejection),
    NoValue,
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    pub fn is_no_value(&self) -> bool {
        matches!(self, Outcome::NoValue)
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Outcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }

    /// `Some(true)` 接受，`Some(false)` 拒绝，`None` 无值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Outcome::Accepted(_) => Some(true),
            Outcome::Rejected(_) => Some(false),
            Outcome::NoValue => None,
        }
    }

    pub fn accepted(self) -> Option<T> {
        match self {
            Outcome::Accepted(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Accepted(value) => Outcome::Accepted(f(value)),
            Outcome::Rejected(reason) => Outcome::Rejected(reason),
            Outcome::NoValue => Outcome::NoValue,
        }
    }

    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Accepted(value) => Outcome::Accepted(value),
            Outcome::Rejected(reason) => Outcome::Rejected(*reason),
            Outcome::NoValue => Outcome::NoValue,
        }
    }
}
