//! Feed topic naming.
//!
//! With a broker username every topic lives under `<username>/feeds/`,
//! otherwise under `/feeds/`.  Both topics are built once at startup.

use super::events::TouchKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedTopics {
    touched: String,
    released: String,
}

impl FeedTopics {
    pub fn new(username: Option<&str>) -> Self {
        let root = match username {
            Some(user) => format!("{user}/feeds/"),
            None => String::from("/feeds/"),
        };
        Self {
            touched: format!("{root}{}", TouchKind::Touched.feed_name()),
            released: format!("{root}{}", TouchKind::Released.feed_name()),
        }
    }

    pub fn topic_for(&self, kind: TouchKind) -> &str {
        match kind {
            TouchKind::Touched => &self.touched,
            TouchKind::Released => &self.released,
        }
    }
}
