use crate::error::{RollcallResult, TowerSessionSnafu};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tower_sessions::Session;

const FLASH_KEY: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashCategory {
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub message: String,
    pub expires_at: Timestamp,
}

impl FlashMessage {
    pub fn new(category: FlashCategory, message: impl Into<String>, ttl: SignedDuration) -> Self {
        Self {
            category,
            message: message.into(),
            expires_at: Timestamp::now()
                .checked_add(ttl)
                .unwrap_or(Timestamp::MAX),
        }
    }

    pub fn is_live_at(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// Queues a message for whichever page this session loads next.
pub async fn push(session: &Session, message: FlashMessage) -> RollcallResult<()> {
    let mut queued: Vec<FlashMessage> = session
        .get(FLASH_KEY)
        .await
        .context(TowerSessionSnafu)?
        .unwrap_or_default();
    queued.push(message);

    session
        .insert(FLASH_KEY, queued)
        .await
        .context(TowerSessionSnafu)
}

/// Empties the slot, returning whatever hasn't expired yet.
pub async fn take(session: &Session) -> RollcallResult<Vec<FlashMessage>> {
    let queued: Vec<FlashMessage> = session
        .remove(FLASH_KEY)
        .await
        .context(TowerSessionSnafu)?
        .unwrap_or_default();

    let now = Timestamp::now();
    Ok(queued
        .into_iter()
        .filter(|message| message.is_live_at(now))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn messages_are_read_once() {
        let session = session();
        push(
            &session,
            FlashMessage::new(FlashCategory::Success, "saved", SignedDuration::from_secs(30)),
        )
        .await
        .unwrap();
        push(
            &session,
            FlashMessage::new(FlashCategory::Success, "but also", SignedDuration::from_secs(30)),
        )
        .await
        .unwrap();

        let first = take(&session).await.unwrap();
        assert_eq!(
            first.iter().map(|m| m.message.as_str()).collect::<Vec<_>>(),
            ["saved", "but also"]
        );
        assert!(take(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_messages_are_dropped() {
        let session = session();
        push(
            &session,
            FlashMessage::new(FlashCategory::Success, "too late", SignedDuration::from_secs(-1)),
        )
        .await
        .unwrap();

        assert!(take(&session).await.unwrap().is_empty());
    }

    #[test]
    fn huge_ttls_saturate() {
        let message = FlashMessage::new(FlashCategory::Success, "forever", SignedDuration::MAX);
        assert_eq!(message.expires_at, Timestamp::MAX);
    }

    #[test]
    fn liveness_is_strict() {
        let message = FlashMessage::new(FlashCategory::Success, "x", SignedDuration::ZERO);
        assert!(!message.is_live_at(message.expires_at));
        assert!(message.is_live_at(message.expires_at - SignedDuration::from_secs(1)));
    }
}
