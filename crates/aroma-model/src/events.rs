//! Activity events.
//!
//! Events are the one deliberately denormalized entity: the store keeps a
//! few structural columns for querying (ids, timestamp, type) and the
//! free-form detail as a single JSON blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventType {
    ApplicationCreated,
    ApplicationDeleted,
    ApplicationTokenRegenerated,
    OwnerAdded,
    OwnerRemoved,
    HealthCheckFailed,
    HealthCheckRestored,
    GeneralTopic,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventType::ApplicationCreated => "APPLICATION_CREATED",
            EventType::ApplicationDeleted => "APPLICATION_DELETED",
            EventType::ApplicationTokenRegenerated => "APPLICATION_TOKEN_REGENERATED",
            EventType::OwnerAdded => "OWNER_ADDED",
            EventType::OwnerRemoved => "OWNER_REMOVED",
            EventType::HealthCheckFailed => "HEALTH_CHECK_FAILED",
            EventType::HealthCheckRestored => "HEALTH_CHECK_RESTORED",
            EventType::GeneralTopic => "GENERAL_TOPIC",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for EventType {
    type Err = crate::enums::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPLICATION_CREATED" => Ok(EventType::ApplicationCreated),
            "APPLICATION_DELETED" => Ok(EventType::ApplicationDeleted),
            "APPLICATION_TOKEN_REGENERATED" => Ok(EventType::ApplicationTokenRegenerated),
            "OWNER_ADDED" => Ok(EventType::OwnerAdded),
            "OWNER_REMOVED" => Ok(EventType::OwnerRemoved),
            "HEALTH_CHECK_FAILED" => Ok(EventType::HealthCheckFailed),
            "HEALTH_CHECK_RESTORED" => Ok(EventType::HealthCheckRestored),
            "GENERAL_TOPIC" => Ok(EventType::GeneralTopic),
            other => Err(crate::enums::ParseEnumError {
                kind: "event type",
                value: other.to_string(),
            }),
        }
    }
}

/// One entry in a user's activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub event_id: Uuid,
    /// The user who caused the event.
    pub actor_id: Uuid,
    /// The application the event concerns.
    pub application_id: Uuid,
    /// The user whose feed this event lands in.
    pub recipient_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event_type: Option<EventType>,
    /// Free-form detail payload, persisted verbatim as JSON.
    pub detail: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_type_round_trip() {
        for t in [
            EventType::ApplicationCreated,
            EventType::ApplicationDeleted,
            EventType::ApplicationTokenRegenerated,
            EventType::OwnerAdded,
            EventType::OwnerRemoved,
            EventType::HealthCheckFailed,
            EventType::HealthCheckRestored,
            EventType::GeneralTopic,
        ] {
            assert_eq!(EventType::from_str(&t.to_string()).unwrap(), t);
        }
    }
}
