//! Pre-persistence validation predicates.
//!
//! One predicate per entity, invoked before every mutating operation and
//! before id-keyed lookups.  A failure raises
//! [`StoreError::InvalidArgument`](crate::StoreError::InvalidArgument)
//! synchronously, before any statement is issued, so bad input can never
//! cause a partial write.
//!
//! Identity fields are typed `Uuid`s, so "malformed id" here means the nil
//! UUID.  Required collections must be non-empty with every element itself
//! valid; optional fields are skipped.

use aroma_model::{
    Application, AuthenticationToken, Dimension, Event, Message, MobileDevice, Organization, User,
};
use uuid::Uuid;

use crate::error::{Result, StoreError};

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::InvalidArgument(message.into())
}

/// A required identity field must not be the nil UUID.
pub(crate) fn require_id(name: &str, id: Uuid) -> Result<()> {
    if id.is_nil() {
        return Err(invalid(format!("{name} must be set")));
    }
    Ok(())
}

/// A required text field must be non-empty.
pub(crate) fn require_text(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(format!("{name} must not be empty")));
    }
    Ok(())
}

pub(crate) fn require_user(user: &User) -> Result<()> {
    require_id("user id", user.user_id)?;
    require_text("first name", &user.first_name)?;
    require_text("email", &user.email)
}

pub(crate) fn require_application(app: &Application) -> Result<()> {
    require_id("application id", app.application_id)?;
    require_id("organization id", app.organization_id)?;
    require_text("application name", &app.name)?;
    if app.owners.is_empty() {
        return Err(invalid("application must have at least one owner"));
    }
    for owner in &app.owners {
        require_id("application owner id", *owner)?;
    }
    Ok(())
}

pub(crate) fn require_message(message: &Message) -> Result<()> {
    require_message_key(message.application_id, message.message_id)?;
    require_text("message title", &message.title)?;
    require_text("message body", &message.body)
}

/// Both halves of the composite message key, checked independently.
pub(crate) fn require_message_key(application_id: Uuid, message_id: Uuid) -> Result<()> {
    require_id("application id", application_id)?;
    require_id("message id", message_id)
}

pub(crate) fn require_organization(org: &Organization) -> Result<()> {
    require_id("organization id", org.organization_id)?;
    require_text("organization name", &org.name)?;
    if org.owners.is_empty() {
        return Err(invalid("organization must have at least one owner"));
    }
    for owner in &org.owners {
        require_id("organization owner id", *owner)?;
    }
    Ok(())
}

pub(crate) fn require_token(token: &AuthenticationToken) -> Result<()> {
    require_id("token id", token.token_id)?;
    require_id("token owner id", token.owner_id)
}

pub(crate) fn require_event(event: &Event) -> Result<()> {
    require_id("event id", event.event_id)?;
    require_id("actor id", event.actor_id)?;
    require_id("application id", event.application_id)?;
    require_id("recipient id", event.recipient_id)
}

pub(crate) fn require_dimension(dimension: &Dimension) -> Result<()> {
    if dimension.width <= 0 || dimension.height <= 0 {
        return Err(invalid(format!(
            "thumbnail dimension must be positive, got {}x{}",
            dimension.width, dimension.height
        )));
    }
    Ok(())
}

pub(crate) fn require_device(device: &MobileDevice) -> Result<()> {
    require_text("device name", &device.name)?;
    require_text("device token", &device.device_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aroma_model::DevicePlatform;
    use chrono::Utc;

    #[test]
    fn nil_id_is_rejected() {
        assert!(require_id("user id", Uuid::nil()).is_err());
        assert!(require_id("user id", Uuid::new_v4()).is_ok());
    }

    #[test]
    fn application_needs_an_owner() {
        let app = Application {
            application_id: Uuid::new_v4(),
            name: "deployment-bot".into(),
            description: None,
            organization_id: Uuid::new_v4(),
            language: None,
            tier: None,
            token_expiration: None,
            icon_media_id: None,
            owners: vec![],
            total_messages_sent: 0,
        };
        let err = require_application(&app).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn message_needs_title_and_body() {
        let message = Message {
            application_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            title: String::new(),
            body: "build failed".into(),
            urgency: None,
            time_created: Utc::now(),
            time_received: Utc::now(),
            hostname: "ci-01".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            device_name: "runner".into(),
            time_of_expiration: None,
        };
        assert!(require_message(&message).is_err());
    }

    #[test]
    fn dimension_must_be_positive() {
        assert!(require_dimension(&Dimension {
            width: 0,
            height: 64
        })
        .is_err());
        assert!(require_dimension(&Dimension {
            width: 64,
            height: 64
        })
        .is_ok());
    }

    #[test]
    fn device_needs_name_and_token() {
        let device = MobileDevice {
            name: "pixel".into(),
            platform: DevicePlatform::Android,
            device_token: String::new(),
        };
        assert!(require_device(&device).is_err());
    }
}
