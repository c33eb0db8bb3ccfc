//! Domain model structs persisted by the store layer.
//!
//! Each struct maps to one table (or, for the blob-persisted kinds, to a
//! single JSON column).  Identity fields are `Uuid`s; timestamps are UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{
    DevicePlatform, ImageType, Industry, ProgrammingLanguage, Role, Tier, TokenStatus, TokenType,
    Urgency,
};

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A person registered on the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Unique user identifier.
    pub user_id: Uuid,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    /// Roles held by this user.  Stored as a JSON array of enum text.
    pub roles: Vec<Role>,
    pub birthdate: Option<DateTime<Utc>>,
    /// Media id of the profile image, if one was uploaded.
    pub profile_image_id: Option<Uuid>,
    pub github_profile: Option<String>,
    /// When the user joined the platform.
    pub time_joined: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// A registered application that sends messages through the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Application {
    /// Unique application identifier.
    pub application_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// The organization this application belongs to.
    pub organization_id: Uuid,
    pub language: Option<ProgrammingLanguage>,
    pub tier: Option<Tier>,
    /// When the application's current token expires.
    pub token_expiration: Option<DateTime<Utc>>,
    /// Media id of the application icon.
    pub icon_media_id: Option<Uuid>,
    /// User ids of the owners.  Must never be empty.
    pub owners: Vec<Uuid>,
    /// Running count of messages this application has sent.
    pub total_messages_sent: i64,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single notification message.
///
/// Messages are identified by the pair (application id, message id); the
/// message id alone is not globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub application_id: Uuid,
    pub message_id: Uuid,
    pub title: String,
    pub body: String,
    pub urgency: Option<Urgency>,
    /// When the sending application created the message.
    pub time_created: DateTime<Utc>,
    /// When the platform received the message.
    pub time_received: DateTime<Utc>,
    /// Hostname of the machine that sent the message.
    pub hostname: String,
    pub mac_address: String,
    pub device_name: String,
    /// Absolute expiration, set from a TTL at save time when one is supplied.
    pub time_of_expiration: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Organization
// ---------------------------------------------------------------------------

/// A company or team owning applications.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Organization {
    pub organization_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// User ids of the owners, in order.  Must never be empty.
    pub owners: Vec<Uuid>,
    pub industry: Option<Industry>,
    pub tier: Option<Tier>,
    pub email: Option<String>,
    pub github_profile: Option<String>,
    pub website: Option<String>,
    pub stock_symbol: Option<String>,
}

// ---------------------------------------------------------------------------
// AuthenticationToken
// ---------------------------------------------------------------------------

/// A token authorizing a user or application against the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticationToken {
    pub token_id: Uuid,
    /// The user or application this token belongs to.
    pub owner_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub owner_name: Option<String>,
    pub time_of_creation: DateTime<Utc>,
    pub time_of_expiration: DateTime<Utc>,
    pub token_type: Option<TokenType>,
    pub status: Option<TokenStatus>,
}

// ---------------------------------------------------------------------------
// Image / Dimension
// ---------------------------------------------------------------------------

/// Raw image bytes plus their encoding.  Keyed externally by media id, and
/// for thumbnail variants additionally by [`Dimension`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub image_type: Option<ImageType>,
    pub data: Vec<u8>,
}

/// Pixel dimensions of a thumbnail variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub width: i32,
    pub height: i32,
}

// ---------------------------------------------------------------------------
// Reaction
// ---------------------------------------------------------------------------

/// A configured reaction owned by a user or application.  Reactions are
/// persisted as a JSON array per owner, not as decomposed columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reaction {
    /// Human-readable name shown in the UI.
    pub label: String,
    pub emoticon: String,
    /// Filter expressions deciding which messages trigger this reaction.
    pub filters: Vec<String>,
}

// ---------------------------------------------------------------------------
// MobileDevice
// ---------------------------------------------------------------------------

/// A mobile device registered for push delivery.  A user may register many;
/// the full set is persisted as one JSON array column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MobileDevice {
    pub name: String,
    pub platform: DevicePlatform,
    /// Push registration token issued by the platform vendor.
    pub device_token: String,
}
