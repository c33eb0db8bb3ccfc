//! Enumerated column values.
//!
//! Every enum here is persisted as its canonical upper-case text form, so
//! each one carries a `Display` / `FromStr` pair.  The store layer parses
//! these leniently on read: unknown text maps to an error here, which the
//! store turns into an unset field rather than a failed row.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when persisted enum text does not match any known value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A user's role within their organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Developer,
    Operations,
    QualityAssurance,
    Manager,
    Owner,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Developer => "DEVELOPER",
            Role::Operations => "OPERATIONS",
            Role::QualityAssurance => "QA",
            Role::Manager => "MANAGER",
            Role::Owner => "OWNER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEVELOPER" => Ok(Role::Developer),
            "OPERATIONS" => Ok(Role::Operations),
            "QA" => Ok(Role::QualityAssurance),
            "MANAGER" => Ok(Role::Manager),
            "OWNER" => Ok(Role::Owner),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// How urgent a message is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Urgency::Low => "LOW",
            Urgency::Medium => "MEDIUM",
            Urgency::High => "HIGH",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Urgency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOW" => Ok(Urgency::Low),
            "MEDIUM" => Ok(Urgency::Medium),
            "HIGH" => Ok(Urgency::High),
            other => Err(ParseEnumError::new("urgency", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Service tier for an application or organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Tier {
    Free,
    Basic,
    Paid,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Free => "FREE",
            Tier::Basic => "BASIC",
            Tier::Paid => "PAID",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Tier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FREE" => Ok(Tier::Free),
            "BASIC" => Ok(Tier::Basic),
            "PAID" => Ok(Tier::Paid),
            other => Err(ParseEnumError::new("tier", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ProgrammingLanguage
// ---------------------------------------------------------------------------

/// Primary implementation language of a registered application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ProgrammingLanguage {
    Java,
    Kotlin,
    Scala,
    Rust,
    C,
    Cpp,
    CSharp,
    Go,
    Python,
    Ruby,
    Javascript,
    Other,
}

impl std::fmt::Display for ProgrammingLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProgrammingLanguage::Java => "JAVA",
            ProgrammingLanguage::Kotlin => "KOTLIN",
            ProgrammingLanguage::Scala => "SCALA",
            ProgrammingLanguage::Rust => "RUST",
            ProgrammingLanguage::C => "C",
            ProgrammingLanguage::Cpp => "CPP",
            ProgrammingLanguage::CSharp => "CSHARP",
            ProgrammingLanguage::Go => "GO",
            ProgrammingLanguage::Python => "PYTHON",
            ProgrammingLanguage::Ruby => "RUBY",
            ProgrammingLanguage::Javascript => "JAVASCRIPT",
            ProgrammingLanguage::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ProgrammingLanguage {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JAVA" => Ok(ProgrammingLanguage::Java),
            "KOTLIN" => Ok(ProgrammingLanguage::Kotlin),
            "SCALA" => Ok(ProgrammingLanguage::Scala),
            "RUST" => Ok(ProgrammingLanguage::Rust),
            "C" => Ok(ProgrammingLanguage::C),
            "CPP" => Ok(ProgrammingLanguage::Cpp),
            "CSHARP" => Ok(ProgrammingLanguage::CSharp),
            "GO" => Ok(ProgrammingLanguage::Go),
            "PYTHON" => Ok(ProgrammingLanguage::Python),
            "RUBY" => Ok(ProgrammingLanguage::Ruby),
            "JAVASCRIPT" => Ok(ProgrammingLanguage::Javascript),
            "OTHER" => Ok(ProgrammingLanguage::Other),
            other => Err(ParseEnumError::new("programming language", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Industry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Industry {
    Technology,
    Finance,
    Healthcare,
    Retail,
    Media,
    Education,
    Other,
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Industry::Technology => "TECHNOLOGY",
            Industry::Finance => "FINANCE",
            Industry::Healthcare => "HEALTHCARE",
            Industry::Retail => "RETAIL",
            Industry::Media => "MEDIA",
            Industry::Education => "EDUCATION",
            Industry::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Industry {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TECHNOLOGY" => Ok(Industry::Technology),
            "FINANCE" => Ok(Industry::Finance),
            "HEALTHCARE" => Ok(Industry::Healthcare),
            "RETAIL" => Ok(Industry::Retail),
            "MEDIA" => Ok(Industry::Media),
            "EDUCATION" => Ok(Industry::Education),
            "OTHER" => Ok(Industry::Other),
            other => Err(ParseEnumError::new("industry", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// ImageType
// ---------------------------------------------------------------------------

/// Encoding of a stored image blob.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ImageType {
    Jpeg,
    Png,
    Gif,
}

impl std::fmt::Display for ImageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImageType::Jpeg => "JPEG",
            ImageType::Png => "PNG",
            ImageType::Gif => "GIF",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ImageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JPEG" => Ok(ImageType::Jpeg),
            "PNG" => Ok(ImageType::Png),
            "GIF" => Ok(ImageType::Gif),
            other => Err(ParseEnumError::new("image type", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// TokenType / TokenStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TokenType {
    Application,
    User,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenType::Application => "APPLICATION",
            TokenType::User => "USER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TokenType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "APPLICATION" => Ok(TokenType::Application),
            "USER" => Ok(TokenType::User),
            other => Err(ParseEnumError::new("token type", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TokenStatus {
    Active,
    Expired,
}

impl std::fmt::Display for TokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenStatus::Active => "ACTIVE",
            TokenStatus::Expired => "EXPIRED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TokenStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(TokenStatus::Active),
            "EXPIRED" => Ok(TokenStatus::Expired),
            other => Err(ParseEnumError::new("token status", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// DevicePlatform
// ---------------------------------------------------------------------------

/// Platform of a registered mobile device.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DevicePlatform {
    Ios,
    Android,
    Web,
}

impl std::fmt::Display for DevicePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DevicePlatform::Ios => "IOS",
            DevicePlatform::Android => "ANDROID",
            DevicePlatform::Web => "WEB",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for DevicePlatform {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IOS" => Ok(DevicePlatform::Ios),
            "ANDROID" => Ok(DevicePlatform::Android),
            "WEB" => Ok(DevicePlatform::Web),
            other => Err(ParseEnumError::new("device platform", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trip() {
        for role in [
            Role::Developer,
            Role::Operations,
            Role::QualityAssurance,
            Role::Manager,
            Role::Owner,
        ] {
            assert_eq!(Role::from_str(&role.to_string()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_text_is_an_error() {
        let err = Urgency::from_str("SHOUTING").unwrap_err();
        assert_eq!(err.kind, "urgency");
        assert_eq!(err.value, "SHOUTING");
    }

    #[test]
    fn urgency_round_trip() {
        for u in [Urgency::Low, Urgency::Medium, Urgency::High] {
            assert_eq!(Urgency::from_str(&u.to_string()).unwrap(), u);
        }
    }

    #[test]
    fn token_status_round_trip() {
        for s in [TokenStatus::Active, TokenStatus::Expired] {
            assert_eq!(TokenStatus::from_str(&s.to_string()).unwrap(), s);
        }
    }
}
