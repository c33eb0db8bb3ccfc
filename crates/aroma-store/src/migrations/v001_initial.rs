//! v001 -- Initial schema creation.
//!
//! Creates the tables backing the repositories: `users`,
//! `applications`, `messages`, `organizations`, `tokens`, `media`,
//! `thumbnails`, `events`, `reactions`, `devices`, `credentials` and
//! `followers`.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Users
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    user_id          TEXT PRIMARY KEY NOT NULL,   -- UUID
    first_name       TEXT NOT NULL,
    middle_name      TEXT,
    last_name        TEXT NOT NULL,
    email            TEXT NOT NULL,
    roles            TEXT NOT NULL,               -- JSON array of enum text
    birthdate        TEXT,                        -- ISO-8601 / RFC-3339
    profile_image_id TEXT,                        -- UUID
    github_profile   TEXT,
    time_joined      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
CREATE INDEX IF NOT EXISTS idx_users_github ON users(github_profile);

-- ----------------------------------------------------------------
-- Applications
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS applications (
    application_id      TEXT PRIMARY KEY NOT NULL,  -- UUID
    name                TEXT NOT NULL,
    description         TEXT,
    organization_id     TEXT NOT NULL,              -- UUID
    language            TEXT,                       -- enum text
    tier                TEXT,                       -- enum text
    token_expiration    TEXT,
    icon_media_id       TEXT,                       -- UUID
    owners              TEXT NOT NULL,              -- JSON array of UUIDs
    total_messages_sent INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_applications_org ON applications(organization_id);

-- ----------------------------------------------------------------
-- Messages (composite key: application + message)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    application_id     TEXT NOT NULL,               -- UUID
    message_id         TEXT NOT NULL,               -- UUID
    title              TEXT NOT NULL,
    body               TEXT NOT NULL,
    urgency            TEXT,                        -- enum text
    time_created       TEXT NOT NULL,
    time_received      TEXT NOT NULL,
    hostname           TEXT NOT NULL,
    mac_address        TEXT NOT NULL,
    device_name        TEXT NOT NULL,
    time_of_expiration TEXT,

    PRIMARY KEY (application_id, message_id)
);

CREATE INDEX IF NOT EXISTS idx_messages_hostname ON messages(hostname);
CREATE INDEX IF NOT EXISTS idx_messages_title ON messages(title);

-- ----------------------------------------------------------------
-- Organizations
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS organizations (
    organization_id TEXT PRIMARY KEY NOT NULL,      -- UUID
    name            TEXT NOT NULL,
    description     TEXT,
    owners          TEXT NOT NULL,                  -- JSON array of UUIDs
    industry        TEXT,                           -- enum text
    tier            TEXT,                           -- enum text
    email           TEXT,
    github_profile  TEXT,
    website         TEXT,
    stock_symbol    TEXT
);

-- ----------------------------------------------------------------
-- Authentication tokens
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS tokens (
    token_id           TEXT PRIMARY KEY NOT NULL,   -- UUID
    owner_id           TEXT NOT NULL,               -- UUID
    organization_id    TEXT,                        -- UUID
    owner_name         TEXT,
    time_of_creation   TEXT NOT NULL,
    time_of_expiration TEXT NOT NULL,
    token_type         TEXT,                        -- enum text
    status             TEXT                         -- enum text
);

CREATE INDEX IF NOT EXISTS idx_tokens_owner ON tokens(owner_id);

-- ----------------------------------------------------------------
-- Media + thumbnail variants
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS media (
    media_id   TEXT PRIMARY KEY NOT NULL,           -- UUID
    image_type TEXT,                                -- enum text
    data       BLOB NOT NULL
);

CREATE TABLE IF NOT EXISTS thumbnails (
    media_id   TEXT NOT NULL,                       -- UUID
    width      INTEGER NOT NULL,
    height     INTEGER NOT NULL,
    image_type TEXT,
    data       BLOB NOT NULL,

    PRIMARY KEY (media_id, width, height)
);

-- ----------------------------------------------------------------
-- Activity events (structural columns + JSON detail blob)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS events (
    event_id       TEXT PRIMARY KEY NOT NULL,       -- UUID
    actor_id       TEXT NOT NULL,                   -- UUID
    application_id TEXT NOT NULL,                   -- UUID
    recipient_id   TEXT NOT NULL,                   -- UUID
    timestamp      TEXT NOT NULL,
    event_type     TEXT,                            -- enum text
    detail         TEXT NOT NULL                    -- JSON blob
);

CREATE INDEX IF NOT EXISTS idx_events_recipient ON events(recipient_id);

-- ----------------------------------------------------------------
-- Reactions (one row per owner, JSON array column)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS reactions (
    owner_id  TEXT PRIMARY KEY NOT NULL,            -- user or application UUID
    reactions TEXT NOT NULL                         -- JSON array
);

-- ----------------------------------------------------------------
-- Mobile devices (one row per user, JSON array column)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS devices (
    user_id TEXT PRIMARY KEY NOT NULL,              -- UUID
    devices TEXT NOT NULL                           -- JSON array
);

-- ----------------------------------------------------------------
-- Credentials
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS credentials (
    user_id            TEXT PRIMARY KEY NOT NULL,   -- UUID
    encrypted_password TEXT NOT NULL
);

-- ----------------------------------------------------------------
-- Followers (pure association)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS followers (
    user_id        TEXT NOT NULL,                   -- UUID
    application_id TEXT NOT NULL,                   -- UUID
    time_of_follow TEXT NOT NULL,

    PRIMARY KEY (user_id, application_id)
);

CREATE INDEX IF NOT EXISTS idx_followers_application ON followers(application_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
