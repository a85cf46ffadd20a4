//! Table definitions, applied on every startup.
//!
//! `user_tellls` and `community_tellls` hold the ordered telll lists of users
//! and communities. A telll's children are the rows whose `parent_id` points
//! at it.

pub(crate) const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id            BLOB PRIMARY KEY NOT NULL,
        username      TEXT NOT NULL UNIQUE,
        name          TEXT NOT NULL,
        image         TEXT,
        bio           TEXT,
        onboarded     BOOLEAN NOT NULL DEFAULT 0,
        password_hash TEXT NOT NULL,
        created_at    TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS communities (
        id         BLOB PRIMARY KEY NOT NULL,
        slug       TEXT NOT NULL UNIQUE,
        name       TEXT NOT NULL,
        image      TEXT,
        bio        TEXT,
        created_by BLOB NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tellls (
        id           BLOB PRIMARY KEY NOT NULL,
        text         TEXT NOT NULL,
        author_id    BLOB NOT NULL,
        community_id BLOB,
        parent_id    BLOB,
        created_at   TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS tellls_parent_id ON tellls (parent_id)",
    "CREATE TABLE IF NOT EXISTS user_tellls (
        seq      INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id  BLOB NOT NULL,
        telll_id BLOB NOT NULL,
        UNIQUE (user_id, telll_id)
    )",
    "CREATE TABLE IF NOT EXISTS community_tellls (
        seq          INTEGER PRIMARY KEY AUTOINCREMENT,
        community_id BLOB NOT NULL,
        telll_id     BLOB NOT NULL,
        UNIQUE (community_id, telll_id)
    )",
];
