//! Idempotent DDL for the template and blob tables.

pub(crate) const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS email_templates (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        title TEXT,
        content TEXT,
        image_id TEXT,
        footer TEXT,
        html TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_email_templates_latest
        ON email_templates (created_at DESC, seq DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blob_files (
        id UUID PRIMARY KEY,
        filename TEXT NOT NULL,
        content_type TEXT NOT NULL,
        length BIGINT NOT NULL,
        chunk_size INTEGER NOT NULL,
        uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS blob_chunks (
        file_id UUID NOT NULL REFERENCES blob_files (id) ON DELETE CASCADE,
        n INTEGER NOT NULL,
        data BYTEA NOT NULL,
        PRIMARY KEY (file_id, n)
    )
    "#,
];
