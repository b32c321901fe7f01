/// Idempotent DDL for the Postgres store, applied in order by `DatabaseManager::bootstrap_schema`.
pub const SCHEMA: &[&str] = &[
    r#"DO $$ BEGIN
        CREATE TYPE user_role AS ENUM ('CLIENT', 'AGENT', 'ADMIN');
    EXCEPTION WHEN duplicate_object THEN NULL;
    END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE case_status AS ENUM (
            'SUBMITTED', 'UNDER_REVIEW', 'DOCUMENTS_REQUIRED', 'PROCESSING',
            'APPROVED', 'REJECTED', 'CLOSED'
        );
    EXCEPTION WHEN duplicate_object THEN NULL;
    END $$"#,
    r#"DO $$ BEGIN
        CREATE TYPE notification_kind AS ENUM ('CASE_ASSIGNED', 'STATUS_CHANGED', 'NEW_MESSAGE');
    EXCEPTION WHEN duplicate_object THEN NULL;
    END $$"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone TEXT,
        nationality TEXT,
        role user_role NOT NULL DEFAULT 'CLIENT',
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_verified BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS cases (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        reference_number TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        case_type TEXT NOT NULL,
        description TEXT,
        status case_status NOT NULL DEFAULT 'SUBMITTED',
        client_id UUID NOT NULL REFERENCES users(id),
        agent_id UUID REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS cases_client_id_idx ON cases (client_id)",
    "CREATE INDEX IF NOT EXISTS cases_agent_id_idx ON cases (agent_id)",
    r#"CREATE TABLE IF NOT EXISTS status_history (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        case_id UUID NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
        status case_status NOT NULL,
        notes TEXT,
        changed_by UUID NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS status_history_case_id_idx ON status_history (case_id, created_at DESC)",
    r#"CREATE TABLE IF NOT EXISTS case_messages (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        case_id UUID NOT NULL REFERENCES cases(id) ON DELETE CASCADE,
        sender_id UUID NOT NULL REFERENCES users(id),
        body TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS case_messages_case_id_idx ON case_messages (case_id, created_at)",
    r#"CREATE TABLE IF NOT EXISTS notifications (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        kind notification_kind NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        case_id UUID REFERENCES cases(id) ON DELETE SET NULL,
        read_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS notifications_user_id_idx ON notifications (user_id, created_at DESC)",
    r#"CREATE TABLE IF NOT EXISTS audit_logs (
        id UUID PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        actor_id UUID NOT NULL REFERENCES users(id),
        action TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id UUID NOT NULL,
        details JSONB NOT NULL DEFAULT '{}'::jsonb,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )"#,
    "CREATE INDEX IF NOT EXISTS audit_logs_entity_id_idx ON audit_logs (entity_id, created_at DESC)",
    // Tie-breaker for rows sharing a timestamp; also added to stores created without it
    "ALTER TABLE cases ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL",
    "ALTER TABLE status_history ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL",
    "ALTER TABLE case_messages ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL",
    "ALTER TABLE notifications ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL",
    "ALTER TABLE audit_logs ADD COLUMN IF NOT EXISTS seq BIGSERIAL NOT NULL",
];
