pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS participants (
    id TEXT PRIMARY KEY,
    role TEXT NOT NULL CHECK (role IN ('intended_parent', 'surrogate', 'admin')),
    status TEXT NOT NULL DEFAULT 'lead' CHECK (status IN ('lead', 'applicant', 'active', 'matched', 'inactive')),
    email TEXT NOT NULL,
    first_name TEXT,
    last_name TEXT,
    display_name TEXT,
    phone TEXT,
    form_data JSON NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS matches (
    id TEXT PRIMARY KEY,
    intended_parent_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    surrogate_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    status TEXT NOT NULL DEFAULT 'proposed' CHECK (status IN ('proposed', 'under_review', 'presented', 'accepted', 'declined', 'active', 'on_hold', 'cancelled')),
    ip_accepted INTEGER NOT NULL DEFAULT 0,
    ip_declined INTEGER NOT NULL DEFAULT 0,
    surrogate_accepted INTEGER NOT NULL DEFAULT 0,
    surrogate_declined INTEGER NOT NULL DEFAULT 0,
    score REAL,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS journeys (
    id TEXT PRIMARY KEY,
    track TEXT NOT NULL CHECK (track IN ('case', 'milestone')),
    intended_parent_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    surrogate_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    match_id TEXT REFERENCES matches(id) ON DELETE SET NULL,
    current_stage TEXT NOT NULL,
    notes TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS stage_history (
    id TEXT PRIMARY KEY,
    journey_id TEXT NOT NULL REFERENCES journeys(id) ON DELETE CASCADE,
    stage TEXT NOT NULL,
    completed_at TEXT NOT NULL,
    completed_by TEXT NOT NULL,
    notes TEXT,
    seq INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    assignee_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT,
    due_date TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    subject TEXT,
    participant_ids JSON NOT NULL,
    participant_names JSON NOT NULL,
    created_at TEXT NOT NULL,
    last_message_at TEXT
);

CREATE TABLE IF NOT EXISTS messages (
    id TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    sender_id TEXT NOT NULL,
    body TEXT NOT NULL,
    attachment_url TEXT,
    created_at TEXT NOT NULL,
    seq INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS message_reads (
    message_id TEXT NOT NULL REFERENCES messages(id) ON DELETE CASCADE,
    reader_id TEXT NOT NULL,
    read_at TEXT NOT NULL,
    PRIMARY KEY (message_id, reader_id)
);

CREATE TABLE IF NOT EXISTS appointments (
    id TEXT PRIMARY KEY,
    participant_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    journey_id TEXT REFERENCES journeys(id) ON DELETE SET NULL,
    title TEXT NOT NULL,
    scheduled_at TEXT NOT NULL,
    location TEXT,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'completed', 'cancelled')),
    notes TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS ledger_entries (
    id TEXT PRIMARY KEY,
    journey_id TEXT REFERENCES journeys(id) ON DELETE SET NULL,
    kind TEXT NOT NULL CHECK (kind IN ('revenue', 'expense')),
    category TEXT NOT NULL,
    amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
    description TEXT,
    occurred_on TEXT NOT NULL,
    recorded_by TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS medical_screenings (
    id TEXT PRIMARY KEY,
    surrogate_id TEXT NOT NULL REFERENCES participants(id) ON DELETE CASCADE,
    screening_type TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'cleared', 'rejected')),
    result_notes TEXT,
    reviewed_by TEXT,
    reviewed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_participants_role ON participants(role);
CREATE INDEX IF NOT EXISTS idx_matches_ip ON matches(intended_parent_id);
CREATE INDEX IF NOT EXISTS idx_matches_surrogate ON matches(surrogate_id);
CREATE INDEX IF NOT EXISTS idx_journeys_ip ON journeys(intended_parent_id);
CREATE INDEX IF NOT EXISTS idx_journeys_surrogate ON journeys(surrogate_id);
CREATE INDEX IF NOT EXISTS idx_history_journey ON stage_history(journey_id, seq);
CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assignee_id);
CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id, seq);
CREATE INDEX IF NOT EXISTS idx_appointments_participant ON appointments(participant_id);
CREATE INDEX IF NOT EXISTS idx_ledger_journey ON ledger_entries(journey_id);
CREATE INDEX IF NOT EXISTS idx_screenings_surrogate ON medical_screenings(surrogate_id);
"#;
