use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use super::{fmt_ts, json_col, opt_ts_col, ts_col, uuid_col, Database};
use crate::error::ValidationError;
use crate::models::*;
use crate::names::resolve_display_name;

const CONVERSATION_COLUMNS: &str =
    "id, subject, participant_ids, participant_names, created_at, last_message_at";
const MESSAGE_COLUMNS: &str = "id, conversation_id, sender_id, body, attachment_url, created_at";

fn row_to_conversation(row: &Row) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: uuid_col(row, "id")?,
        subject: row.get("subject")?,
        participant_ids: json_col(row, "participant_ids")?,
        participant_names: json_col(row, "participant_names")?,
        created_at: ts_col(row, "created_at")?,
        last_message_at: opt_ts_col(row, "last_message_at")?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: uuid_col(row, "id")?,
        conversation_id: uuid_col(row, "conversation_id")?,
        sender_id: uuid_col(row, "sender_id")?,
        body: row.get("body")?,
        attachment_url: row.get("attachment_url")?,
        created_at: ts_col(row, "created_at")?,
    })
}

impl Database {
    /// Opens a conversation, capturing each participant's current display name.
    pub fn create_conversation(
        &self,
        input: CreateConversationInput,
    ) -> Result<Conversation, ValidationError> {
        let mut participant_ids = Vec::new();
        for id in input.participant_ids {
            if !participant_ids.contains(&id) {
                participant_ids.push(id);
            }
        }
        if participant_ids.len() < 2 {
            return Err(ValidationError::TooFewParticipants);
        }

        let mut participant_names = BTreeMap::new();
        for id in &participant_ids {
            let participant = self.require_participant(*id, None)?;
            participant_names.insert(*id, resolve_display_name(&participant));
        }

        let conversation = Conversation {
            id: Uuid::new_v4(),
            subject: input.subject,
            participant_ids,
            participant_names,
            created_at: Utc::now(),
            last_message_at: None,
        };

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO conversations ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                CONVERSATION_COLUMNS
            ),
            params![
                conversation.id.to_string(),
                conversation.subject,
                serde_json::to_string(&conversation.participant_ids)?,
                serde_json::to_string(&conversation.participant_names)?,
                fmt_ts(conversation.created_at),
                conversation.last_message_at.map(fmt_ts),
            ],
        )?;
        Ok(conversation)
    }

    pub fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>> {
        let conn = self.conn()?;
        let conversation = conn
            .query_row(
                &format!("SELECT {} FROM conversations WHERE id = ?1", CONVERSATION_COLUMNS),
                params![id.to_string()],
                row_to_conversation,
            )
            .optional()?;
        Ok(conversation)
    }

    /// Conversations a participant belongs to, most recently active first,
    /// with that participant's unread count.
    pub fn list_conversations_for(&self, participant_id: Uuid) -> Result<Vec<ConversationOverview>> {
        let conversations = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM conversations
                 WHERE EXISTS (SELECT 1 FROM json_each(participant_ids) WHERE value = ?1)
                 ORDER BY COALESCE(last_message_at, created_at) DESC",
                CONVERSATION_COLUMNS
            ))?;
            let rows = stmt.query_map(params![participant_id.to_string()], row_to_conversation)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        conversations
            .into_iter()
            .map(|conversation| -> Result<ConversationOverview> {
                let unread_count = self.unread_count(conversation.id, participant_id)?;
                Ok(ConversationOverview {
                    conversation,
                    unread_count,
                })
            })
            .collect()
    }

    pub fn send_message(
        &self,
        conversation_id: Uuid,
        input: SendMessageInput,
    ) -> Result<Option<Message>, ValidationError> {
        if input.body.trim().is_empty() && input.attachment_url.is_none() {
            return Err(ValidationError::Blank("body"));
        }
        let Some(conversation) = self.get_conversation(conversation_id)? else {
            return Ok(None);
        };
        if !conversation.has_participant(input.sender_id) {
            return Err(ValidationError::NotAConversationMember(input.sender_id));
        }

        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id: input.sender_id,
            body: input.body,
            attachment_url: input.attachment_url,
            created_at: Utc::now(),
        };

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO messages ({}, seq) VALUES (?1, ?2, ?3, ?4, ?5, ?6,
                 (SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE conversation_id = ?2))",
                MESSAGE_COLUMNS
            ),
            params![
                message.id.to_string(),
                message.conversation_id.to_string(),
                message.sender_id.to_string(),
                message.body,
                message.attachment_url,
                fmt_ts(message.created_at),
            ],
        )?;
        tx.execute(
            "UPDATE conversations SET last_message_at = ?2 WHERE id = ?1",
            params![conversation_id.to_string(), fmt_ts(message.created_at)],
        )?;
        tx.commit()?;

        Ok(Some(message))
    }

    /// Messages in insertion order.
    pub fn list_messages(&self, conversation_id: Uuid) -> Result<Vec<Message>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM messages WHERE conversation_id = ?1 ORDER BY seq",
            MESSAGE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![conversation_id.to_string()], row_to_message)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn unread_count(&self, conversation_id: Uuid, reader_id: Uuid) -> Result<u32> {
        let conn = self.conn()?;
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM messages m
             WHERE m.conversation_id = ?1 AND m.sender_id != ?2
               AND NOT EXISTS (
                   SELECT 1 FROM message_reads r
                   WHERE r.message_id = m.id AND r.reader_id = ?2
               )",
            params![conversation_id.to_string(), reader_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Marks every message in the conversation as read by `reader_id`.
    /// Returns how many receipts were newly recorded, or `None` if the
    /// conversation does not exist.
    pub fn mark_conversation_read(
        &self,
        conversation_id: Uuid,
        reader_id: Uuid,
    ) -> Result<Option<usize>, ValidationError> {
        let Some(conversation) = self.get_conversation(conversation_id)? else {
            return Ok(None);
        };
        if !conversation.has_participant(reader_id) {
            return Err(ValidationError::NotAConversationMember(reader_id));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO message_reads (message_id, reader_id, read_at)
             SELECT id, ?2, ?3 FROM messages
             WHERE conversation_id = ?1 AND sender_id != ?2",
            params![
                conversation_id.to_string(),
                reader_id.to_string(),
                fmt_ts(Utc::now()),
            ],
        )?;
        Ok(Some(inserted))
    }
}
