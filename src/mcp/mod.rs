use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;
use nestwell_core::{ProgressionError, StageTimeline};

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetJourneyTimelineRequest {
    #[schemars(description = "The journey ID")]
    pub journey_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AdvanceJourneyRequest {
    #[schemars(description = "The journey ID to move forward")]
    pub journey_id: String,
    #[schemars(description = "ID of the admin performing the change")]
    pub admin_id: String,
    #[schemars(description = "Optional target stage (snake_case); defaults to the next stage")]
    #[serde(default)]
    pub target_stage: Option<String>,
    #[schemars(description = "Notes recorded against the stage being completed")]
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompleteTaskRequest {
    #[schemars(description = "The task ID to mark as complete")]
    pub task_id: String,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            tool_router: Self::tool_router(),
        }
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    fn timeline(&self, journey_id: Uuid) -> Result<StageTimeline, McpError> {
        self.db
            .get_journey_timeline(journey_id)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?
            .ok_or_else(|| McpError::invalid_params("Journey not found", None))
    }

    fn advance(&self, req: AdvanceJourneyRequest) -> Result<Journey, McpError> {
        let journey_id = Self::parse_uuid(&req.journey_id)?;
        let admin_id = Self::parse_uuid(&req.admin_id)?;
        let target_stage = match req.target_stage.as_deref() {
            Some(s) => Some(
                Stage::from_str(s)
                    .ok_or_else(|| McpError::invalid_params(format!("Unknown stage: {}", s), None))?,
            ),
            None => None,
        };

        let input = AdvanceJourneyInput {
            target_stage,
            notes: req.notes,
        };
        self.db
            .advance_journey(journey_id, &input, admin_id)
            .map_err(|e| match e {
                ProgressionError::Storage(inner) => McpError::internal_error(inner.to_string(), None),
                other => McpError::invalid_params(other.to_string(), None),
            })
    }

    fn overdue(&self) -> Result<Vec<OverdueTask>, McpError> {
        self.db
            .list_overdue_with_assignees(chrono::Utc::now())
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "Get the stage timeline of a surrogacy journey, with completed, current and upcoming stages")]
    async fn get_journey_timeline(
        &self,
        params: Parameters<GetJourneyTimelineRequest>,
    ) -> Result<CallToolResult, McpError> {
        let journey_id = Self::parse_uuid(&params.0.journey_id)?;
        Self::to_json(&self.timeline(journey_id)?)
    }

    #[tool(description = "Move a journey to its next stage (or a later target stage), recording who completed the current one")]
    async fn advance_journey(
        &self,
        params: Parameters<AdvanceJourneyRequest>,
    ) -> Result<CallToolResult, McpError> {
        let journey = self.advance(params.0)?;
        Self::to_json(&StageTimeline::build(&journey))
    }

    #[tool(description = "List open tasks whose due date has passed")]
    async fn list_overdue_tasks(&self) -> Result<CallToolResult, McpError> {
        Self::to_json(&self.overdue()?)
    }

    #[tool(description = "Mark a task as complete")]
    async fn complete_task(
        &self,
        params: Parameters<CompleteTaskRequest>,
    ) -> Result<CallToolResult, McpError> {
        let task_id = Self::parse_uuid(&params.0.task_id)?;

        let updated = self
            .db
            .update_task(
                task_id,
                UpdateTaskInput {
                    is_completed: Some(true),
                    ..Default::default()
                },
            )
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        if updated.is_none() {
            return Err(McpError::invalid_params("Task not found", None));
        }

        Ok(CallToolResult::success(vec![Content::text("Task marked as complete")]))
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Nestwell MCP server for surrogacy journey administration".into()),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (McpServer, Journey) {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        let mk = |role, email: &str| {
            db.create_participant(CreateParticipantInput {
                role,
                status: None,
                email: email.into(),
                first_name: None,
                last_name: None,
                display_name: None,
                phone: None,
                form_data: None,
            })
            .unwrap()
        };
        let ip = mk(ParticipantRole::IntendedParent, "ip@example.com");
        let gc = mk(ParticipantRole::Surrogate, "gc@example.com");
        let journey = db
            .create_journey(CreateJourneyInput {
                track: JourneyTrack::Case,
                intended_parent_id: ip.id,
                surrogate_id: gc.id,
                match_id: None,
                current_stage: None,
                notes: None,
            })
            .unwrap();
        (McpServer::new(db), journey)
    }

    #[test]
    fn advance_moves_to_requested_stage() {
        let (server, journey) = seeded();
        let moved = server
            .advance(AdvanceJourneyRequest {
                journey_id: journey.id.to_string(),
                admin_id: Uuid::new_v4().to_string(),
                target_stage: Some("legal".into()),
                notes: None,
            })
            .unwrap();
        assert_eq!(moved.current_stage, Stage::Legal);
        assert_eq!(moved.stage_history.len(), 1);
    }

    #[test]
    fn advance_rejects_unknown_stage_name() {
        let (server, journey) = seeded();
        let result = server.advance(AdvanceJourneyRequest {
            journey_id: journey.id.to_string(),
            admin_id: Uuid::new_v4().to_string(),
            target_stage: Some("orbit".into()),
            notes: None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn timeline_tool_returns_json() {
        let (server, journey) = seeded();
        let result = tokio_test::block_on(server.get_journey_timeline(Parameters(
            GetJourneyTimelineRequest {
                journey_id: journey.id.to_string(),
            },
        )));
        assert!(result.is_ok());
        assert_eq!(server.timeline(journey.id).unwrap().percent_complete, 16);
    }

    #[test]
    fn overdue_is_empty_without_tasks() {
        let (server, _) = seeded();
        assert!(server.overdue().unwrap().is_empty());
    }
}
