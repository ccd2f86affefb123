

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::analyzer::{AnalyzeRequest, AnalyzeResponse, RefineRequest, SymptomAnalyzer};
use crate::core::config::MediqueryConfig;
use crate::core::error::MediqueryError;
use crate::toolkit::booking::BookingLedger;
use crate::toolkit::knowledge::FollowUpAnswerSet;
use crate::toolkit::matching::answer_sheet;


#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AnalyzeSymptomsParams {
    #[schemars(description = "Free-text description of the symptoms")]
    pub symptoms: String,
    #[schemars(description = "Patient latitude in degrees")]
    pub latitude: Option<f64>,
    #[schemars(description = "Patient longitude in degrees")]
    pub longitude: Option<f64>,
    #[schemars(description = "Search radius for providers in km (default: 20)")]
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct SubmitFollowupParams {
    #[schemars(description = "The symptom text sent to analyze_symptoms")]
    pub original_symptoms: String,
    #[schemars(description = "Answers keyed by the exact question text")]
    pub follow_up_answers: FollowUpAnswerSet,
    #[schemars(description = "Patient latitude in degrees")]
    pub latitude: Option<f64>,
    #[schemars(description = "Patient longitude in degrees")]
    pub longitude: Option<f64>,
    #[schemars(description = "Search radius for providers in km (default: 20)")]
    pub max_distance_km: Option<f64>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct BookAppointmentParams {
    #[schemars(description = "Slot identifier from a provider's available_slots")]
    pub slot_id: i64,
    #[schemars(description = "Patient identifier")]
    pub patient_id: i64,
    #[schemars(description = "Optional patient display name")]
    pub patient_name: Option<String>,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct CancelAppointmentParams {
    #[schemars(description = "Booking identifier returned by book_appointment")]
    pub booking_id: String,
    #[schemars(description = "Patient identifier")]
    pub patient_id: i64,
}

#[derive(Debug, Deserialize, rmcp::schemars::JsonSchema)]
pub struct AppointmentHistoryParams {
    #[schemars(description = "Patient identifier")]
    pub patient_id: i64,
}


#[derive(Clone)]
pub struct MediqueryMcpServer {
    analyzer: Arc<SymptomAnalyzer>,
    bookings: Arc<BookingLedger>,
    tool_router: ToolRouter<Self>,
}

impl MediqueryMcpServer {
    pub fn new(analyzer: SymptomAnalyzer) -> Self {
        let bookings = BookingLedger::new(analyzer.providers());
        Self {
            analyzer: Arc::new(analyzer),
            bookings: Arc::new(bookings),
            tool_router: Self::tool_router(),
        }
    }


    fn convert_error(err: MediqueryError) -> McpError {
        if err.is_client_error() {
            McpError::invalid_params(err.to_string(), None)
        } else {
            warn!("Request failed: {}", err);
            McpError::internal_error(err.to_string(), None)
        }
    }


    fn result_to_json<T: Serialize>(result: T) -> Result<String, McpError> {
        serde_json::to_string_pretty(&result)
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    /// Adds the deduplicated follow-up sheet next to the matches.
    fn analyze_payload(response: &AnalyzeResponse) -> serde_json::Value {
        match response {
            AnalyzeResponse::Matches { matches } => {
                let pending_questions = answer_sheet(matches.iter().map(|m| {
                    (m.result.disease.as_str(), m.result.follow_up_questions.as_slice())
                }));
                json!({
                    "matches": matches,
                    "pending_questions": pending_questions,
                })
            }
            AnalyzeResponse::NoMatch { message } => json!({ "message": message }),
        }
    }

    fn success<T: Serialize>(result: T) -> Result<CallToolResult, McpError> {
        let json = Self::result_to_json(result)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_router]
impl MediqueryMcpServer {

    #[tool(description = "Match free-text symptoms to the top 3 likely diseases. Returns: {matches: [{disease, confidence, matched_symptoms, specialist, requires_urgent_care, follow_up_questions, score_breakdown, doctors}], pending_questions: [{question, diseases}]} or {message}")]
    async fn analyze_symptoms(
        &self,
        Parameters(params): Parameters<AnalyzeSymptomsParams>,
    ) -> Result<CallToolResult, McpError> {
        let preview: String = params.symptoms.chars().take(50).collect();
        info!("Analyzing symptoms: '{}'", preview);

        let response = self
            .analyzer
            .analyze(AnalyzeRequest {
                symptoms: Some(params.symptoms),
                latitude: params.latitude,
                longitude: params.longitude,
                max_distance_km: params.max_distance_km,
            })
            .await
            .map_err(Self::convert_error)?;

        match &response {
            AnalyzeResponse::Matches { matches } => info!("Returning {} matches", matches.len()),
            AnalyzeResponse::NoMatch { .. } => info!("No matching disease"),
        }

        Self::success(Self::analyze_payload(&response))
    }


    #[tool(description = "Rescore the original symptoms with answers to the follow-up questions. Answers are keyed by question text; 'yes' confirms a yes/no question. Returns: {refined_matches: [...]}")]
    async fn submit_followup(
        &self,
        Parameters(params): Parameters<SubmitFollowupParams>,
    ) -> Result<CallToolResult, McpError> {
        info!("Refining with {} answers", params.follow_up_answers.len());

        let response = self
            .analyzer
            .refine(RefineRequest {
                original_symptoms: Some(params.original_symptoms),
                follow_up_answers: Some(params.follow_up_answers),
                latitude: params.latitude,
                longitude: params.longitude,
                max_distance_km: params.max_distance_km,
            })
            .await
            .map_err(Self::convert_error)?;

        Self::success(&response)
    }


    #[tool(description = "List every disease profile the matcher knows about. Returns: [{name, specialist, urgent_care_eligible, symptoms}]")]
    async fn list_diseases(&self) -> Result<CallToolResult, McpError> {
        let catalog = self
            .analyzer
            .disease_catalog()
            .await
            .map_err(Self::convert_error)?;

        let listing: Vec<_> = catalog
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "specialist": p.specialist,
                    "urgent_care_eligible": p.urgent_care_eligible,
                    "symptoms": p.symptoms.iter().map(|s| &s.name).collect::<Vec<_>>(),
                })
            })
            .collect();

        Self::success(&listing)
    }


    #[tool(description = "Book an appointment slot. Returns the booking record with booking_id")]
    async fn book_appointment(
        &self,
        Parameters(params): Parameters<BookAppointmentParams>,
    ) -> Result<CallToolResult, McpError> {
        let booking = self
            .bookings
            .book(params.slot_id, params.patient_id, params.patient_name.as_deref())
            .await
            .map_err(Self::convert_error)?;

        Self::success(&booking)
    }


    #[tool(description = "Cancel a confirmed booking. Returns the updated booking record")]
    async fn cancel_appointment(
        &self,
        Parameters(params): Parameters<CancelAppointmentParams>,
    ) -> Result<CallToolResult, McpError> {
        let booking_id = Uuid::parse_str(&params.booking_id).map_err(|e| {
            McpError::invalid_params(format!("Invalid booking_id: {}", e), None)
        })?;

        let booking = self
            .bookings
            .cancel(booking_id, params.patient_id)
            .map_err(Self::convert_error)?;

        Self::success(&booking)
    }


    #[tool(description = "List a patient's bookings, newest first")]
    async fn appointment_history(
        &self,
        Parameters(params): Parameters<AppointmentHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let history = self.bookings.history(params.patient_id);
        Self::success(&history)
    }
}


#[tool_handler]
impl ServerHandler for MediqueryMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "mediquery".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Symptom triage: call analyze_symptoms with free text, answer the returned \
                 follow_up_questions through submit_followup, then book_appointment with a slot \
                 from the suggested doctors. Results are not a medical diagnosis."
                    .to_string(),
            ),
        }
    }


    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            resources: vec![
                RawResource::new("config://mediquery", "mediquery-config".to_string())
                    .no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        ReadResourceRequestParam { uri }: ReadResourceRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match uri.as_str() {
            "config://mediquery" => {
                let config = self.analyzer.config();
                let content = Self::result_to_json(json!({
                    "version": env!("CARGO_PKG_VERSION"),
                    "limits": {
                        "max_distance_km": config.max_distance_km,
                        "top_diseases": config.top_diseases,
                        "top_providers": config.top_providers,
                        "max_slots": config.max_slots,
                    },
                    "emergency_keywords": config.emergency_keywords,
                    "tools": [
                        "analyze_symptoms",
                        "submit_followup",
                        "list_diseases",
                        "book_appointment",
                        "cancel_appointment",
                        "appointment_history",
                    ],
                }))?;

                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(content, uri)],
                })
            }
            _ => Err(McpError::resource_not_found(
                format!("Unknown resource: {}", uri),
                Some(json!({ "uri": uri })),
            )),
        }
    }
}


pub async fn run_server() -> anyhow::Result<()> {
    info!("Initializing mediquery MCP server...");

    let config = MediqueryConfig::from_env()?;
    let analyzer = SymptomAnalyzer::from_config(config).await?;

    let config = analyzer.config();
    info!(
        "Ready: radius={}km, top {} diseases, top {} providers",
        config.max_distance_km, config.top_diseases, config.top_providers
    );

    let server = MediqueryMcpServer::new(analyzer);
    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}
