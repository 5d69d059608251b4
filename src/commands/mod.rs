//! Request handlers shared by the CLI subcommands and the `serve` loop.
//!
//! Every handler takes the [`AppState`] by reference and returns a
//! serializable response. [`dispatch`] maps a JSON request envelope onto the
//! handlers and renders failures as [`ErrorResponse`]s.

pub mod ai;
pub mod analysis;
pub mod export;
pub mod lifecycle;
pub mod system;

use crate::ai::{Narrator, build_narrator};
use crate::analyser::lifecycle::SessionStore;
use crate::config::AppConfig;
use crate::error::{ErrorResponse, Result, SifterError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything a request handler needs: the session, the narrator and the
/// loaded configuration.
pub struct AppState {
    pub store: SessionStore,
    pub narrator: Box<dyn Narrator>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let narrator = build_narrator(&config.ai);
        Self::with_narrator(config, narrator)
    }

    pub fn with_narrator(config: AppConfig, narrator: Box<dyn Narrator>) -> Self {
        Self {
            store: SessionStore::new(config.engine.clone()),
            narrator,
            config,
        }
    }
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Upload(analysis::UploadParams),
    Profile,
    Clean(crate::analyser::logic::CleanRequest),
    Transform(crate::analyser::logic::TransformRequest),
    Filter(crate::analyser::logic::FilterRequest),
    PredictiveInsights,
    Visualizations,
    Export(export::ExportParams),
    Insights,
    NaturalQuery(ai::QueryParams),
    History,
}

impl Operation {
    /// Decodes an operation name and its parameters.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown operation or parameters
    /// that do not match it.
    pub fn parse(op: &str, params: Value) -> Result<Self> {
        let params = match params {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };
        let op = match op {
            "upload" => Self::Upload(serde_json::from_value(params)?),
            "profile" => Self::Profile,
            "clean" => Self::Clean(serde_json::from_value(params)?),
            "transform" => Self::Transform(serde_json::from_value(params)?),
            "filter" => Self::Filter(serde_json::from_value(params)?),
            "predictive-insights" => Self::PredictiveInsights,
            "3d-visualizations" => Self::Visualizations,
            "export" => Self::Export(serde_json::from_value(params)?),
            "insights" => Self::Insights,
            "natural-query" => Self::NaturalQuery(serde_json::from_value(params)?),
            "history" => Self::History,
            other => {
                return Err(SifterError::Validation(format!("Unknown operation '{other}'")));
            }
        };
        Ok(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::Profile => "profile",
            Self::Clean(_) => "clean",
            Self::Transform(_) => "transform",
            Self::Filter(_) => "filter",
            Self::PredictiveInsights => "predictive-insights",
            Self::Visualizations => "3d-visualizations",
            Self::Export(_) => "export",
            Self::Insights => "insights",
            Self::NaturalQuery(_) => "natural-query",
            Self::History => "history",
        }
    }
}

/// One line of the `serve` protocol.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    pub op: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl Response {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: &SifterError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(ErrorResponse::from(error)),
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Runs one operation against the state.
///
/// # Errors
///
/// Propagates the handler's error unchanged.
pub async fn execute(state: &AppState, operation: Operation) -> Result<Value> {
    match operation {
        Operation::Upload(params) => to_value(analysis::upload(state, params).await?),
        Operation::Profile => to_value(analysis::profile(state)?),
        Operation::Clean(request) => to_value(lifecycle::clean(state, request).await?),
        Operation::Transform(request) => to_value(lifecycle::transform(state, request).await?),
        Operation::Filter(request) => to_value(analysis::filter(state, request).await?),
        Operation::PredictiveInsights => to_value(analysis::predictive_insights(state).await?),
        Operation::Visualizations => to_value(analysis::visualizations(state).await?),
        Operation::Export(params) => to_value(export::export(state, params).await?),
        Operation::Insights => to_value(ai::insights(state).await?),
        Operation::NaturalQuery(params) => to_value(ai::natural_query(state, params).await?),
        Operation::History => to_value(lifecycle::history(state)?),
    }
}

/// Decodes and executes a request, never failing: errors become an
/// `ok: false` response carrying the error kind and message.
pub async fn dispatch(state: &AppState, request: Request) -> Response {
    let Request { id, op, params } = request;
    let outcome = match Operation::parse(&op, params) {
        Ok(operation) => {
            tracing::debug!(op = operation.name(), "Dispatching request");
            execute(state, operation).await
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => Response::success(id, result),
        Err(e) => {
            tracing::warn!(op = %op, kind = e.kind(), "Request failed: {}", e.message());
            Response::failure(id, &e)
        }
    }
}

/// Handles one raw protocol line.
pub async fn dispatch_line(state: &AppState, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(state, request).await,
        Err(e) => Response::failure(None, &SifterError::from(e)),
    }
}
