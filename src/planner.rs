//! The three-step prompt chain behind a meal plan consultation.
//!
//! A consultation is one call to the nutritionist model for the plan itself,
//! followed by two calls to the secondary model that each embed that plan.
//! Any failure aborts the chain; there are no partial results.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::ai::common::{GenerationRequest, TextGenerator};
use crate::ai::config::{
    AiConfig, DEFAULT_CLAUDE_MAX_TOKENS, DEFAULT_CLAUDE_TEMPERATURE, DEFAULT_GEMINI_MAX_TOKENS,
};
use crate::ai::error::ProviderError;
use crate::ai::prompts;
use crate::ai::{ClaudeClient, GeminiClient};
use crate::messages;

/// Upper bound accepted for any glucose reading, in mg/dL.
pub const MAX_READING: i64 = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be between 0 and 500 mg/dL, got {value}")]
    ReadingOutOfRange { field: &'static str, value: i64 },
    #[error("{field} must be a whole number")]
    NotANumber { field: &'static str },
}

/// A blood glucose reading in mg/dL, always within `0..=500`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct GlucoseReading(u16);

impl GlucoseReading {
    pub fn new(value: i64) -> Option<Self> {
        if (0..=MAX_READING).contains(&value) {
            Some(Self(value as u16))
        } else {
            None
        }
    }

    /// Validate a reading coming from a named input field.
    pub fn for_field(field: &'static str, value: i64) -> Result<Self, ValidationError> {
        Self::new(value).ok_or(ValidationError::ReadingOutOfRange { field, value })
    }

    /// Parse a raw form value such as `"120"`.
    pub fn parse_field(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotANumber { field })?;
        Self::for_field(field, value)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for GlucoseReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The user's readings and dietary preferences for one consultation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsultationRequest {
    pub fasting_sugar: GlucoseReading,
    pub pre_meal_sugar: GlucoseReading,
    pub post_meal_sugar: GlucoseReading,
    pub preferences: String,
}

impl ConsultationRequest {
    pub fn from_values(
        fasting_sugar: i64,
        pre_meal_sugar: i64,
        post_meal_sugar: i64,
        preferences: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            fasting_sugar: GlucoseReading::for_field(messages::FASTING_LABEL, fasting_sugar)?,
            pre_meal_sugar: GlucoseReading::for_field(messages::PRE_MEAL_LABEL, pre_meal_sugar)?,
            post_meal_sugar: GlucoseReading::for_field(messages::POST_MEAL_LABEL, post_meal_sugar)?,
            preferences: preferences.into(),
        })
    }
}

/// The three generated texts, each trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanResult {
    pub meal_plan: String,
    pub nutritional_info: String,
    pub expert_insights: String,
}

/// What gets shown after a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanOutcome {
    Ready(PlanResult),
    Failed {
        message: &'static str,
        placeholders: PlanResult,
    },
}

impl PlanOutcome {
    pub fn failed() -> Self {
        Self::Failed {
            message: messages::GENERATION_FAILED,
            placeholders: PlanResult {
                meal_plan: messages::MEAL_PLAN_ERROR.to_string(),
                nutritional_info: messages::NUTRITION_ERROR.to_string(),
                expert_insights: messages::INSIGHTS_ERROR.to_string(),
            },
        }
    }

    /// The three texts to render, real or placeholder.
    pub fn plan(&self) -> &PlanResult {
        match self {
            Self::Ready(plan) => plan,
            Self::Failed { placeholders, .. } => placeholders,
        }
    }
}

impl From<Result<PlanResult, ProviderError>> for PlanOutcome {
    fn from(result: Result<PlanResult, ProviderError>) -> Self {
        match result {
            Ok(plan) => Self::Ready(plan),
            Err(_) => Self::failed(),
        }
    }
}

/// Token limits and sampling settings for the chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerSettings {
    pub plan_max_tokens: u32,
    pub plan_temperature: f32,
    pub follow_up_max_tokens: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            plan_max_tokens: DEFAULT_CLAUDE_MAX_TOKENS,
            plan_temperature: DEFAULT_CLAUDE_TEMPERATURE,
            follow_up_max_tokens: DEFAULT_GEMINI_MAX_TOKENS,
        }
    }
}

/// Runs the prompt chain against two injected providers.
///
/// The first provider writes the meal plan; the second explains it twice.
/// Cloning is cheap and shares the underlying clients.
#[derive(Clone)]
pub struct Planner {
    planner: Arc<dyn TextGenerator>,
    reviewer: Arc<dyn TextGenerator>,
    settings: PlannerSettings,
}

impl Planner {
    pub fn new(planner: Arc<dyn TextGenerator>, reviewer: Arc<dyn TextGenerator>) -> Self {
        Self {
            planner,
            reviewer,
            settings: PlannerSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PlannerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build both provider clients from configuration.
    pub fn from_config(config: &AiConfig) -> Self {
        let claude = ClaudeClient::new(&config.claude_api_key, &config.claude_model)
            .with_base_url(&config.claude_api_url);
        let gemini = GeminiClient::new(&config.gemini_api_key, &config.gemini_model)
            .with_base_url(&config.gemini_api_url);
        Self::new(Arc::new(claude), Arc::new(gemini)).with_settings(PlannerSettings {
            plan_max_tokens: config.claude_max_tokens,
            plan_temperature: config.claude_temperature,
            follow_up_max_tokens: config.gemini_max_tokens,
        })
    }

    pub fn settings(&self) -> PlannerSettings {
        self.settings
    }

    /// Run the three calls in order and return the trimmed texts.
    #[instrument(level = "debug", skip_all)]
    pub async fn generate_plan(
        &self,
        request: &ConsultationRequest,
    ) -> Result<PlanResult, ProviderError> {
        let plan_request = GenerationRequest::new(
            prompts::meal_plan_prompt(request),
            self.settings.plan_max_tokens,
        )
        .with_system(prompts::NUTRITIONIST_SYSTEM_PROMPT)
        .with_temperature(self.settings.plan_temperature);
        let meal_plan = self.call(&*self.planner, &plan_request, "meal_plan").await?;

        let nutrition_request = GenerationRequest::new(
            prompts::nutrition_prompt(&meal_plan),
            self.settings.follow_up_max_tokens,
        );
        let nutritional_info = self
            .call(&*self.reviewer, &nutrition_request, "nutritional_info")
            .await?;

        let insights_request = GenerationRequest::new(
            prompts::insights_prompt(&meal_plan),
            self.settings.follow_up_max_tokens,
        );
        let expert_insights = self
            .call(&*self.reviewer, &insights_request, "expert_insights")
            .await?;

        info!("Generated meal plan");
        Ok(PlanResult {
            meal_plan,
            nutritional_info,
            expert_insights,
        })
    }

    /// Like [`Planner::generate_plan`] but collapses failures into placeholders.
    pub async fn consult(&self, request: &ConsultationRequest) -> PlanOutcome {
        self.generate_plan(request).await.into()
    }

    async fn call(
        &self,
        provider: &dyn TextGenerator,
        request: &GenerationRequest,
        step: &'static str,
    ) -> Result<String, ProviderError> {
        match provider.generate(request).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(ProviderError::EmptyResponse {
                        provider: provider.name(),
                    });
                }
                debug!(step, provider = provider.name(), len = text.len(), "Step done");
                Ok(text.to_string())
            }
            Err(err) => {
                error!(step, provider = err.provider(), error = %err, "Prompt chain aborted");
                Err(err)
            }
        }
    }
}
