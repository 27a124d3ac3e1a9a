//! Turns a region into a folklore legend through a generative text model.
//!
//! Every failure (missing credential, transport, malformed output) collapses
//! into the same fixed fallback legend; the cause is only logged.

use crate::Story;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use thiserror::Error;

pub const FALLBACK_TITLE: &str = "El Silencio de la Pampa";

pub const FALLBACK_CONTENT: &str = "Las voces de los antiguos espíritus callan hoy. \
Intenta conectar de nuevo más tarde para escuchar sus susurros...";

pub const SYSTEM_INSTRUCTION: &str = "You are a 'Gaucho' storyteller sitting by a fire in 1882.";

/// Errors that can occur while asking the model for a legend.
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("API key not found in ${0}")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("no response text from the model")]
    EmptyResponse,
    #[error("response is not a legend object: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("legend is missing its {0}")]
    Incomplete(&'static str),
}

/// Everything the model needs for one legend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_instruction: String,
    pub prompt: String,
    /// JSON schema the response text must follow
    pub response_schema: serde_json::Value,
}

/// A generative text backend: one request in, the model's raw text out.
pub trait TextGenerator {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, StoryError>> + Send;
}

/// The structured object the model is asked to return.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolkloreResponse {
    pub title: String,
    pub story: String,
}

/// Result of a story fetch: either the model's legend or the fallback.
#[derive(Debug)]
pub enum StoryOutcome {
    Told(Story),
    Fallback { story: Story, cause: StoryError },
}

impl StoryOutcome {
    pub fn story(&self) -> &Story {
        match self {
            StoryOutcome::Told(story) | StoryOutcome::Fallback { story, .. } => story,
        }
    }

    pub fn into_story(self) -> Story {
        match self {
            StoryOutcome::Told(story) | StoryOutcome::Fallback { story, .. } => story,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, StoryOutcome::Fallback { .. })
    }
}

/// The fixed legend shown whenever the model cannot provide one.
pub fn fallback_story(region: &str) -> Story {
    Story {
        title: FALLBACK_TITLE.to_owned(),
        content: FALLBACK_CONTENT.to_owned(),
        region: region.to_owned(),
    }
}

/// Builds the storyteller prompt for `region`, with its optional context.
pub fn build_prompt(region: &str, context: Option<&str>) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!(" ({c})"))
        .unwrap_or_default();

    format!(
        "Act as an expert historian and folklore storyteller of Argentina from the late 19th century (around 1882).\n\
         \n\
         User Request: Tell me a mysterious, short folklore legend or myth specifically from the region of \"{region}\"{context}.\n\
         \n\
         Requirements:\n\
         1. The story must be atmospheric, slightly eerie, or magical.\n\
         2. Keep it under 250 words.\n\
         3. Write in evocative Spanish (Español Rioplatense of the era if possible, but readable).\n\
         4. Provide a catchy, archaic title.\n"
    )
}

/// Schema constraining the model output to `{title, story}`.
pub fn folklore_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING", "description": "The title of the legend" },
            "story": { "type": "STRING", "description": "The content of the story" },
        },
        "required": ["title", "story"],
    })
}

pub fn build_request(region: &str, context: Option<&str>) -> GenerationRequest {
    GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_owned(),
        prompt: build_prompt(region, context),
        response_schema: folklore_schema(),
    }
}

/// Parses the model's text as a legend object.
pub fn parse_response(text: &str) -> Result<FolkloreResponse, StoryError> {
    if text.trim().is_empty() {
        return Err(StoryError::EmptyResponse);
    }
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(StoryError::NotAnObject);
    }
    let response: FolkloreResponse = serde_json::from_value(value)?;
    if response.title.trim().is_empty() {
        return Err(StoryError::Incomplete("title"));
    }
    if response.story.trim().is_empty() {
        return Err(StoryError::Incomplete("story"));
    }
    Ok(response)
}

/// Fetches legends from a [`TextGenerator`], never failing.
#[derive(Debug, Clone)]
pub struct StoryService<G> {
    generator: G,
}

impl<G: TextGenerator> StoryService<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    #[cfg(test)]
    fn generator(&self) -> &G {
        &self.generator
    }

    /// Asks for a fresh legend about `region`. Every call issues a new request.
    pub async fn fetch_story(&self, region: &str, context: Option<&str>) -> StoryOutcome {
        let request = build_request(region, context);
        log::info!("Requesting legend for {region}");

        let result = match self.generator.generate(&request).await {
            Ok(text) => parse_response(&text),
            Err(err) => Err(err),
        };

        match result {
            Ok(response) => StoryOutcome::Told(Story {
                title: response.title,
                content: response.story,
                region: region.to_owned(),
            }),
            Err(cause) => {
                log::error!("Story generation failed for {region}: {cause}");
                StoryOutcome::Fallback {
                    story: fallback_story(region),
                    cause,
                }
            }
        }
    }
}
