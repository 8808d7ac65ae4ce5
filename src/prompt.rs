//! Prompt construction.
//!
//! Every generation sends the same [`SYSTEM_PROMPT`] and a user prompt built
//! from an [`IdeaRequest`] by [`build_prompt`].

use crate::{idea::Platform, template::PromptSpec};

pub const SYSTEM_PROMPT: &str = "You are a creative social media content strategist specializing in viral video content. You understand platform algorithms, trends, and what makes content engaging.";

pub const DEFAULT_TONE: &str = "engaging and authentic";

const DEFAULT_AUDIENCE: &str = "General audience interested in the topic";

const RESPONSE_FORMAT: &str = r##"
For each idea, provide the following in JSON format:

{
  "ideas": [
    {
      "title": "Catchy title for the video",
      "hook": "The first 3 seconds hook to grab attention",
      "key_points": ["Point 1", "Point 2", "Point 3"],
      "cta": "Clear call to action",
      "hashtags": ["#hashtag1", "#hashtag2", "#hashtag3"],
      "target_audience": "Specific target audience description"
    }
  ]
}

Make the ideas:
- Attention-grabbing and scroll-stopping
- Platform-optimized
- Trend-aware
- Authentic and relatable
- Actionable with clear value proposition
"##;

/// What to ask the model for.
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaRequest {
    pub topic: String,
    pub platform: Platform,
    pub num_ideas: usize,
    pub target_audience: Option<String>,
    pub tone: String,
    pub additional_context: Option<String>,
}

impl IdeaRequest {
    pub fn new(topic: impl Into<String>, platform: Platform, num_ideas: usize) -> Self {
        Self {
            topic: topic.into(),
            platform,
            num_ideas,
            target_audience: None,
            tone: DEFAULT_TONE.to_string(),
            additional_context: None,
        }
    }

    pub fn audience(mut self, audience: Option<String>) -> Self {
        self.target_audience = audience.filter(|a| !a.trim().is_empty());
        self
    }

    pub fn tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = tone.into();
        self
    }

    pub fn context(mut self, context: Option<String>) -> Self {
        self.additional_context = context.filter(|c| !c.trim().is_empty());
        self
    }
}

/// Renders the user prompt for `request`.
pub fn build_prompt(request: &IdeaRequest) -> String {
    let spec = PromptSpec::get(request.platform);

    let mut prompt = format!(
        "Generate {num} creative video ideas for {platform}.\n\n\
         TOPIC: {topic}\n\n\
         PLATFORM SPECIFICATIONS:\n\
         - Duration: {duration}\n\
         - Best practices: {practices}\n\n\
         TARGET AUDIENCE: {audience}\n\n\
         TONE: {tone}\n",
        num = request.num_ideas,
        platform = request.platform.display_name(),
        topic = request.topic,
        duration = spec.duration,
        practices = spec.best_practices,
        audience = request
            .target_audience
            .as_deref()
            .unwrap_or(DEFAULT_AUDIENCE),
        tone = request.tone,
    );

    if let Some(context) = &request.additional_context {
        prompt.push_str(&format!("\nADDITIONAL CONTEXT: {context}\n"));
    }

    prompt.push_str(RESPONSE_FORMAT);
    prompt
}
