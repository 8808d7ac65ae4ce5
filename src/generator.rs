//! One prompt, one provider call, one parse.

use tracing::{debug, info, instrument, warn};

use crate::{
    api::TextGenerator,
    error::Result,
    idea::VideoIdea,
    parser::parse_ideas,
    prompt::{IdeaRequest, SYSTEM_PROMPT, build_prompt},
};

/// Ideas from a single call plus the prompts that produced them.
#[derive(Debug, Clone)]
pub struct Generation {
    pub ideas: Vec<VideoIdea>,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Drives a [`TextGenerator`] with built prompts and parses the reply.
pub struct IdeaGenerator<G> {
    client: G,
}

impl<G: TextGenerator> IdeaGenerator<G> {
    pub fn new(client: G) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &G {
        &self.client
    }

    /// Generates ideas for `request`.
    ///
    /// Provider errors are returned untouched. A partially parsed reply is
    /// logged and its recovered records are returned; a reply that yields no
    /// record at all is an [`Error::PartialParse`](crate::error::Error::PartialParse).
    #[instrument(skip(self, request), fields(topic = %request.topic, platform = %request.platform))]
    pub async fn generate_ideas(&self, request: &IdeaRequest) -> Result<Generation> {
        let user_prompt = build_prompt(request);
        info!(
            provider = %self.client.provider(),
            model = self.client.model_name(),
            num_ideas = request.num_ideas,
            "Requesting ideas"
        );

        let reply = self.client.generate(SYSTEM_PROMPT, &user_prompt).await?;
        debug!(chars = reply.len(), "Received reply");

        let ideas = match parse_ideas(&reply, request.platform) {
            Ok(ideas) => ideas,
            Err(partial) if partial.recovered.is_empty() => {
                debug!(preview = %partial.preview, "Unparsed reply");
                return Err(partial.into());
            }
            Err(partial) => {
                warn!(
                    reason = %partial.reason,
                    missing = ?partial.missing_fields,
                    recovered = partial.recovered.len(),
                    "Model reply was only partly parsed"
                );
                debug!(preview = %partial.preview, "Unparsed reply");
                partial.into_recovered()
            }
        };

        Ok(Generation {
            ideas,
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        api::Provider,
        error::Error,
        idea::{Platform, sample_idea},
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with canned text and records every user prompt it receives.
    pub(crate) struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String>>>,
        pub(crate) prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        /// Replies are handed out in order, then a single-idea reply forever.
        pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn prompt_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    /// A JSON reply containing `n` complete ideas.
    pub(crate) fn ideas_reply(n: usize) -> String {
        let ideas: Vec<_> = (0..n)
            .map(|i| sample_idea(&format!("Idea {}", i + 1), Platform::Tiktok))
            .collect();
        serde_json::json!({ "ideas": ideas }).to_string()
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, _system_prompt: &str, user_prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user_prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(ideas_reply(1)))
        }

        fn provider(&self) -> Provider {
            Provider::Mistral
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_generate_returns_ideas_and_prompts() {
        let generator = IdeaGenerator::new(ScriptedGenerator::new(vec![Ok(ideas_reply(3))]));
        let request = IdeaRequest::new("Home workouts", Platform::YoutubeShorts, 3);

        let generation = generator.generate_ideas(&request).await.unwrap();
        assert_eq!(generation.ideas.len(), 3);
        assert_eq!(generation.system_prompt, SYSTEM_PROMPT);
        assert!(generation.user_prompt.contains("TOPIC: Home workouts"));
        // Platform and duration follow the request, not the reply.
        assert!(generation
            .ideas
            .iter()
            .all(|idea| idea.platform == Platform::YoutubeShorts && idea.duration == "15-60 seconds"));
        assert_eq!(generator.client().prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_partial_reply_is_recovered() {
        let reply = "Title: Only a title\nHook: and a hook".to_string();
        let generator = IdeaGenerator::new(ScriptedGenerator::new(vec![Ok(reply)]));
        let request = IdeaRequest::new("x", Platform::Tiktok, 1);

        let generation = generator.generate_ideas(&request).await.unwrap();
        assert_eq!(generation.ideas.len(), 1);
        assert_eq!(generation.ideas[0].title, "Only a title");
        assert!(!generation.ideas[0].is_complete());
    }

    #[tokio::test]
    async fn test_unusable_reply_is_a_parse_error() {
        let reply = "I'm sorry, I can't help with that.".to_string();
        let generator = IdeaGenerator::new(ScriptedGenerator::new(vec![Ok(reply)]));
        let request = IdeaRequest::new("x", Platform::Tiktok, 2);

        let err = generator.generate_ideas(&request).await.unwrap_err();
        assert!(!err.is_fatal());
        match err {
            Error::PartialParse(partial) => {
                assert!(partial.recovered.is_empty());
                assert!(partial.preview.starts_with("I'm sorry"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_ideas_array_is_not_an_error() {
        let generator =
            IdeaGenerator::new(ScriptedGenerator::new(vec![Ok(r#"{"ideas": []}"#.to_string())]));
        let request = IdeaRequest::new("x", Platform::Tiktok, 2);

        let generation = generator.generate_ideas(&request).await.unwrap();
        assert!(generation.ideas.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let generator = IdeaGenerator::new(ScriptedGenerator::new(vec![Err(Error::provider(
            "mistral", "quota exceeded",
        ))]));
        let request = IdeaRequest::new("x", Platform::Tiktok, 1);

        let err = generator.generate_ideas(&request).await.unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("quota exceeded"));
    }
}
