//! The static topic catalogue.
//!
//! Topics come from the `topics` section of `config.yaml` and keep their
//! declared order, which the content calendar relies on for rotation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    config::AppConfig,
    error::{Error, Result},
};

/// A predefined topic.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Topic {
    pub name: String,
    pub description: String,
    pub target_audience: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Topic {
    /// The topic line sent to the model: `"<name>: <description>"`.
    pub fn prompt_subject(&self) -> String {
        format!("{}: {}", self.name, self.description)
    }

    /// Extra prompt context listing the keywords.
    pub fn keyword_context(&self) -> String {
        format!("Keywords: {}", self.keywords.join(", "))
    }

    fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
            || self
                .keywords
                .iter()
                .any(|keyword| keyword.to_lowercase().contains(query))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// Read-only view over the configured topics and tone options.
#[derive(Debug, Clone)]
pub struct TopicCatalogue {
    topics: Vec<Topic>,
    tone_options: Vec<String>,
}

impl TopicCatalogue {
    pub fn new(topics: Vec<Topic>, tone_options: Vec<String>) -> Self {
        Self {
            topics,
            tone_options,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.topics.clone(), config.tone_options.clone())
    }

    pub fn all(&self) -> &[Topic] {
        &self.topics
    }

    /// Case-insensitive lookup by exact name.
    pub fn by_name(&self, name: &str) -> Option<&Topic> {
        let wanted = name.trim().to_lowercase();
        self.topics
            .iter()
            .find(|topic| topic.name.to_lowercase() == wanted)
    }

    /// Like [`by_name`](Self::by_name) but an unknown name is an error.
    pub fn require(&self, name: &str) -> Result<&Topic> {
        self.by_name(name)
            .ok_or_else(|| Error::TopicNotFound(name.to_string()))
    }

    /// Substring search over name, description and keywords.
    pub fn search(&self, query: &str) -> Vec<&Topic> {
        let query = query.trim().to_lowercase();
        self.topics.iter().filter(|t| t.matches(&query)).collect()
    }

    pub fn tone_options(&self) -> &[String] {
        &self.tone_options
    }

    /// Formatted listing of every topic.
    pub fn list(&self) -> String {
        let mut output = String::from("\nAVAILABLE TOPICS:\n");
        output.push_str(&"=".repeat(50));
        output.push_str("\n\n");

        for (i, topic) in self.topics.iter().enumerate() {
            output.push_str(&format!("{}. {}\n", i + 1, topic.name));
            output.push_str(&format!("   {}\n", topic.description));
            output.push_str(&format!("   Audience: {}\n", topic.target_audience));
            output.push_str(&format!("   Keywords: {}\n\n", topic.keywords.join(", ")));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> TopicCatalogue {
        TopicCatalogue::from_config(&AppConfig::builtin().unwrap())
    }

    #[test]
    fn test_declared_order_is_kept() {
        let names: Vec<_> = catalogue().all().iter().map(|t| t.name.clone()).collect();
        assert_eq!(names.len(), 8);
        assert_eq!(names.first().map(String::as_str), Some("Tech Trends 2025"));
        assert_eq!(names.last().map(String::as_str), Some("Sustainable Living"));
    }

    #[test]
    fn test_by_name_is_case_insensitive() {
        let catalogue = catalogue();
        let topic = catalogue.by_name("tech trends 2025").unwrap();
        assert_eq!(topic.name, "Tech Trends 2025");
        assert!(catalogue.by_name("Underwater Basket Weaving").is_none());
        assert!(matches!(
            catalogue.require("nope"),
            Err(Error::TopicNotFound(_))
        ));
    }

    #[test]
    fn test_search_covers_keywords() {
        let catalogue = catalogue();
        let hits = catalogue.search("MEAL PREP");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Quick Recipes");

        let tech = catalogue.search("tech");
        assert!(tech.iter().any(|t| t.name == "Tech Trends 2025"));
    }

    #[test]
    fn test_prompt_helpers() {
        let topic = Topic {
            name: "Coffee".to_string(),
            description: "Brewing at home".to_string(),
            target_audience: "Coffee lovers".to_string(),
            keywords: vec!["espresso".to_string(), "latte".to_string()],
        };
        assert_eq!(topic.prompt_subject(), "Coffee: Brewing at home");
        assert_eq!(topic.keyword_context(), "Keywords: espresso, latte");
    }

    #[test]
    fn test_list_numbers_topics() {
        let listing = catalogue().list();
        assert!(listing.contains("1. Tech Trends 2025"));
        assert!(listing.contains("8. Sustainable Living"));
    }
}
