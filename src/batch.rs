//! # Batch generation
//!
//! Runs the [`IdeaGenerator`] once per topic, per platform, or per calendar
//! day, strictly one call at a time, and gathers the results into a single
//! JSON document.
//!
//! A failed iteration is logged and skipped. Fatal errors (bad credentials,
//! broken configuration) stop the batch, since every later call would fail
//! the same way.

use std::path::{Path, PathBuf};

use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    api::TextGenerator,
    error::{Error, Result},
    generator::IdeaGenerator,
    idea::{Platform, VideoIdea},
    output::{generated_at, slug, write_json},
    prompt::IdeaRequest,
    topics::{Topic, TopicCatalogue},
};

/// Platforms used by cross-platform mode when none are given.
pub const CROSS_PLATFORM_DEFAULTS: [Platform; 3] = [
    Platform::Tiktok,
    Platform::InstagramReels,
    Platform::YoutubeShorts,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchMode {
    AllTopics,
    CrossPlatform,
    Calendar,
}

/// Every configured topic on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllTopicsDocument {
    pub generated_at: String,
    pub platform: Platform,
    pub total_topics: usize,
    pub total_ideas: usize,
    /// Topic name to ideas, in catalogue order.
    #[serde(with = "ordered_map")]
    pub results: Vec<(String, Vec<VideoIdea>)>,
}

/// One topic on several platforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossPlatformDocument {
    pub generated_at: String,
    pub topic: String,
    pub platforms: Vec<Platform>,
    pub total_ideas: usize,
    #[serde(with = "ordered_map")]
    pub results: Vec<(Platform, Vec<VideoIdea>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub day: usize,
    /// Local midnight of the scheduled day, `YYYY-MM-DDTHH:MM:SS`.
    pub date: String,
    pub topic: String,
    /// `None` when generation for that day failed.
    pub idea: Option<VideoIdea>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDocument {
    pub generated_at: String,
    pub platform: Platform,
    pub days: usize,
    pub calendar: Vec<CalendarEntry>,
}

impl AllTopicsDocument {
    pub fn file_name(&self, timestamp: &str) -> String {
        format!("batch_{}_{timestamp}.json", self.platform)
    }
}

impl CrossPlatformDocument {
    pub fn file_name(&self, timestamp: &str) -> String {
        format!("cross_platform_{}_{timestamp}.json", slug(&self.topic))
    }
}

impl CalendarDocument {
    pub fn file_name(&self, timestamp: &str) -> String {
        format!("calendar_{}_{timestamp}.json", self.platform)
    }

    /// Days that ended up with an idea.
    pub fn planned(&self) -> usize {
        self.calendar.iter().filter(|e| e.idea.is_some()).count()
    }
}

/// Writes a batch document as `<output_dir>/<file_name>`.
pub fn save_document<T: Serialize>(output_dir: &Path, file_name: &str, document: &T) -> Result<PathBuf> {
    let path = output_dir.join(file_name);
    write_json(&path, document)?;
    info!(path = %path.display(), "Saved batch results");
    Ok(path)
}

pub struct BatchDriver<G> {
    generator: IdeaGenerator<G>,
    catalogue: TopicCatalogue,
    tone: String,
}

impl<G: TextGenerator> BatchDriver<G> {
    pub fn new(generator: IdeaGenerator<G>, catalogue: TopicCatalogue, tone: impl Into<String>) -> Self {
        Self {
            generator,
            catalogue,
            tone: tone.into(),
        }
    }

    fn request(&self, topic: &Topic, platform: Platform, num_ideas: usize) -> IdeaRequest {
        IdeaRequest::new(topic.prompt_subject(), platform, num_ideas)
            .audience(Some(topic.target_audience.clone()))
            .tone(self.tone.clone())
            .context(Some(topic.keyword_context()))
    }

    /// One generation call. Non-fatal errors become `None`.
    async fn attempt(&self, request: &IdeaRequest, label: &str) -> Result<Option<Vec<VideoIdea>>> {
        match self.generator.generate_ideas(request).await {
            Ok(generation) => {
                info!(label, count = generation.ideas.len(), "Generated ideas");
                Ok(Some(generation.ideas))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(label, error = %e, "Skipping failed iteration");
                Ok(None)
            }
        }
    }

    /// Generates `ideas_per_topic` ideas for every topic on `platform`.
    #[instrument(skip(self))]
    pub async fn all_topics(&self, platform: Platform, ideas_per_topic: usize) -> Result<AllTopicsDocument> {
        let topics = self.catalogue.all();
        let mut results = Vec::with_capacity(topics.len());

        for (i, topic) in topics.iter().enumerate() {
            info!("[{}/{}] Processing: {}", i + 1, topics.len(), topic.name);
            let request = self.request(topic, platform, ideas_per_topic);
            if let Some(ideas) = self.attempt(&request, &topic.name).await? {
                results.push((topic.name.clone(), ideas));
            }
        }

        Ok(AllTopicsDocument {
            generated_at: generated_at(),
            platform,
            total_topics: results.len(),
            total_ideas: results.iter().map(|(_, ideas)| ideas.len()).sum(),
            results,
        })
    }

    /// Generates ideas for one named topic on each of `platforms`.
    ///
    /// An unknown topic fails before any provider call.
    #[instrument(skip(self))]
    pub async fn cross_platform(
        &self,
        topic_name: &str,
        platforms: &[Platform],
        ideas_per_platform: usize,
    ) -> Result<CrossPlatformDocument> {
        let topic = self.catalogue.require(topic_name)?;
        let mut results = Vec::with_capacity(platforms.len());

        for (i, &platform) in platforms.iter().enumerate() {
            info!("[{}/{}] Processing: {}", i + 1, platforms.len(), platform);
            let request = self.request(topic, platform, ideas_per_platform);
            if let Some(ideas) = self.attempt(&request, platform.as_str()).await? {
                results.push((platform, ideas));
            }
        }

        Ok(CrossPlatformDocument {
            generated_at: generated_at(),
            topic: topic.name.clone(),
            platforms: results.iter().map(|(platform, _)| *platform).collect(),
            total_ideas: results.iter().map(|(_, ideas)| ideas.len()).sum(),
            results,
        })
    }

    /// A `days`-long calendar starting today.
    pub async fn calendar(&self, days: usize, platform: Platform) -> Result<CalendarDocument> {
        self.calendar_from(Local::now().date_naive(), days, platform).await
    }

    /// One idea per day, rotating through topics in catalogue order.
    ///
    /// Always returns exactly `days` entries; a failed day has no idea.
    #[instrument(skip(self))]
    pub async fn calendar_from(
        &self,
        start: NaiveDate,
        days: usize,
        platform: Platform,
    ) -> Result<CalendarDocument> {
        let topics = self.catalogue.all();
        if topics.is_empty() {
            return Err(Error::Config("no topics configured for the calendar".to_string()));
        }
        let mut calendar = Vec::with_capacity(days);

        for day in 1..=days {
            let topic = &topics[(day - 1) % topics.len()];
            info!("[Day {day}/{days}] Topic: {}", topic.name);

            let request = self.request(topic, platform, 1);
            let idea = self
                .attempt(&request, &topic.name)
                .await?
                .and_then(|ideas| ideas.into_iter().next());
            if idea.is_none() {
                warn!(day, topic = %topic.name, "No idea planned for this day");
            }

            let date = (start + Duration::days(day as i64 - 1))
                .and_time(NaiveTime::MIN)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string();
            calendar.push(CalendarEntry {
                day,
                date,
                topic: topic.name.clone(),
                idea,
            });
        }

        Ok(CalendarDocument {
            generated_at: generated_at(),
            platform,
            days,
            calendar,
        })
    }
}

/// (De)serializes an ordered list of pairs as a JSON object, keeping order.
mod ordered_map {
    use std::{fmt, marker::PhantomData};

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{MapAccess, Visitor},
    };

    #[allow(clippy::ptr_arg)]
    pub fn serialize<K, V, S>(entries: &Vec<(K, V)>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize,
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, K, V, D>(deserializer: D) -> Result<Vec<(K, V)>, D::Error>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        struct Entries<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for Entries<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Vec<(K, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(Entries(PhantomData))
    }
}
