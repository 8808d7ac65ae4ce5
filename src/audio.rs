//! # Voice-over clips
//!
//! Reads a `scripts_*.json` document written by [`crate::output::save_scripts`],
//! picks one script by number and voices its hook and each key point through
//! the ElevenLabs text-to-speech API. Clips are written one at a time as
//! `hook.mp3`, `keypoint_01.mp3`, ... under a directory named after the
//! script title.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::{
    api::classify_status,
    error::{Error, Result},
    output::{ScriptDocument, ScriptRecord},
};

pub const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_VOICE_MODEL: &str = "eleven_multilingual_v2";
pub const DEFAULT_AUDIO_DIR: &str = "./generated_audio";
pub const API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
pub const VOICE_ID_VAR: &str = "ELEVENLABS_VOICE_ID";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const SERVICE: &str = "elevenlabs";

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// One piece of text to voice and the file it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub label: String,
    pub text: String,
    pub file_name: String,
}

/// Finds the script with `script_number` in a saved document.
pub fn find_script(document: &ScriptDocument, script_number: usize) -> Result<&ScriptRecord> {
    if document.scripts.is_empty() {
        return Err(Error::InvalidArgument(
            "no scripts found in the JSON file".to_string(),
        ));
    }
    document
        .scripts
        .iter()
        .find(|script| script.script_number == script_number)
        .ok_or_else(|| {
            Error::InvalidArgument(format!("script number {script_number} not found in JSON"))
        })
}

/// Hook first, then the key points in order. Blank text is skipped.
pub fn clips_for(script: &ScriptRecord) -> Vec<AudioClip> {
    let mut clips = Vec::new();

    let hook = script.hook.trim();
    if !hook.is_empty() {
        clips.push(AudioClip {
            label: "hook".to_string(),
            text: hook.to_string(),
            file_name: "hook.mp3".to_string(),
        });
    }

    // Numbering follows the key point's position, blanks included.
    for (i, point) in script.key_points.iter().enumerate() {
        let point = point.trim();
        if point.is_empty() {
            continue;
        }
        clips.push(AudioClip {
            label: format!("key point {}", i + 1),
            text: point.to_string(),
            file_name: format!("keypoint_{:02}.mp3", i + 1),
        });
    }
    clips
}

/// Directory name for a script: alphanumerics, `-` and `_` kept, the rest
/// replaced by `-`, outer dashes trimmed.
pub fn clip_dir_name(script: &ScriptRecord) -> String {
    let name: String = script
        .title
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let name = name.trim_matches('-');
    if name.is_empty() {
        format!("script_{}", script.script_number)
    } else {
        name.to_string()
    }
}

/// ElevenLabs text-to-speech.
pub struct SpeechClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SpeechClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::authentication(
                    SERVICE,
                    format!("API key must be set as environment variable: {API_KEY_VAR}"),
                )
            })?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::provider(SERVICE, format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            base_url: base_url.into(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(env::var(API_KEY_VAR).ok(), ELEVENLABS_API_BASE)
    }

    /// Returns the encoded audio for `text`.
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn synthesize(&self, text: &str, voice_id: &str, model_id: &str) -> Result<Vec<u8>> {
        let endpoint = format!(
            "{}/text-to-speech/{voice_id}",
            self.base_url.trim_end_matches('/')
        );
        let body = SpeechRequest {
            text,
            model_id,
            voice_settings: VoiceSettings {
                stability: 0.3,
                similarity_boost: 0.75,
            },
        };

        let response = self
            .http
            .post(&endpoint)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to ElevenLabs");
                Error::provider(SERVICE, format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "ElevenLabs returned an error");
            return Err(classify_status(SERVICE, status, &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::provider(SERVICE, format!("failed to read audio: {e}")))?;
        debug!(bytes = audio.len(), "Received audio");
        Ok(audio.to_vec())
    }
}

/// Voices every clip of `script` into `dir`, in order, stopping at the first failure.
pub async fn generate_tracks(
    client: &SpeechClient,
    script: &ScriptRecord,
    dir: &Path,
    voice_id: &str,
    model_id: &str,
) -> Result<Vec<PathBuf>> {
    let clips = clips_for(script);
    if clips.is_empty() {
        info!("No hook or key points to voice");
        return Ok(Vec::new());
    }

    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(clips.len());
    for clip in &clips {
        info!(label = %clip.label, file = %clip.file_name, "Generating clip");
        let audio = client.synthesize(&clip.text, voice_id, model_id).await?;
        let path = dir.join(&clip.file_name);
        fs::write(&path, audio)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idea::{Platform, sample_idea};
    use httpmock::prelude::*;
    use tempfile::tempdir;

    fn record(title: &str, key_points: &[&str]) -> ScriptRecord {
        let mut idea = sample_idea(title, Platform::Tiktok);
        idea.key_points = key_points.iter().map(|p| p.to_string()).collect();
        ScriptRecord::new(1, &idea)
    }

    fn document(scripts: Vec<ScriptRecord>) -> ScriptDocument {
        ScriptDocument {
            topic: "t".to_string(),
            generated_at: String::new(),
            total_scripts: scripts.len(),
            duration: "30 seconds".to_string(),
            news_articles: Vec::new(),
            news_context: None,
            system_prompt: None,
            user_prompt: None,
            scripts,
        }
    }

    #[test]
    fn test_find_script_by_number() {
        let mut second = record("Second", &["a"]);
        second.script_number = 2;
        let doc = document(vec![record("First", &["a"]), second]);

        assert_eq!(find_script(&doc, 2).unwrap().title, "Second");
        assert!(matches!(find_script(&doc, 3), Err(Error::InvalidArgument(_))));
        assert!(find_script(&document(Vec::new()), 1).is_err());
    }

    #[test]
    fn test_clips_skip_blank_text() {
        let clips = clips_for(&record("x", &["First point", "  ", "Third point"]));
        let names: Vec<_> = clips.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(names, vec!["hook.mp3", "keypoint_01.mp3", "keypoint_03.mp3"]);
        assert_eq!(clips[2].label, "key point 3");
        assert_eq!(clips[2].text, "Third point");
    }

    #[test]
    fn test_clip_dir_name() {
        assert_eq!(
            clip_dir_name(&record("Stop! Don't buy: 3 gadgets", &[])),
            "Stop--Don-t-buy--3-gadgets"
        );
        assert_eq!(clip_dir_name(&record("!!!", &[])), "script_1");
    }

    #[test]
    fn test_missing_key_is_authentication_error() {
        for key in [None, Some("  ".to_string())] {
            assert!(matches!(
                SpeechClient::new(key, "http://127.0.0.1:9"),
                Err(Error::Authentication { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_generate_tracks_writes_each_clip() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/text-to-speech/voice-1")
                    .header("xi-api-key", "el-key")
                    .body_includes("\"model_id\":\"eleven_multilingual_v2\"")
                    .body_includes("\"similarity_boost\":0.75");
                then.status(200).body("ID3audio");
            })
            .await;

        let client = SpeechClient::new(Some("el-key".to_string()), server.url("/v1")).unwrap();
        let dir = tempdir().unwrap();
        let out = dir.path().join("clips");
        let paths = generate_tracks(
            &client,
            &record("x", &["One", "Two"]),
            &out,
            "voice-1",
            DEFAULT_VOICE_MODEL,
        )
        .await
        .unwrap();

        mock.assert_hits_async(3).await;
        assert_eq!(paths.len(), 3);
        assert_eq!(paths[2], out.join("keypoint_02.mp3"));
        assert_eq!(fs::read(&paths[0]).unwrap(), b"ID3audio");
    }

    #[tokio::test]
    async fn test_rejected_key_stops_generation() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(401).json_body(serde_json::json!({
                    "detail": { "status": "invalid_api_key", "message": "Invalid API key" }
                }));
            })
            .await;

        let client = SpeechClient::new(Some("bad".to_string()), server.base_url()).unwrap();
        let dir = tempdir().unwrap();
        let err = generate_tracks(&client, &record("x", &["One"]), dir.path(), "v", "m")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Authentication { .. }), "{err:?}");
        mock.assert_hits_async(1).await;
    }
}
