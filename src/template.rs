//! # Platform templates
//!
//! A static lookup table describing what works on each supported platform:
//! duration bounds, aspect ratio, best practices, trending formats, content
//! tips and hashtag guidance.
//!
//! Two views of the same table exist:
//!
//! - [`PlatformTemplate`]: the full reference card shown by `trendmine templates`.
//! - [`PromptSpec`]: the short duration/best-practice pair that is embedded in
//!   generation prompts and copied into [`crate::idea::VideoIdea::duration`].
//!
//! ## Example
//!
//! ```
//! use trendmine::idea::Platform;
//! use trendmine::template::{PlatformTemplate, compare_platforms};
//!
//! let tiktok = PlatformTemplate::get(Platform::Tiktok);
//! assert_eq!(tiktok.duration_range, "15-60 seconds");
//!
//! let table = compare_platforms(&[Platform::Tiktok, Platform::Twitter]);
//! assert!(table.contains("Twitter/X"));
//! ```

use crate::idea::Platform;

/// Reference card for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTemplate {
    pub platform: Platform,
    pub name: &'static str,
    pub duration_range: &'static str,
    /// Optimal length in seconds.
    pub optimal_duration: u32,
    pub aspect_ratio: &'static str,
    pub best_practices: &'static [&'static str],
    pub trending_formats: &'static [&'static str],
    pub content_tips: &'static [&'static str],
    pub hashtag_strategy: &'static str,
}

/// The part of a template that goes into the generation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSpec {
    pub duration: &'static str,
    pub best_practices: &'static str,
}

impl PromptSpec {
    pub fn get(platform: Platform) -> PromptSpec {
        match platform {
            Platform::Tiktok => PromptSpec {
                duration: "15-60 seconds",
                best_practices: "Start with a strong hook, use trending sounds, add text overlays, keep it fast-paced",
            },
            Platform::InstagramReels => PromptSpec {
                duration: "15-90 seconds",
                best_practices: "Use trending audio, vertical format, eye-catching visuals, engage in first 3 seconds",
            },
            Platform::YoutubeShorts => PromptSpec {
                duration: "15-60 seconds",
                best_practices: "Strong opening, clear value, encourage likes and subscribes, use captions",
            },
            Platform::Twitter => PromptSpec {
                duration: "15-45 seconds",
                best_practices: "Quick and punchy, clear message, conversation-starting, use relevant hashtags",
            },
        }
    }
}

impl PlatformTemplate {
    pub fn get(platform: Platform) -> PlatformTemplate {
        match platform {
            Platform::Tiktok => PlatformTemplate {
                platform,
                name: "TikTok",
                duration_range: "15-60 seconds",
                optimal_duration: 21,
                aspect_ratio: "9:16 (vertical)",
                best_practices: &[
                    "Hook viewers in the first 3 seconds",
                    "Use trending sounds and music",
                    "Add text overlays for accessibility",
                    "Keep transitions fast-paced",
                    "Post during peak hours (6-10 PM)",
                    "Engage with comments quickly",
                    "Use effects and filters strategically",
                ],
                trending_formats: &[
                    "POV (Point of View) videos",
                    "Before & After transformations",
                    "Tutorial/How-to content",
                    "Duets and Stitches",
                    "Storytime narratives",
                    "Reaction videos",
                    "Challenge participation",
                ],
                content_tips: &[
                    "Start with a question or bold statement",
                    "Show personality and authenticity",
                    "Use trending hashtags (3-5 max)",
                    "Add captions for silent viewing",
                    "Create a series for returning viewers",
                    "Collaborate with other creators",
                    "Leverage trending sounds early",
                ],
                hashtag_strategy: "Mix of trending, niche, and branded hashtags (3-5 total)",
            },
            Platform::InstagramReels => PlatformTemplate {
                platform,
                name: "Instagram Reels",
                duration_range: "15-90 seconds",
                optimal_duration: 30,
                aspect_ratio: "9:16 (vertical)",
                best_practices: &[
                    "Use Instagram's native tools and features",
                    "Post Reels to your feed for maximum reach",
                    "Add trending audio from Instagram library",
                    "Use text overlays and stickers",
                    "Optimize for silent watching",
                    "Post consistently (3-5 times per week)",
                    "Cross-promote on Stories",
                ],
                trending_formats: &[
                    "Behind-the-scenes content",
                    "Quick tips and tricks",
                    "Product showcases",
                    "Transformation videos",
                    "Day-in-the-life content",
                    "Educational content",
                    "Aesthetic/lifestyle content",
                ],
                content_tips: &[
                    "Eye-catching thumbnail (first frame)",
                    "Use all 30 hashtags in caption",
                    "Write engaging captions with CTAs",
                    "Tag relevant accounts",
                    "Use location tags",
                    "Keep branding consistent",
                    "Engage with your audience in comments",
                ],
                hashtag_strategy: "Use all 30 hashtags: mix of popular, medium, and niche tags",
            },
            Platform::YoutubeShorts => PlatformTemplate {
                platform,
                name: "YouTube Shorts",
                duration_range: "15-60 seconds",
                optimal_duration: 45,
                aspect_ratio: "9:16 (vertical)",
                best_practices: &[
                    "Add #Shorts to title or description",
                    "Create compelling thumbnails",
                    "Use clear, bold text overlays",
                    "End with a subscribe CTA",
                    "Link to longer videos",
                    "Optimize titles for search",
                    "Add chapters if applicable",
                ],
                trending_formats: &[
                    "Quick tutorials",
                    "List-style content (Top 5, etc.)",
                    "Comparison videos",
                    "Myth-busting content",
                    "Comedy sketches",
                    "Life hacks",
                    "Teasers for full videos",
                ],
                content_tips: &[
                    "Start with the payoff, not buildup",
                    "Use strong titles with keywords",
                    "Add relevant tags",
                    "Create series to build audience",
                    "Respond to comments",
                    "Use end screens strategically",
                    "Cross-reference your channel",
                ],
                hashtag_strategy: "Include #Shorts plus 3-5 relevant topic hashtags",
            },
            Platform::Twitter => PlatformTemplate {
                platform,
                name: "Twitter/X",
                duration_range: "15-45 seconds",
                optimal_duration: 30,
                aspect_ratio: "16:9 or 1:1",
                best_practices: &[
                    "Keep videos concise and punchy",
                    "Add captions for accessibility",
                    "Post during high-engagement times",
                    "Use relevant hashtags sparingly",
                    "Engage in trending conversations",
                    "Pin important videos",
                    "Quote tweet for context",
                ],
                trending_formats: &[
                    "News and commentary",
                    "Quick reactions",
                    "Behind-the-scenes clips",
                    "Announcement videos",
                    "Educational snippets",
                    "Memes and humor",
                    "Live event coverage",
                ],
                content_tips: &[
                    "Write compelling tweet copy",
                    "Use 1-2 relevant hashtags max",
                    "Tag relevant accounts",
                    "Add alt text for accessibility",
                    "Post thread for context",
                    "Engage with replies quickly",
                    "Share at optimal times",
                ],
                hashtag_strategy: "1-2 highly relevant hashtags, avoid oversaturation",
            },
        }
    }

    /// Templates for every platform, in declaration order.
    pub fn all() -> Vec<PlatformTemplate> {
        Platform::ALL.into_iter().map(PlatformTemplate::get).collect()
    }

    /// Multi-section reference card.
    pub fn format_info(&self) -> String {
        let rule = "=".repeat(60);
        let bullets = |items: &[&str]| {
            items
                .iter()
                .map(|item| format!("  • {item}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            "\n{name} CONTENT TEMPLATE\n{rule}\n\n\
             DURATION: {range} (optimal: {optimal}s)\n\
             ASPECT RATIO: {aspect}\n\n\
             BEST PRACTICES:\n{practices}\n\n\
             TRENDING FORMATS:\n{formats}\n\n\
             CONTENT TIPS:\n{tips}\n\n\
             HASHTAG STRATEGY:\n  {hashtags}\n\n{rule}\n",
            name = self.name.to_uppercase(),
            range = self.duration_range,
            optimal = self.optimal_duration,
            aspect = self.aspect_ratio,
            practices = bullets(self.best_practices),
            formats = bullets(self.trending_formats),
            tips = bullets(self.content_tips),
            hashtags = self.hashtag_strategy,
        )
    }
}

/// Side-by-side summary of several platforms.
pub fn compare_platforms(platforms: &[Platform]) -> String {
    let mut output = String::from("\nPLATFORM COMPARISON\n");
    output.push_str(&"=".repeat(80));
    output.push_str("\n\n");

    for platform in platforms {
        let template = PlatformTemplate::get(*platform);
        output.push_str(&format!("{}:\n", template.name));
        output.push_str(&format!("  Duration: {}\n", template.duration_range));
        output.push_str(&format!("  Aspect Ratio: {}\n", template.aspect_ratio));
        output.push_str(&format!(
            "  Optimal Duration: {}s\n\n",
            template.optimal_duration
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_platform_has_a_template() {
        let templates = PlatformTemplate::all();
        assert_eq!(templates.len(), 4);
        for (template, platform) in templates.iter().zip(Platform::ALL) {
            assert_eq!(template.platform, platform);
            assert!(!template.best_practices.is_empty());
            assert!(!template.hashtag_strategy.is_empty());
        }
    }

    #[test]
    fn test_prompt_spec_matches_template_duration() {
        for platform in Platform::ALL {
            assert_eq!(
                PromptSpec::get(platform).duration,
                PlatformTemplate::get(platform).duration_range
            );
        }
    }

    #[test]
    fn test_format_info() {
        let info = PlatformTemplate::get(Platform::YoutubeShorts).format_info();
        assert!(info.contains("YOUTUBE SHORTS CONTENT TEMPLATE"));
        assert!(info.contains("(optimal: 45s)"));
        assert!(info.contains("  • Add #Shorts to title or description"));
    }

    #[test]
    fn test_compare_platforms_lists_only_requested() {
        let output = compare_platforms(&[Platform::Tiktok, Platform::InstagramReels]);
        assert!(output.contains("TikTok:"));
        assert!(output.contains("Instagram Reels:"));
        assert!(!output.contains("Twitter/X"));
    }
}
