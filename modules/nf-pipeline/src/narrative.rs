//! Schema-enforced article generation and normalization.

use nf_ai::{generate_structured, LlmClient, Message, StructuredOutput};
use nf_common::{slug::slugify, text::reading_time_minutes, text::truncate_chars, text::word_count, AdapterErrorKind};
use nf_world::source::CuratedSourceSet;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

pub const MAX_RESEARCH_CONTEXT_CHARS: usize = 80_000;

pub struct GenerateArticleInput<'a> {
    pub topic: &'a str,
    pub article_type: &'a str,
    pub app: &'a str,
    pub target_word_count: u32,
    pub jurisdiction: Option<&'a str>,
    pub target_keywords: &'a [String],
    pub research: &'a CuratedSourceSet,
    pub four_act: bool,
}

/// Builds the prompt context string: topic, voice, word
/// budget, jurisdiction, keyword targets, then a length-limited research
/// serialization with per-source delimiters.
pub fn build_prompt_context(input: &GenerateArticleInput<'_>) -> String {
    let mut prompt = format!(
        "Topic: {}\nArticle type: {}\nApp voice: {}\nTarget word count: {}\n",
        input.topic, input.article_type, input.app, input.target_word_count
    );
    if let Some(jurisdiction) = input.jurisdiction {
        prompt.push_str(&format!("Jurisdiction: {jurisdiction}\n"));
    }
    if !input.target_keywords.is_empty() {
        prompt.push_str(&format!("Target keywords: {}\n", input.target_keywords.join(", ")));
    }

    let mut research_block = String::new();
    for fact in &input.research.key_facts {
        research_block.push_str(&format!("FACT: {fact}\n"));
    }
    for perspective in &input.research.perspectives {
        research_block.push_str(&format!("PERSPECTIVE: {perspective}\n"));
    }
    for entry in &input.research.entries {
        research_block.push_str(&format!(
            "--- SOURCE {} ({:?}) ---\n{}\n{}\n",
            entry.source_id, entry.source_kind, entry.summary, entry.full_content
        ));
    }

    prompt.push_str("\nResearch context:\n");
    prompt.push_str(&truncate_chars(&research_block, MAX_RESEARCH_CONTEXT_CHARS));
    prompt
}

/// Runs the schema-enforced generation call for step 2; normalization
/// (word_count, reading_time, slug fallback) is applied by the caller
/// once the concrete payload shape is known.
pub async fn generate_article_payload<T>(llm: &dyn LlmClient, prompt: String) -> Result<(T, f64), AdapterErrorKind>
where
    T: StructuredOutput + DeserializeOwned + JsonSchema,
{
    let messages = vec![
        Message::system("You write schema-conforming long-form content. Return strict JSON only."),
        Message::user(prompt),
    ];
    generate_structured::<T>(llm, messages, 2).await
}

pub fn normalize_slug(existing: &str, title: &str) -> String {
    if existing.trim().is_empty() {
        slugify(title)
    } else {
        slugify(existing)
    }
}

pub fn normalize_word_count_and_reading_time(content: &str) -> (u32, u32) {
    let words = word_count(content);
    (words as u32, reading_time_minutes(words))
}

pub fn default_featured_image_prompt(title: &str, app: &str) -> String {
    format!("Editorial hero image for an article titled \"{title}\" in the {app} voice, no on-screen text.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_world::source::{CuratedEntry, SourceKind};

    fn sample_research() -> CuratedSourceSet {
        CuratedSourceSet {
            entries: vec![CuratedEntry {
                source_id: "news_0".into(),
                relevance_score: 0.9,
                summary: "summary".into(),
                key_quote: None,
                full_content: "full content".into(),
                url: "https://x.test".into(),
                source_kind: SourceKind::News,
            }],
            key_facts: vec!["Fact one".into()],
            perspectives: vec!["Perspective one".into()],
            duplicate_groups: vec![],
            curation_failed: false,
        }
    }

    #[test]
    fn prompt_context_includes_keywords_and_facts() {
        let research = sample_research();
        let input = GenerateArticleInput {
            topic: "Relocating to Slovakia",
            article_type: "guide",
            app: "relocation",
            target_word_count: 1200,
            jurisdiction: Some("Slovakia"),
            target_keywords: &["slovakia visa".to_string()],
            research: &research,
            four_act: true,
        };
        let prompt = build_prompt_context(&input);
        assert!(prompt.contains("slovakia visa"));
        assert!(prompt.contains("FACT: Fact one"));
        assert!(prompt.contains("Jurisdiction: Slovakia"));
    }

    #[test]
    fn prompt_context_is_truncated_to_research_limit() {
        let mut research = sample_research();
        research.entries[0].full_content = "x".repeat(200_000);
        let input = GenerateArticleInput {
            topic: "t",
            article_type: "guide",
            app: "relocation",
            target_word_count: 1000,
            jurisdiction: None,
            target_keywords: &[],
            research: &research,
            four_act: false,
        };
        let prompt = build_prompt_context(&input);
        assert!(prompt.len() < 200_100);
    }

    #[test]
    fn normalize_slug_falls_back_to_title_when_missing() {
        assert_eq!(normalize_slug("", "Moving to Cyprus!"), "moving-to-cyprus");
        assert_eq!(normalize_slug("custom-slug", "Moving to Cyprus!"), "custom-slug");
    }

    #[test]
    fn word_count_and_reading_time_are_consistent() {
        let content = "word ".repeat(400);
        let (words, minutes) = normalize_word_count_and_reading_time(&content);
        assert_eq!(words, 400);
        assert_eq!(minutes, 2);
    }
}
