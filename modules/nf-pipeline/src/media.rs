//! Video generation/alignment and section-image injection.

use nf_ai::{generate_structured, LlmClient, Message};
use nf_common::{text::truncate_chars, AdapterErrorKind};
use nf_media::media_host::{build_passthrough, thumbnail_url, DashboardMeta, MediaHostAdapter};
use nf_media::video_gen::{ModelTier, VideoGenAdapter, MAX_VIDEO_PROMPT_CHARS};
use nf_world::video::{Act, MuxUrls, VideoNarrative};
use schemars::JsonSchema;
use serde::Deserialize;

pub const SECTION_IMAGE_MARGIN_S: f64 = 0.5;
pub const GIF_FPS: u32 = 12;

pub struct MakeVideoInput<'a> {
    pub visual_hints: &'a [String],
    pub app_style_directive: &'a str,
    pub title: &'a str,
    pub mode: &'a str,
    pub country: Option<&'a str>,
    pub app: &'a str,
    pub cluster_id: Option<&'a str>,
    pub article_id: &'a str,
    pub model_tier: ModelTier,
}

/// global no-text rule + style directive + per-act hints,
/// truncated to the model's 2000-char limit.
pub fn build_video_prompt(input: &MakeVideoInput<'_>) -> String {
    let mut prompt = String::from("No text, letters, or captions appear on screen at any point. ");
    prompt.push_str(input.app_style_directive);
    prompt.push(' ');

    for (k, hint) in input.visual_hints.iter().enumerate() {
        let start = k as f64 * 3.0;
        let end = (k as f64 + 1.0) * 3.0;
        prompt.push_str(&format!("ACT {k} ({start}s - {end}s): {hint}. "));
    }

    truncate_chars(&prompt, MAX_VIDEO_PROMPT_CHARS)
}

pub async fn make_video(
    input: &MakeVideoInput<'_>,
    video_gen: &dyn VideoGenAdapter,
    media_host: &dyn MediaHostAdapter,
) -> Result<(VideoNarrative, f64), AdapterErrorKind> {
    let prompt = build_video_prompt(input);
    let act_count = input.visual_hints.len().max(1);
    let duration_s = 3.0 * act_count as f64;

    let (video_result, gen_cost) = video_gen.generate(&prompt, duration_s, "1080p", "9:16", input.model_tier, None).await;
    let video_url = video_result?;

    let passthrough = build_passthrough(input.title, input.mode, input.country, input.app, input.cluster_id, input.article_id);
    let dashboard_meta = DashboardMeta {
        title: input.title.to_string(),
        country: input.country.map(str::to_string),
        mode: input.mode.to_string(),
        app: input.app.to_string(),
    };

    let (upload_result, upload_cost) = media_host.upload(&video_url, &passthrough, dashboard_meta).await;
    let asset = upload_result?;

    let acts: Vec<Act> = input
        .visual_hints
        .iter()
        .enumerate()
        .map(|(k, hint)| Act {
            index: k as u32,
            start_s: k as f64 * 3.0,
            end_s: (k as f64 + 1.0) * 3.0,
            title: format!("Act {k}"),
            visual_hint: hint.clone(),
        })
        .collect();

    let per_act_thumb = acts.iter().map(|a| thumbnail_url(&asset.playback_id, a.start_s + 1.5, 640, None)).collect();
    let hero_time = acts.last().map(|a| a.start_s + 1.5).unwrap_or(0.0);

    let mux_urls = MuxUrls {
        stream: nf_media::media_host::stream_url(&asset.playback_id),
        hero_thumb: thumbnail_url(&asset.playback_id, hero_time, 1280, Some(720)),
        gif: nf_media::media_host::animated_url(&asset.playback_id, 0.0, duration_s, 480, GIF_FPS, "gif"),
        per_act_thumb,
    };

    let narrative = VideoNarrative {
        playback_id: asset.playback_id,
        asset_id: Some(asset.asset_id),
        duration_seconds: duration_s,
        acts,
        mux_urls,
        prompt_used: prompt,
        template_name: "four_act".to_string(),
        reused_from_parent: false,
    };

    Ok((narrative, gen_cost + upload_cost))
}

#[derive(Debug, Clone)]
pub struct ContentSection {
    pub title: String,
    pub body: String,
}

/// splits on `<h2>` boundaries, preserving any preamble.
pub fn split_content_by_h2(content: &str) -> (String, Vec<ContentSection>) {
    let parts: Vec<&str> = content.split("<h2>").collect();
    let preamble = parts[0].to_string();
    let mut sections = Vec::new();

    for part in &parts[1..] {
        let Some(close) = part.find("</h2>") else { continue };
        let title = part[..close].trim().to_string();
        let body = part[close + 5..].to_string();
        sections.push(ContentSection { title, body });
    }

    (preamble, sections)
}

/// even distribution with margins.
pub fn even_distribution_times(section_count: usize, duration_s: f64) -> Vec<f64> {
    if section_count == 0 {
        return Vec::new();
    }
    let step = (duration_s - 2.0 * SECTION_IMAGE_MARGIN_S) / section_count as f64;
    (0..section_count).map(|i| SECTION_IMAGE_MARGIN_S + step * i as f64 + step / 2.0).collect()
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ActMatchResponse {
    act_midpoints_s: Vec<f64>,
}

/// step 2, act-matching branch: asks an LLM to align section titles
/// to act midpoints; falls back to even distribution on any failure.
pub async fn choose_section_times(
    section_titles: &[String],
    video: &VideoNarrative,
    llm: &dyn LlmClient,
) -> (Vec<f64>, f64) {
    if video.acts.len() < 4 {
        return (even_distribution_times(section_titles.len(), video.duration_seconds), 0.0);
    }

    let act_descriptions: Vec<String> = video.acts.iter().map(|a| format!("Act {}: {}", a.index, a.visual_hint)).collect();
    let prompt = format!(
        "Section titles:\n{}\n\nActs:\n{}\n\nReturn one act midpoint timestamp per section, in order.",
        section_titles.join("\n"),
        act_descriptions.join("\n")
    );
    let messages = vec![Message::system("You align article sections to video acts."), Message::user(prompt)];

    match generate_structured::<ActMatchResponse>(llm, messages, 0).await {
        Ok((response, cost)) if response.act_midpoints_s.len() == section_titles.len() => {
            let clamped = response
                .act_midpoints_s
                .into_iter()
                .map(|t| t.clamp(0.0, video.duration_seconds))
                .collect();
            (clamped, cost)
        }
        _ => (even_distribution_times(section_titles.len(), video.duration_seconds), 0.0),
    }
}

/// rebuilds content with one `<figure>` per section,
/// immediately after its header. Preamble is left untouched.
pub fn inject_section_images(preamble: &str, sections: &[ContentSection], times_s: &[f64], playback_id: &str, width: u32) -> String {
    let mut out = String::from(preamble);
    for (section, time_s) in sections.iter().zip(times_s) {
        let image_url = thumbnail_url(playback_id, *time_s, width, None);
        out.push_str(&format!("<h2>{}</h2>", section.title));
        out.push_str(&format!(
            "<figure class=\"aspect-video\"><img src=\"{image_url}\" loading=\"lazy\" alt=\"{}\"></figure>",
            section.title
        ));
        out.push_str(&section.body);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_prompt_includes_no_text_rule_and_acts() {
        let hints = vec!["arriving at the airport".to_string(), "settling into an apartment".to_string()];
        let input = MakeVideoInput {
            visual_hints: &hints,
            app_style_directive: "Warm documentary style.",
            title: "t",
            mode: "guide",
            country: Some("Slovakia"),
            app: "relocation",
            cluster_id: None,
            article_id: "art-1",
            model_tier: ModelTier::Standard,
        };
        let prompt = build_video_prompt(&input);
        assert!(prompt.starts_with("No text, letters, or captions"));
        assert!(prompt.contains("ACT 0 (0s - 3s)"));
        assert!(prompt.contains("ACT 1 (3s - 6s)"));
    }

    #[test]
    fn video_prompt_is_truncated_to_2000_chars() {
        let hints: Vec<String> = (0..50).map(|i| format!("hint {i} ").repeat(20)).collect();
        let input = MakeVideoInput {
            visual_hints: &hints,
            app_style_directive: "style",
            title: "t",
            mode: "guide",
            country: None,
            app: "relocation",
            cluster_id: None,
            article_id: "a",
            model_tier: ModelTier::Standard,
        };
        let prompt = build_video_prompt(&input);
        assert_eq!(prompt.chars().count(), MAX_VIDEO_PROMPT_CHARS);
    }

    #[test]
    fn split_content_by_h2_preserves_preamble_and_titles() {
        let content = "<p>intro</p><h2>First</h2><p>a</p><h2>Second</h2><p>b</p>";
        let (preamble, sections) = split_content_by_h2(content);
        assert_eq!(preamble, "<p>intro</p>");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "First");
        assert_eq!(sections[1].title, "Second");
    }

    #[test]
    fn even_distribution_times_has_correct_count_and_margin() {
        let times = even_distribution_times(4, 12.0);
        assert_eq!(times.len(), 4);
        assert!(times[0] > SECTION_IMAGE_MARGIN_S);
        assert!(times.last().unwrap() < &(12.0 - SECTION_IMAGE_MARGIN_S));
    }

    #[test]
    fn inject_section_images_places_figure_after_header() {
        let preamble = "<p>intro</p>".to_string();
        let sections = vec![ContentSection { title: "First".into(), body: "<p>body</p>".into() }];
        let out = inject_section_images(&preamble, &sections, &[1.5], "pb123", 640);
        let h2_pos = out.find("<h2>First</h2>").unwrap();
        let figure_pos = out.find("<figure").unwrap();
        assert!(figure_pos > h2_pos);
        assert!(out.contains("time=1.5"));
    }
}
