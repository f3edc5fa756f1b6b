//! Workflow E — segment video: isolated single four-act video
//! generation for one country-guide segment, spawned as a child of Workflow C.
//! Unlike Workflow A's video phase, this accepts an optional character
//! reference image URL so later segments stay visually consistent with the
//! hero segment.

use std::sync::Arc;

use restate_sdk::prelude::*;

use nf_common::text::truncate_chars;
use nf_media::media_host::{build_passthrough, thumbnail_url, DashboardMeta};
use nf_media::video_gen::{ModelTier, MAX_VIDEO_PROMPT_CHARS};
use nf_world::video::{Act, MuxUrls, VideoNarrative};

use crate::retry::phase_retry_policy;
use crate::types::{EmptyRequest, SegmentVideoRequest, SegmentVideoResult};
use crate::PipelineDeps;

const GIF_FPS: u32 = 12;

fn build_segment_prompt(req: &SegmentVideoRequest) -> String {
    let mut prompt = format!(
        "No text, letters, or captions appear on screen at any point. Documentary style footage of {} in {}. ",
        req.segment, req.country_name
    );
    for (k, entry) in req.four_act_content.iter().enumerate() {
        let start = k as f64 * 3.0;
        let end = (k as f64 + 1.0) * 3.0;
        prompt.push_str(&format!("ACT {k} ({start}s - {end}s): {}. ", entry.visual_hint));
    }
    truncate_chars(&prompt, MAX_VIDEO_PROMPT_CHARS)
}

#[restate_sdk::workflow]
#[name = "SegmentVideoWorkflow"]
pub trait SegmentVideoWorkflow {
    async fn run(req: SegmentVideoRequest) -> Result<SegmentVideoResult, HandlerError>;
    #[shared]
    async fn get_status(req: EmptyRequest) -> Result<String, HandlerError>;
}

pub struct SegmentVideoWorkflowImpl {
    deps: Arc<PipelineDeps>,
}

impl SegmentVideoWorkflowImpl {
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        Self { deps }
    }
}

impl SegmentVideoWorkflow for SegmentVideoWorkflowImpl {
    async fn run(&self, ctx: WorkflowContext<'_>, req: SegmentVideoRequest) -> Result<SegmentVideoResult, HandlerError> {
        ctx.set("status", format!("Generating {} segment...", req.segment));

        let deps = self.deps.clone();
        let prompt = build_segment_prompt(&req);
        let act_count = req.four_act_content.len().max(1);
        let duration_s = 3.0 * act_count as f64;
        let quality = req.video_quality.clone();
        let reference_url = req.character_reference_url.clone();
        let title = format!("{} — {}", req.country_name, req.segment);
        let country = req.country_name.clone();
        let article_id_str = req.article_id.to_string();
        let four_act = req.four_act_content.clone();

        let (video_narrative, character_reference_url) = ctx
            .run(|| async move {
                let model_tier = if quality == "premium" { ModelTier::Premium } else { ModelTier::Standard };
                let (video_result, gen_cost) = deps
                    .video_gen
                    .generate(&prompt, duration_s, "1080p", "9:16", model_tier, reference_url.as_deref())
                    .await;
                let video_url = video_result.map_err(|e| -> HandlerError { TerminalError::new(format!("segment video generation failed: {e:?}")).into() })?;

                let passthrough = build_passthrough(&title, "guide_segment", Some(country.as_str()), "relocation", None, &article_id_str);
                let dashboard_meta = DashboardMeta { title: title.clone(), country: Some(country.clone()), mode: "guide_segment".to_string(), app: "relocation".to_string() };
                let (upload_result, upload_cost) = deps.media_host.upload(&video_url, &passthrough, dashboard_meta).await;
                let asset = upload_result.map_err(|e| -> HandlerError { TerminalError::new(format!("segment video upload failed: {e:?}")).into() })?;

                let acts: Vec<Act> = four_act
                    .iter()
                    .enumerate()
                    .map(|(k, entry)| Act { index: k as u32, start_s: k as f64 * 3.0, end_s: (k as f64 + 1.0) * 3.0, title: entry.title.clone(), visual_hint: entry.visual_hint.clone() })
                    .collect();
                let per_act_thumb = acts.iter().map(|a| thumbnail_url(&asset.playback_id, a.start_s + 1.5, 640, None)).collect();
                let hero_time = acts.last().map(|a| a.start_s + 1.5).unwrap_or(0.0);
                let hero_thumb = thumbnail_url(&asset.playback_id, hero_time, 1280, Some(720));

                let mux_urls = MuxUrls {
                    stream: nf_media::media_host::stream_url(&asset.playback_id),
                    hero_thumb: hero_thumb.clone(),
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

                let _ = gen_cost + upload_cost;
                Ok::<_, HandlerError>((narrative, hero_thumb))
            })
            .retry_policy(phase_retry_policy())
            .await?;

        ctx.set("status", format!("{} segment complete", req.segment));
        Ok(SegmentVideoResult { segment: req.segment, video_narrative, character_reference_url: Some(character_reference_url) })
    }

    async fn get_status(&self, ctx: SharedWorkflowContext<'_>, _req: EmptyRequest) -> Result<String, HandlerError> {
        crate::read_workflow_status(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_world::payload::FourActEntry;

    fn request_with_acts(n: usize) -> SegmentVideoRequest {
        SegmentVideoRequest {
            country_name: "Portugal".to_string(),
            segment: "family".to_string(),
            article_id: uuid::Uuid::new_v4(),
            app: "relocation".to_string(),
            video_quality: "standard".to_string(),
            four_act_content: (0..n)
                .map(|i| FourActEntry { title: format!("Act {i}"), hint: String::new(), factoid: String::new(), visual_hint: format!("visual {i}") })
                .collect(),
            character_reference_url: None,
        }
    }

    #[test]
    fn prompt_forbids_on_screen_text_and_includes_every_act() {
        let req = request_with_acts(3);
        let prompt = build_segment_prompt(&req);
        assert!(prompt.starts_with("No text, letters, or captions"));
        assert!(prompt.contains("visual 0"));
        assert!(prompt.contains("visual 2"));
    }

    #[test]
    fn prompt_never_exceeds_max_length() {
        let req = request_with_acts(50);
        let prompt = build_segment_prompt(&req);
        assert!(prompt.chars().count() <= MAX_VIDEO_PROMPT_CHARS);
    }
}
