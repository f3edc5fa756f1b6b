use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Act {
    pub index: u32,
    pub start_s: f64,
    pub end_s: f64,
    pub title: String,
    pub visual_hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MuxUrls {
    pub stream: String,
    pub hero_thumb: String,
    pub gif: String,
    pub per_act_thumb: Vec<String>,
}

/// Immutable descriptor of the generated video and its act structure.
/// Never rewritten once persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoNarrative {
    pub playback_id: String,
    pub asset_id: Option<String>,
    pub duration_seconds: f64,
    pub acts: Vec<Act>,
    pub mux_urls: MuxUrls,
    pub prompt_used: String,
    pub template_name: String,
    pub reused_from_parent: bool,
}

impl VideoNarrative {
    /// `k` acts starting at `i*3`, ending at `(i+1)*3`,
    /// sorted, with `duration_seconds == 3*k`.
    pub fn acts_are_well_formed(&self) -> bool {
        let k = self.acts.len();
        if (self.duration_seconds - (3.0 * k as f64)).abs() > f64::EPSILON {
            return false;
        }
        self.acts.iter().enumerate().all(|(i, a)| {
            a.index == i as u32
                && (a.start_s - (i as f64 * 3.0)).abs() < f64::EPSILON
                && (a.end_s - ((i as f64 + 1.0) * 3.0)).abs() < f64::EPSILON
        })
    }
}
