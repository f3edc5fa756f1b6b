//! Deterministic `app → graph_id` and `app → search-region` maps,
//! with override lists loaded from config.

pub const DEFAULT_GRAPH_ID: &str = "finance-knowledge";
pub const DEFAULT_SEARCH_REGION: &str = "us";

pub fn graph_id_for_app(app: &str, overrides: &[(String, String)]) -> String {
    if let Some((_, v)) = overrides.iter().find(|(k, _)| k == app) {
        return v.clone();
    }
    match app {
        "placement" | "pe_news" | "finance" => "finance-knowledge",
        "relocation" => "relocation",
        "jobs" | "recruiter" => "jobs",
        _ => DEFAULT_GRAPH_ID,
    }
    .to_string()
}

pub fn search_region_for_app(app: &str, overrides: &[(String, String)]) -> String {
    if let Some((_, v)) = overrides.iter().find(|(k, _)| k == app) {
        return v.clone();
    }
    match app {
        "UK" | "uk" => "uk",
        "US" | "us" => "us",
        "SG" | "sg" => "sg",
        "EU" | "eu" => "de",
        _ => DEFAULT_SEARCH_REGION,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_apps_map_to_documented_graphs() {
        assert_eq!(graph_id_for_app("placement", &[]), "finance-knowledge");
        assert_eq!(graph_id_for_app("relocation", &[]), "relocation");
        assert_eq!(graph_id_for_app("recruiter", &[]), "jobs");
        assert_eq!(graph_id_for_app("unknown-app", &[]), "finance-knowledge");
    }

    #[test]
    fn override_wins_over_default() {
        let overrides = vec![("jobs".to_string(), "jobs-eu".to_string())];
        assert_eq!(graph_id_for_app("jobs", &overrides), "jobs-eu");
    }
}
