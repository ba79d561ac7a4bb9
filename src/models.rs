use serde::{Deserialize, Serialize};

use crate::table::Row;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const DEFAULT_NUM_THREADS: i64 = 4;

/// Query string of the listing and download endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbstractsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(default)]
    pub search: String,
    /// `true` (any case) includes rows without abstract text
    pub show_empty: Option<String>,
}

impl AbstractsQuery {
    pub fn show_empty(&self) -> bool {
        self.show_empty
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

/// Query string of the annotated results endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Annotation request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotateRequest {
    #[serde(default)]
    pub question: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub num_threads: Option<i64>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub search_filter: String,
    #[serde(default)]
    pub show_empty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateResponse {
    pub task_id: String,
    pub total: usize,
}

/// One page of the filtered table
#[derive(Debug, Clone, Serialize)]
pub struct AbstractsResponse {
    pub data: Vec<Row>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<Vec<String>>,
}

/// One page of an annotation result
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedResponse {
    pub data: Vec<Row>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub columns: Vec<String>,
    /// Set when the annotated rows carry matched keywords
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_terms: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Rows with abstract text; what the listing shows by default
    pub total_abstracts: usize,
    pub abstracts_with_text: usize,
    /// Every row, including those without abstract text
    pub total_all: usize,
    pub columns: Vec<String>,
}

/// A selectable chat model
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: &'static [ModelInfo],
}

pub const MODELS: &[ModelInfo] = &[
    ModelInfo { id: "gpt-5-nano", name: "GPT-5 Nano - Most cost-effective (default)" },
    ModelInfo { id: "gpt-5-mini", name: "GPT-5 Mini - Fast and affordable" },
    ModelInfo { id: "gpt-5", name: "GPT-5 - Smartest, fastest model with thinking built in" },
    ModelInfo { id: "o4-mini", name: "o4-mini - Fast reasoning for math, coding, visual tasks" },
    ModelInfo { id: "o3", name: "o3 - Most powerful reasoning model" },
    ModelInfo { id: "o1", name: "o1 - Advanced reasoning model" },
    ModelInfo { id: "o1-mini", name: "o1-mini - Faster, affordable reasoning" },
    ModelInfo { id: "gpt-4o", name: "GPT-4o - Multimodal text and images" },
    ModelInfo { id: "gpt-4o-mini", name: "GPT-4o mini - Fast, affordable small model" },
    ModelInfo { id: "gpt-4-turbo", name: "GPT-4 Turbo" },
    ModelInfo { id: "gpt-4", name: "GPT-4" },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_empty_is_case_insensitive() {
        let mut query = AbstractsQuery::default();
        assert!(!query.show_empty());
        query.show_empty = Some("True".to_string());
        assert!(query.show_empty());
        query.show_empty = Some("yes".to_string());
        assert!(!query.show_empty());
    }

    #[test]
    fn test_annotate_request_defaults() {
        let req: AnnotateRequest = serde_json::from_str(r#"{"question": "q"}"#).unwrap();
        assert_eq!(req.question, "q");
        assert!(!req.dry_run);
        assert!(req.search_filter.is_empty());
        assert!(req.num_threads.is_none());
    }

    #[test]
    fn test_search_terms_omitted_when_absent() {
        let resp = AbstractsResponse {
            data: Vec::new(),
            total: 0,
            page: 1,
            per_page: 20,
            total_pages: 1,
            search_terms: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("search_terms").is_none());
    }
}
