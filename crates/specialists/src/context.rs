use source_clients::ToolClient;

/// Shared dependencies every specialist needs: the MCP tool client and the
/// LLM connection details. One instance is built per triage process and
/// borrowed by all six specialists concurrently.
pub struct SpecialistContext {
    pub tools: ToolClient,
    pub http: reqwest::Client,
    pub api_key: Option<String>,
    pub model: String,
}

impl SpecialistContext {
    pub fn new(tools: ToolClient, api_key: Option<String>, model: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("reqwest client build");
        SpecialistContext { tools, http, api_key, model }
    }
}
