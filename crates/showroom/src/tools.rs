use std::sync::Arc;

use serde_json::{json, Value};

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};
use crate::search::base::VectorStore;

/// The closed set of tools the model may invoke.
///
/// Adding a tool means adding a variant here plus its arm in
/// [`ToolRegistry::dispatch`]; the registry tests verify declarations and
/// dispatchable kinds stay 1:1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    SearchCars,
}

impl ToolKind {
    pub const ALL: [ToolKind; 1] = [ToolKind::SearchCars];

    /// The wire name advertised to the model.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SearchCars => "searchCars",
        }
    }

    /// Resolve a wire name back to a kind.
    pub fn from_name(name: &str) -> Option<ToolKind> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// The static declaration advertised to the model.
    pub fn declaration(&self) -> Tool {
        match self {
            ToolKind::SearchCars => Tool::new(
                self.name(),
                "Search the car inventory with a natural-language description of what the buyer needs",
                json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "The query to search for"
                        }
                    },
                    "required": ["query"],
                    "additionalProperties": false
                }),
            ),
        }
    }
}

/// Dispatch table for model-initiated tool calls.
///
/// Every tool returns plain text, never structured data, so the follow-up
/// completion always parses the same way no matter which tool ran.
pub struct ToolRegistry {
    store: Arc<dyn VectorStore>,
}

impl ToolRegistry {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    /// Declarations for every registered tool.
    pub fn declarations(&self) -> Vec<Tool> {
        ToolKind::ALL.iter().map(ToolKind::declaration).collect()
    }

    /// Execute a tool call and return its text result.
    pub async fn dispatch(&self, call: &ToolCall) -> AgentResult<String> {
        let kind = ToolKind::from_name(&call.name)
            .ok_or_else(|| AgentError::UnknownTool(call.name.clone()))?;

        match kind {
            ToolKind::SearchCars => self.search_cars(&call.arguments).await,
        }
    }

    async fn search_cars(&self, arguments: &Value) -> AgentResult<String> {
        let query = arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AgentError::InvalidParameters(
                    "searchCars requires a string `query` argument".to_string(),
                )
            })?;

        tracing::info!(query, "searching car inventory");
        let result = self
            .store
            .query(query, 1)
            .await
            .map_err(|e| AgentError::Upstream(e.to_string()))?;

        match result.documents.first() {
            Some(document) => Ok(format!(
                "Here are the results of your search:\n{document}"
            )),
            None => Ok("The search returned no matching cars.".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::base::QueryResult;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct StubStore {
        queries: Mutex<Vec<String>>,
        response: Result<QueryResult, String>,
    }

    impl StubStore {
        fn with_document(document: &str) -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                response: Ok(QueryResult {
                    documents: vec![document.to_string()],
                    metadatas: vec![json!({})],
                    distances: vec![0.1],
                }),
            }
        }

        fn empty() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                response: Ok(QueryResult::default()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                response: Err(message.to_string()),
            }
        }
    }

    #[async_trait]
    impl VectorStore for StubStore {
        async fn query(&self, text: &str, _n_results: usize) -> Result<QueryResult> {
            self.queries.lock().unwrap().push(text.to_string());
            match &self.response {
                Ok(result) => Ok(result.clone()),
                Err(message) => Err(anyhow!("{message}")),
            }
        }
    }

    fn registry(store: StubStore) -> ToolRegistry {
        ToolRegistry::new(Arc::new(store))
    }

    #[test]
    fn test_declarations_match_kinds_one_to_one() {
        let registry = registry(StubStore::empty());
        let declarations = registry.declarations();

        assert_eq!(declarations.len(), ToolKind::ALL.len());

        let mut names = HashSet::new();
        for declaration in &declarations {
            assert!(names.insert(declaration.name.clone()), "duplicate name");
            let kind = ToolKind::from_name(&declaration.name)
                .unwrap_or_else(|| panic!("undeclarable kind for {}", declaration.name));
            assert_eq!(kind.declaration(), *declaration);
        }
    }

    #[test]
    fn test_declaration_requires_query_parameter() {
        let declaration = ToolKind::SearchCars.declaration();
        assert_eq!(declaration.input_schema["required"], json!(["query"]));
        assert_eq!(
            declaration.input_schema["properties"]["query"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn test_dispatch_search_formats_top_document() {
        let registry = registry(StubStore::with_document("Model: Citra Wave\nSeats: 4"));
        let call = ToolCall::new("searchCars", json!({"query": "4-seat economy car"}));

        let result = registry.dispatch(&call).await.unwrap();
        assert!(result.contains("Here are the results of your search"));
        assert!(result.contains("Model: Citra Wave"));
    }

    #[tokio::test]
    async fn test_dispatch_passes_query_verbatim() {
        let store = StubStore::with_document("doc");
        let queries = Arc::new(store);
        let registry = ToolRegistry::new(queries.clone());
        let call = ToolCall::new("searchCars", json!({"query": "red convertible, 2 seats"}));

        registry.dispatch(&call).await.unwrap();
        assert_eq!(
            *queries.queries.lock().unwrap(),
            vec!["red convertible, 2 seats".to_string()]
        );
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = registry(StubStore::empty());
        let call = ToolCall::new("bookTestDrive", json!({"query": "tomorrow"}));

        let err = registry.dispatch(&call).await.unwrap_err();
        assert_eq!(err, AgentError::UnknownTool("bookTestDrive".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_missing_query_argument() {
        let registry = registry(StubStore::empty());
        let call = ToolCall::new("searchCars", json!({"q": "wrong key"}));

        let err = registry.dispatch(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_dispatch_store_failure_is_upstream() {
        let registry = registry(StubStore::failing("connection refused"));
        let call = ToolCall::new("searchCars", json!({"query": "anything"}));

        let err = registry.dispatch(&call).await.unwrap_err();
        match err {
            AgentError::Upstream(message) => assert!(message.contains("connection refused")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_empty_result_reports_no_match() {
        let registry = registry(StubStore::empty());
        let call = ToolCall::new("searchCars", json!({"query": "a hovercraft"}));

        let result = registry.dispatch(&call).await.unwrap();
        assert_eq!(result, "The search returned no matching cars.");
    }
}
