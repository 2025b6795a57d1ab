//! GraphQL request and response envelopes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ApiError;

/// Body posted to the GraphQL endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a, V: Serialize> {
    pub operation_name: &'a str,
    pub query: &'a str,
    pub variables: &'a V,
}

/// Response envelope, `data` is decoded only after `errors` was checked
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Option<Vec<serde_json::Value>>,
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) if !path.is_empty() => {
                let path = path
                    .iter()
                    .map(|segment| match segment {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                write!(f, "{}: {}", path, self.message)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

/// `{"input": ...}`
#[derive(Serialize)]
pub(crate) struct InputVariables<'a, I> {
    pub input: &'a I,
}

/// `{"id": ...}`
#[derive(Serialize)]
pub(crate) struct IdVariables<Id> {
    pub id: Id,
}

/// `{"id": ..., "input": ...}`
#[derive(Serialize)]
pub(crate) struct IdInputVariables<'a, Id, I> {
    pub id: Id,
    pub input: &'a I,
}

/// Relay style connection, only the nodes are selected
#[derive(Debug, Clone, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

impl GraphQlResponse {
    /// Fail on any reported error, otherwise decode `data` into `T`
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if let Some(errors) = self.errors {
            if !errors.is_empty() {
                return Err(ApiError::GraphQl(errors));
            }
        }

        let data = self
            .data
            .ok_or_else(|| ApiError::ParseError("response has no data".to_string()))?;

        serde_json::from_value(data).map_err(|e| {
            tracing::error!("Failed to deserialize GraphQL data: {}", e);
            ApiError::ParseError(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Team {
        id: String,
    }

    #[derive(Debug, Deserialize)]
    struct TeamData {
        team: Team,
    }

    #[test]
    fn request_uses_operation_name_key() {
        let variables = json!({"id": "1"});
        let request = GraphQlRequest {
            operation_name: "team",
            query: "query team($id: UUID!) { team(id: $id) { id } }",
            variables: &variables,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["operationName"], "team");
        assert_eq!(body["variables"]["id"], "1");
    }

    #[test]
    fn errors_take_precedence_over_partial_data() {
        let response: GraphQlResponse = serde_json::from_value(json!({
            "data": {"team": null},
            "errors": [{"message": "team not accessible", "path": ["team"]}]
        }))
        .unwrap();

        let err = response.into_data::<TeamData>().unwrap_err();
        assert_eq!(err.to_string(), "team: team not accessible");
    }

    #[test]
    fn data_is_decoded() {
        let response: GraphQlResponse =
            serde_json::from_value(json!({"data": {"team": {"id": "abc"}}})).unwrap();
        let data: TeamData = response.into_data().unwrap();
        assert_eq!(data.team.id, "abc");
    }

    #[test]
    fn missing_data_is_a_parse_error() {
        let response: GraphQlResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            response.into_data::<TeamData>(),
            Err(ApiError::ParseError(_))
        ));
    }
}
