//! Request and response bodies of the REST API (JSON flavour).

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Record, TargetProject};

/// Body of `POST auth/signin`.
#[derive(Debug, Serialize)]
pub struct SignInRequest<'a> {
    pub credentials: PatCredentials<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatCredentials<'a> {
    pub personal_access_token_name: &'a str,
    pub personal_access_token_secret: &'a str,
    pub site: SiteRef<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRef<'a> {
    pub content_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct SignInResponse {
    pub credentials: SignedIn,
}

#[derive(Debug, Deserialize)]
pub struct SignedIn {
    pub token: String,
    pub site: SiteId,
}

#[derive(Debug, Deserialize)]
pub struct SiteId {
    pub id: String,
}

/// Body of `POST sites/{site}/projects`.
#[derive(Debug, Serialize)]
pub struct CreateProjectRequest<'a> {
    pub project: NewProject<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_project_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectResponse {
    pub project: ProjectItem,
}

/// Response of `GET sites/{site}/projects`.
#[derive(Debug, Deserialize)]
pub struct ProjectsResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub projects: ProjectList,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub project: Vec<ProjectItem>,
}

/// The server sends paging counters as strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(deserialize_with = "count")]
    pub total_available: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_project_id: Option<String>,
}

impl From<ProjectItem> for Record {
    fn from(item: ProjectItem) -> Self {
        Record {
            id: item.id,
            name: item.name,
            parent_id: item.parent_project_id,
        }
    }
}

impl From<ProjectItem> for TargetProject {
    fn from(item: ProjectItem) -> Self {
        TargetProject {
            id: item.id,
            name: item.name,
            parent_id: item.parent_project_id,
        }
    }
}

/// Error body: `{"error": {"code": "409006", "summary": "...", "detail": "..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub detail: String,
}

fn count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(usize),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projects_response_with_string_counters() {
        let body = r#"{
            "pagination": {"pageNumber": "1", "pageSize": "100", "totalAvailable": "2"},
            "projects": {"project": [
                {"id": "a", "name": "Finance", "description": ""},
                {"id": "b", "name": "Reports", "parentProjectId": "a"}
            ]}
        }"#;

        let parsed: ProjectsResponse = serde_json::from_str(body).unwrap();

        assert_eq!(parsed.pagination.total_available, 2);
        let records: Vec<Record> = parsed.projects.project.into_iter().map(Record::from).collect();
        assert_eq!(records[1], Record::new("b", "Reports", Some("a")));
        assert!(records[0].parent_id.is_none());
    }

    #[test]
    fn test_empty_projects_page() {
        let body = r#"{"pagination": {"totalAvailable": 0}, "projects": {}}"#;
        let parsed: ProjectsResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.projects.project.is_empty());
    }

    #[test]
    fn test_create_request_omits_missing_parent() {
        let body = CreateProjectRequest {
            project: NewProject {
                name: "Top",
                parent_project_id: None,
            },
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"project":{"name":"Top"}}"#
        );
    }
}
