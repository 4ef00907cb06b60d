//! Blocking HTTP client for the project endpoints of the REST API.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::Method;
use tracing::{debug, instrument, warn};

use super::types::*;
use crate::config::ServerConfig;
use crate::domain::{ProjectRequest, Record, TargetProject};
use crate::infrastructure::traits::{ProjectSource, ProjectTarget, RemoteError};

const AUTH_HEADER: &str = "X-Tableau-Auth";

#[derive(Debug)]
struct Session {
    token: String,
    site_id: String,
}

/// Client for one site of a server.
///
/// Project calls need a session; use `with_session` to get a signed-in client.
pub struct TableauClient {
    http: Client,
    base_url: String,
    site_name: String,
    pat_name: String,
    pat_value: String,
    page_size: usize,
    publish_samples: bool,
    session: Option<Session>,
}

impl TableauClient {
    pub fn new(config: &ServerConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            base_url: format!(
                "{}/api/{}",
                config.server_url.trim_end_matches('/'),
                config.api_version
            ),
            site_name: config.site_name.clone(),
            pat_name: config.pat_name.clone(),
            pat_value: config.pat_value.clone(),
            page_size: config.page_size.max(1),
            publish_samples: false,
            session: None,
        })
    }

    /// Ask the server to publish sample content into created projects.
    pub fn with_publish_samples(mut self, publish_samples: bool) -> Self {
        self.publish_samples = publish_samples;
        self
    }

    /// Sign in, run `f`, then sign out whatever `f` returned.
    ///
    /// A failed sign-out is logged; the token expires server-side.
    pub fn with_session<R, E, F>(mut self, f: F) -> Result<R, E>
    where
        E: From<RemoteError>,
        F: FnOnce(&TableauClient) -> Result<R, E>,
    {
        self.sign_in()?;
        let result = f(&self);
        if let Err(e) = self.sign_out() {
            warn!("sign out from {} failed: {}", self.base_url, e);
        }
        result
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.base_url))]
    pub fn sign_in(&mut self) -> Result<(), RemoteError> {
        let body = SignInRequest {
            credentials: PatCredentials {
                personal_access_token_name: &self.pat_name,
                personal_access_token_secret: &self.pat_value,
                site: SiteRef {
                    content_url: &self.site_name,
                },
            },
        };
        let response = self
            .http
            .post(format!("{}/auth/signin", self.base_url))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .map_err(transport)?;
        let signed_in: SignInResponse = decode(check(response)?)?;
        debug!("signed in to site {}", signed_in.credentials.site.id);
        self.session = Some(Session {
            token: signed_in.credentials.token,
            site_id: signed_in.credentials.site.id,
        });
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<(), RemoteError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        let response = self
            .http
            .post(format!("{}/auth/signout", self.base_url))
            .header(AUTH_HEADER, session.token)
            .send()
            .map_err(transport)?;
        check(response).map(|_| ())
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session, RemoteError> {
        self.session
            .as_ref()
            .ok_or_else(|| RemoteError::Unauthorized("not signed in".into()))
    }

    fn projects_request(&self, method: Method) -> Result<RequestBuilder, RemoteError> {
        let session = self.session()?;
        let url = format!("{}/sites/{}/projects", self.base_url, session.site_id);
        Ok(self
            .http
            .request(method, url)
            .header(AUTH_HEADER, &session.token)
            .header(ACCEPT, "application/json"))
    }

    fn projects_page(
        &self,
        page: usize,
        filter: Option<&str>,
    ) -> Result<ProjectsResponse, RemoteError> {
        let mut request = self
            .projects_request(Method::GET)?
            .query(&[("pageSize", self.page_size), ("pageNumber", page)]);
        if let Some(filter) = filter {
            request = request.query(&[("filter", filter)]);
        }
        decode(check(request.send().map_err(transport)?)?)
    }

    /// Every page of a project listing, concatenated.
    fn projects(&self, filter: Option<&str>) -> Result<Vec<ProjectItem>, RemoteError> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let response = self.projects_page(page, filter)?;
            let batch = response.projects.project;
            debug!(
                "page {}: {} projects, {} available",
                page,
                batch.len(),
                response.pagination.total_available
            );
            let exhausted = batch.is_empty();
            items.extend(batch);
            if exhausted || items.len() >= response.pagination.total_available {
                return Ok(items);
            }
            page += 1;
        }
    }
}

impl ProjectSource for TableauClient {
    #[instrument(level = "debug", skip(self))]
    fn list_all(&self) -> Result<Vec<Record>, RemoteError> {
        Ok(self.projects(None)?.into_iter().map(Record::from).collect())
    }
}

impl ProjectTarget for TableauClient {
    #[instrument(level = "debug", skip(self))]
    fn create(&self, request: &ProjectRequest) -> Result<TargetProject, RemoteError> {
        let body = CreateProjectRequest {
            project: NewProject {
                name: &request.name,
                parent_project_id: request.parent_id.as_deref(),
            },
        };
        let response = self
            .projects_request(Method::POST)?
            .query(&[("publishSamples", self.publish_samples)])
            .json(&body)
            .send()
            .map_err(transport)?;
        let created: ProjectResponse = match check(response) {
            Ok(response) => decode(response)?,
            Err(RemoteError::Api { status: 409, .. }) => {
                return Err(RemoteError::AlreadyExists {
                    name: request.name.clone(),
                })
            }
            Err(e) => return Err(e),
        };
        Ok(created.project.into())
    }

    #[instrument(level = "debug", skip(self))]
    fn find_by_name(&self, name: &str) -> Result<Vec<TargetProject>, RemoteError> {
        let filter = format!("name:eq:{}", name);
        Ok(self
            .projects(Some(&filter))?
            .into_iter()
            .map(TargetProject::from)
            .collect())
    }
}

/// Map a non-2xx response to a `RemoteError` based on status code.
fn check(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.error.detail.is_empty() => (parsed.error.code, parsed.error.detail),
        Ok(parsed) => (parsed.error.code, parsed.error.summary),
        Err(_) => (String::new(), body),
    };

    match status.as_u16() {
        401 => Err(RemoteError::Unauthorized(message)),
        403 => Err(RemoteError::Forbidden(message)),
        404 => Err(RemoteError::NotFound(message)),
        429 => Err(RemoteError::RateLimited(message)),
        status => Err(RemoteError::Api {
            status,
            code,
            message,
        }),
    }
}

fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    response.json().map_err(|e| RemoteError::Decode(e.to_string()))
}

fn transport(e: reqwest::Error) -> RemoteError {
    RemoteError::Transport(e.to_string())
}
