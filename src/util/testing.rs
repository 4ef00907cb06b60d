//! Test support: logging setup and an in-memory target site.

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{ProjectRequest, TargetProject};
use crate::infrastructure::traits::{ProjectTarget, RemoteError};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("projsync=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Calls received by an `InMemoryTarget`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCall {
    Create(ProjectRequest),
    FindByName(String),
}

#[derive(Debug, Default)]
struct TargetState {
    projects: Vec<TargetProject>,
    calls: Vec<TargetCall>,
    failures: HashMap<String, RemoteError>,
    next_id: usize,
}

/// Target site kept in memory.
///
/// A create conflicts when a project of the same name exists under the same
/// parent. Ids are `t1`, `t2`, … in creation order.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    state: RefCell<TargetState>,
}

impl InMemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project as if it had been created earlier.
    pub fn with_project(self, name: &str, parent_id: Option<&str>) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let id = next_id(&mut state);
            state.projects.push(TargetProject {
                id,
                name: name.to_string(),
                parent_id: parent_id.map(str::to_string),
            });
        }
        self
    }

    /// Make every create of `name` fail with `error`.
    pub fn fail_on(self, name: &str, error: RemoteError) -> Self {
        self.state
            .borrow_mut()
            .failures
            .insert(name.to_string(), error);
        self
    }

    pub fn projects(&self) -> Vec<TargetProject> {
        self.state.borrow().projects.clone()
    }

    pub fn calls(&self) -> Vec<TargetCall> {
        self.state.borrow().calls.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.count(|c| matches!(c, TargetCall::Create(_)))
    }

    pub fn lookup_calls(&self) -> usize {
        self.count(|c| matches!(c, TargetCall::FindByName(_)))
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// Hierarchy as `(name, parent name)` pairs, ordered by creation.
    pub fn shape(&self) -> Vec<(String, Option<String>)> {
        let state = self.state.borrow();
        let names: HashMap<&str, &str> = state
            .projects
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str()))
            .collect();
        state
            .projects
            .iter()
            .map(|p| {
                let parent = p
                    .parent_id
                    .as_deref()
                    .and_then(|id| names.get(id))
                    .map(|name| name.to_string());
                (p.name.clone(), parent)
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&TargetCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }
}

fn next_id(state: &mut TargetState) -> String {
    state.next_id += 1;
    format!("t{}", state.next_id)
}

impl ProjectTarget for InMemoryTarget {
    fn create(&self, request: &ProjectRequest) -> Result<TargetProject, RemoteError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(TargetCall::Create(request.clone()));

        if let Some(error) = state.failures.get(&request.name) {
            return Err(error.clone());
        }
        if state
            .projects
            .iter()
            .any(|p| p.name == request.name && p.parent_id == request.parent_id)
        {
            return Err(RemoteError::AlreadyExists {
                name: request.name.clone(),
            });
        }

        let project = TargetProject {
            id: next_id(&mut state),
            name: request.name.clone(),
            parent_id: request.parent_id.clone(),
        };
        state.projects.push(project.clone());
        Ok(project)
    }

    fn find_by_name(&self, name: &str) -> Result<Vec<TargetProject>, RemoteError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(TargetCall::FindByName(name.to_string()));
        Ok(state
            .projects
            .iter()
            .filter(|p| p.name == name)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn test_in_memory_target_conflicts_on_same_parent_only() {
        let target = InMemoryTarget::new();
        let top = target.create(&ProjectRequest::new("A", None)).unwrap();

        let again = target.create(&ProjectRequest::new("A", None));
        let nested = target.create(&ProjectRequest::new("A", Some(&top.id)));

        assert!(again.unwrap_err().is_conflict());
        assert!(nested.is_ok());
        assert_eq!(target.find_by_name("A").unwrap().len(), 2);
    }
}
