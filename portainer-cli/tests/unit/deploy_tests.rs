use portainer_cli::api::{DeployOutcome, Session, StackApi, deploy_or_update, stack_id_by_name};
use portainer_cli::domain::{
    DeployNewStackInformation, EnvVar, StackDeployFeedback, StackDeployRequest, UpdateStackInfo,
};
use portainer_cli::error::{Error, Result};
use std::sync::Mutex;

/// Records every call and answers from canned statuses; `None` means success.
struct FakeStacks {
    deploy_status: Option<u16>,
    stacks: Vec<StackDeployFeedback>,
    update_status: Option<u16>,
    calls: Mutex<Vec<String>>,
    update_bodies: Mutex<Vec<UpdateStackInfo>>,
}

impl FakeStacks {
    fn new(deploy_status: Option<u16>, stacks: Vec<StackDeployFeedback>) -> Self {
        Self {
            deploy_status,
            stacks,
            update_status: None,
            calls: Mutex::new(Vec::new()),
            update_bodies: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn server_error(status: u16) -> Error {
    Error::Server {
        status,
        message: format!("status {status}"),
        details: String::new(),
    }
}

#[async_trait::async_trait]
impl StackApi for FakeStacks {
    async fn deploy_stack(
        &self,
        _session: &Session,
        endpoint: &str,
        info: &DeployNewStackInformation,
    ) -> Result<StackDeployFeedback> {
        self.calls.lock().unwrap().push(format!("deploy {} @{endpoint}", info.name));
        match self.deploy_status {
            Some(status) => Err(server_error(status)),
            None => Ok(stack(100, &info.name)),
        }
    }

    async fn list_stacks(&self, _session: &Session) -> Result<Vec<StackDeployFeedback>> {
        self.calls.lock().unwrap().push("list".to_string());
        Ok(self.stacks.clone())
    }

    async fn update_stack(
        &self,
        _session: &Session,
        stack_id: i64,
        endpoint: &str,
        info: &UpdateStackInfo,
    ) -> Result<StackDeployFeedback> {
        self.calls.lock().unwrap().push(format!("update {stack_id} @{endpoint}"));
        self.update_bodies.lock().unwrap().push(info.clone());
        match self.update_status {
            Some(status) => Err(server_error(status)),
            None => Ok(stack(stack_id, "updated")),
        }
    }
}

fn stack(id: i64, name: &str) -> StackDeployFeedback {
    StackDeployFeedback {
        id,
        name: name.to_string(),
        stack_type: 1,
        endpoint_id: 1,
        swarm_id: "swarm-1".to_string(),
        entry_point: "docker-compose.yml".to_string(),
        env: Vec::new(),
        project_path: format!("/data/compose/{id}"),
    }
}

fn session() -> Session {
    Session::new("http://portainer:9000", "token").unwrap()
}

fn request(name: &str) -> StackDeployRequest {
    StackDeployRequest {
        name: name.to_string(),
        swarm_id: "swarm-1".to_string(),
        endpoint: "1".to_string(),
        compose: "services: {}\n".to_string(),
        env: vec![EnvVar {
            name: "TAG".to_string(),
            value: "1.2.3".to_string(),
        }],
        prune: false,
    }
}

#[tokio::test]
async fn test_new_stack_is_created_without_fallback() {
    let api = FakeStacks::new(None, Vec::new());

    let outcome = deploy_or_update(&api, &session(), &request("web")).await.unwrap();

    assert!(matches!(outcome, DeployOutcome::Created(ref f) if f.id == 100));
    assert_eq!(api.calls(), vec!["deploy web @1"]);
}

#[tokio::test]
async fn test_conflict_falls_back_to_update_of_matching_stack() {
    let api = FakeStacks::new(Some(409), vec![stack(7, "db"), stack(42, "web")]);

    let outcome = deploy_or_update(&api, &session(), &request("web")).await.unwrap();

    assert!(matches!(outcome, DeployOutcome::Updated(ref f) if f.id == 42));
    assert_eq!(api.calls(), vec!["deploy web @1", "list", "update 42 @1"]);

    let bodies = api.update_bodies.lock().unwrap();
    assert!(!bodies[0].prune);
    assert_eq!(bodies[0].stack_file_content, "services: {}\n");
    assert_eq!(bodies[0].env[0].name, "TAG");
}

#[tokio::test]
async fn test_any_server_rejection_falls_back() {
    let api = FakeStacks::new(Some(500), vec![stack(42, "web")]);

    let outcome = deploy_or_update(&api, &session(), &request("web")).await.unwrap();

    assert!(matches!(outcome, DeployOutcome::Updated(_)));
}

#[tokio::test]
async fn test_missing_stack_fails_with_not_found_and_never_updates() {
    let api = FakeStacks::new(Some(409), vec![stack(7, "db")]);

    let err = deploy_or_update(&api, &session(), &request("web"))
        .await
        .unwrap_err();

    match err {
        Error::DeployFallback { deploy, fallback } => {
            assert_eq!(deploy.status(), Some(409));
            assert!(matches!(*fallback, Error::NotFound(ref name) if name == "web"));
        }
        other => panic!("expected fallback error, got {other:?}"),
    }
    assert_eq!(api.calls(), vec!["deploy web @1", "list"]);
}

#[tokio::test]
async fn test_failed_update_keeps_both_errors() {
    let mut api = FakeStacks::new(Some(409), vec![stack(42, "web")]);
    api.update_status = Some(400);

    let err = deploy_or_update(&api, &session(), &request("web"))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("409"));
    assert!(message.contains("400"));
    assert!(matches!(err, Error::DeployFallback { .. }));
}

#[tokio::test]
async fn test_repeated_deploys_pick_the_same_stack() {
    let api = FakeStacks::new(Some(409), vec![stack(3, "web"), stack(9, "api"), stack(42, "web")]);

    deploy_or_update(&api, &session(), &request("web")).await.unwrap();
    deploy_or_update(&api, &session(), &request("web")).await.unwrap();

    assert_eq!(
        api.calls(),
        vec![
            "deploy web @1",
            "list",
            "update 42 @1",
            "deploy web @1",
            "list",
            "update 42 @1",
        ]
    );
}

#[tokio::test]
async fn test_prune_flag_is_forwarded_to_update() {
    let api = FakeStacks::new(Some(409), vec![stack(42, "web")]);
    let mut req = request("web");
    req.prune = true;

    deploy_or_update(&api, &session(), &req).await.unwrap();

    assert!(api.update_bodies.lock().unwrap()[0].prune);
}

#[tokio::test]
async fn test_stack_id_by_name_not_found() {
    let api = FakeStacks::new(None, vec![stack(1, "web-2")]);

    let err = stack_id_by_name(&api, &session(), "web").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}
