use super::client::{PortainerApi, Session};
use crate::domain::{
    DeployNewStackInformation, STACKS_PATH, StackDeployFeedback, StackDeployRequest,
    UpdateStackInfo, deploy_stack_path, find_stack_id, update_stack_path, validate_endpoint_id,
};
use crate::error::{Error, Result};
use reqwest::Method;
use tracing::{info, warn};

/// The three stack calls the deploy-or-update flow is built from.
#[async_trait::async_trait]
pub trait StackApi: Send + Sync {
    /// `POST /api/stacks?endpointId=<endpoint>&method=string&type=1`
    async fn deploy_stack(
        &self,
        session: &Session,
        endpoint: &str,
        info: &DeployNewStackInformation,
    ) -> Result<StackDeployFeedback>;

    /// `GET /api/stacks`, unfiltered.
    async fn list_stacks(&self, session: &Session) -> Result<Vec<StackDeployFeedback>>;

    /// `PUT /api/stacks/<id>?endpointId=<endpoint>&methode=string&type=1`
    async fn update_stack(
        &self,
        session: &Session,
        stack_id: i64,
        endpoint: &str,
        info: &UpdateStackInfo,
    ) -> Result<StackDeployFeedback>;
}

#[async_trait::async_trait]
impl StackApi for PortainerApi {
    async fn deploy_stack(
        &self,
        session: &Session,
        endpoint: &str,
        info: &DeployNewStackInformation,
    ) -> Result<StackDeployFeedback> {
        validate_endpoint_id(endpoint)?;
        self.call_with_body(session, Method::POST, &deploy_stack_path(endpoint), info)
            .await?
            .error_for_status()?
            .json()
    }

    async fn list_stacks(&self, session: &Session) -> Result<Vec<StackDeployFeedback>> {
        self.call(session, Method::GET, STACKS_PATH)
            .await?
            .error_for_status()?
            .json()
    }

    async fn update_stack(
        &self,
        session: &Session,
        stack_id: i64,
        endpoint: &str,
        info: &UpdateStackInfo,
    ) -> Result<StackDeployFeedback> {
        validate_endpoint_id(endpoint)?;
        self.call_with_body(
            session,
            Method::PUT,
            &update_stack_path(stack_id, endpoint),
            info,
        )
        .await?
        .error_for_status()?
        .json()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeployOutcome {
    Created(StackDeployFeedback),
    Updated(StackDeployFeedback),
}

impl DeployOutcome {
    pub fn feedback(&self) -> &StackDeployFeedback {
        match self {
            DeployOutcome::Created(feedback) | DeployOutcome::Updated(feedback) => feedback,
        }
    }
}

/// Looks up the id of the last stack named `name`.
pub async fn stack_id_by_name<A: StackApi + ?Sized>(
    api: &A,
    session: &Session,
    name: &str,
) -> Result<i64> {
    let stacks = api.list_stacks(session).await?;
    find_stack_id(&stacks, name).ok_or_else(|| Error::NotFound(name.to_string()))
}

/// Creates the stack, or updates it when the create call is rejected.
///
/// Portainer does not give name collisions a status of their own, so every
/// non-2xx answer to the create call is treated as "probably exists" and
/// routed to lookup-by-name plus update. Transport and decode failures are
/// returned as-is. When the fallback fails too, both errors are kept in
/// [`Error::DeployFallback`].
pub async fn deploy_or_update<A: StackApi + ?Sized>(
    api: &A,
    session: &Session,
    request: &StackDeployRequest,
) -> Result<DeployOutcome> {
    info!(name = %request.name, endpoint = %request.endpoint, "deploying stack");

    let deploy_error = match api
        .deploy_stack(session, &request.endpoint, &request.deploy_info())
        .await
    {
        Ok(feedback) => {
            info!(id = feedback.id, name = %feedback.name, "stack created");
            return Ok(DeployOutcome::Created(feedback));
        }
        Err(err) if err.is_server() => err,
        Err(err) => return Err(err),
    };

    warn!(
        error = %deploy_error,
        name = %request.name,
        "deploying new stack failed, perhaps it already exists; trying update"
    );

    let fallback = async {
        let id = stack_id_by_name(api, session, &request.name).await?;
        info!(id, name = %request.name, "found existing stack");
        api.update_stack(session, id, &request.endpoint, &request.update_info())
            .await
    };

    match fallback.await {
        Ok(feedback) => {
            info!(id = feedback.id, name = %feedback.name, "stack updated");
            Ok(DeployOutcome::Updated(feedback))
        }
        Err(err) => Err(Error::DeployFallback {
            deploy: Box::new(deploy_error),
            fallback: Box::new(err),
        }),
    }
}
