use super::client::{PortainerApi, Session};
use crate::domain::{
    ConfigCreated, CreateConfigBody, DockerConfig, config_create_path, config_path, configs_path,
    validate_config_id, validate_endpoint_id,
};
use crate::error::Result;
use reqwest::Method;
use std::collections::BTreeMap;
use tracing::info;

impl PortainerApi {
    /// `GET /api/endpoints/<endpoint>/docker/configs`
    pub async fn list_configs(&self, session: &Session, endpoint: &str) -> Result<Vec<DockerConfig>> {
        validate_endpoint_id(endpoint)?;
        self.call(session, Method::GET, &configs_path(endpoint))
            .await?
            .error_for_status()?
            .json()
    }

    /// `POST /api/endpoints/<endpoint>/docker/configs/create`
    pub async fn create_config(
        &self,
        session: &Session,
        endpoint: &str,
        name: &str,
        content: &[u8],
        labels: BTreeMap<String, String>,
    ) -> Result<ConfigCreated> {
        validate_endpoint_id(endpoint)?;
        let body = CreateConfigBody::new(name, content, labels);
        let response = self
            .call_with_body(session, Method::POST, &config_create_path(endpoint), &body)
            .await?
            .error_for_status()?;

        let mut created: ConfigCreated = response.json()?;
        created.status = response.status.as_u16();
        info!(id = %created.id, name, status = created.status, "config created");
        Ok(created)
    }

    /// `DELETE /api/endpoints/<endpoint>/docker/configs/<id>`
    pub async fn remove_config(&self, session: &Session, endpoint: &str, id: &str) -> Result<()> {
        validate_endpoint_id(endpoint)?;
        validate_config_id(id)?;
        self.call(session, Method::DELETE, &config_path(endpoint, id))
            .await?
            .error_for_status()?;
        info!(id, "config removed");
        Ok(())
    }
}
