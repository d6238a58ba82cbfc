//! Project and scenario operations.
//!
//! Saving is two sequential round trips: insert-or-ignore the parent
//! project, then upsert the scenario by its natural key. Both statements are
//! idempotent, so a failure between them leaves at most an empty project.

use chrono::SecondsFormat;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::HydraulicRepository;
use super::statements::{
    DELETE_SCENARIO, ENSURE_PROJECT, SELECT_PROJECT_SCENARIOS, SELECT_SCENARIO_DATA,
    SELECT_USER_PROJECTS, UPSERT_SCENARIO,
};
use crate::domain::ports::{SqlExecutor, SqlExecutorExt, StoreError};
use crate::domain::{ScenarioKey, Statement};

impl<E> HydraulicRepository<E>
where
    E: SqlExecutor + ?Sized,
{
    /// Save a scenario, creating its project on first use.
    ///
    /// The payload is stored as opaque JSON text.
    pub async fn save_scenario<T>(&self, key: &ScenarioKey, data: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let payload = serde_json::to_string(data)
            .map_err(|error| StoreError::payload(format!("serialise scenario: {error}")))?;
        let modified = self.clock.utc().to_rfc3339_opts(SecondsFormat::Micros, true);

        let project = Statement::new(ENSURE_PROJECT)
            .bind(key.username.as_str())
            .bind(key.project_name.as_str());
        self.executor.run(&project).await?;

        let scenario = Statement::new(UPSERT_SCENARIO)
            .bind(key.username.as_str())
            .bind(key.project_name.as_str())
            .bind(key.scenario_name.as_str())
            .bind(payload)
            .bind(modified);
        self.executor.run(&scenario).await
    }

    /// Load and deserialise a scenario payload.
    pub async fn load_scenario<T>(&self, key: &ScenarioKey) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let statement = Statement::new(SELECT_SCENARIO_DATA)
            .bind(key.username.as_str())
            .bind(key.project_name.as_str())
            .bind(key.scenario_name.as_str());
        let Some(row) = self.executor.fetch_one(&statement).await? else {
            return Ok(None);
        };
        let payload = row.text("scenario_data")?;
        serde_json::from_str(payload)
            .map(Some)
            .map_err(|error| StoreError::payload(format!("deserialise scenario: {error}")))
    }

    /// List a user's project names in ascending order.
    ///
    /// Projects whose last scenario was deleted remain listed.
    pub async fn get_user_projects(&self, username: &str) -> Result<Vec<String>, StoreError> {
        let statement = Statement::new(SELECT_USER_PROJECTS).bind(username);
        self.fetch_names(statement, "project_name").await
    }

    /// List scenario names in a project, most recently saved first.
    pub async fn get_scenarios_for_project(
        &self,
        username: &str,
        project_name: &str,
    ) -> Result<Vec<String>, StoreError> {
        let statement = Statement::new(SELECT_PROJECT_SCENARIOS)
            .bind(username)
            .bind(project_name);
        self.fetch_names(statement, "scenario_name").await
    }

    /// Delete a scenario. Succeeds when nothing matched.
    pub async fn delete_scenario(&self, key: &ScenarioKey) -> Result<(), StoreError> {
        let statement = Statement::new(DELETE_SCENARIO)
            .bind(key.username.as_str())
            .bind(key.project_name.as_str())
            .bind(key.scenario_name.as_str());
        self.executor.run(&statement).await
    }
}
