//! Scenario natural keys.

/// The natural key of a saved scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenarioKey {
    /// Owning user.
    pub username: String,
    /// Parent project; created on first save.
    pub project_name: String,
    /// Scenario name, unique within the project.
    pub scenario_name: String,
}

impl ScenarioKey {
    /// Build a key from its three parts.
    pub fn new(
        username: impl Into<String>,
        project_name: impl Into<String>,
        scenario_name: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            project_name: project_name.into(),
            scenario_name: scenario_name.into(),
        }
    }
}
