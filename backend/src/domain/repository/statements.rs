//! SQL templates issued by Repository Operations.

pub(crate) const INSERT_USER: &str =
    "INSERT INTO users (username, password, name, email) VALUES (?, ?, ?, ?)";
pub(crate) const SELECT_USER: &str =
    "SELECT username, password, name, email FROM users WHERE username = ?";

pub(crate) const ENSURE_PROJECT: &str =
    "INSERT OR IGNORE INTO projects (username, project_name) VALUES (?, ?)";
pub(crate) const UPSERT_SCENARIO: &str = "INSERT INTO scenarios \
     (username, project_name, scenario_name, scenario_data, last_modified) \
     VALUES (?, ?, ?, ?, ?) \
     ON CONFLICT(username, project_name, scenario_name) DO UPDATE SET \
     scenario_data = excluded.scenario_data, last_modified = excluded.last_modified";
pub(crate) const SELECT_SCENARIO_DATA: &str = "SELECT scenario_data FROM scenarios \
     WHERE username = ? AND project_name = ? AND scenario_name = ?";
pub(crate) const SELECT_USER_PROJECTS: &str =
    "SELECT project_name FROM projects WHERE username = ? ORDER BY project_name ASC";
pub(crate) const SELECT_PROJECT_SCENARIOS: &str = "SELECT scenario_name FROM scenarios \
     WHERE username = ? AND project_name = ? ORDER BY last_modified DESC";
pub(crate) const DELETE_SCENARIO: &str = "DELETE FROM scenarios \
     WHERE username = ? AND project_name = ? AND scenario_name = ?";

pub(crate) const INSERT_FLUID: &str = "INSERT INTO user_fluids \
     (username, fluid_name, density, kinematic_viscosity, vapor_pressure_kpa) \
     VALUES (?, ?, ?, ?, ?)";
pub(crate) const SELECT_USER_FLUIDS: &str = "SELECT fluid_name, density, kinematic_viscosity, \
     vapor_pressure_kpa FROM user_fluids WHERE username = ?";
pub(crate) const DELETE_FLUID: &str =
    "DELETE FROM user_fluids WHERE username = ? AND fluid_name = ?";

pub(crate) const INSERT_MATERIAL: &str =
    "INSERT INTO user_materials (username, material_name, roughness) VALUES (?, ?, ?)";
pub(crate) const SELECT_USER_MATERIALS: &str =
    "SELECT material_name, roughness FROM user_materials WHERE username = ?";
pub(crate) const DELETE_MATERIAL: &str =
    "DELETE FROM user_materials WHERE username = ? AND material_name = ?";
