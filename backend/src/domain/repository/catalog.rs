//! Custom fluid and material catalog operations.

use super::HydraulicRepository;
use super::statements::{
    DELETE_FLUID, DELETE_MATERIAL, INSERT_FLUID, INSERT_MATERIAL, SELECT_USER_FLUIDS,
    SELECT_USER_MATERIALS,
};
use crate::domain::ports::{SqlExecutor, SqlExecutorExt, StoreError};
use crate::domain::{FluidCatalog, FluidProperties, MaterialCatalog, NewFluid, Statement};

impl<E> HydraulicRepository<E>
where
    E: SqlExecutor + ?Sized,
{
    /// Add a fluid. Returns `false` when the user already has one with this
    /// name; the stored properties are left untouched.
    pub async fn add_fluid(
        &self,
        username: &str,
        fluid_name: &str,
        fluid: &NewFluid,
    ) -> Result<bool, StoreError> {
        let statement = Statement::new(INSERT_FLUID)
            .bind(username)
            .bind(fluid_name)
            .bind(fluid.density)
            .bind(fluid.kinematic_viscosity)
            .bind(fluid.vapor_pressure_kpa);
        self.insert_unique(statement, "fluid").await
    }

    /// Fetch a user's fluids keyed by name.
    pub async fn get_user_fluids(&self, username: &str) -> Result<FluidCatalog, StoreError> {
        let statement = Statement::new(SELECT_USER_FLUIDS).bind(username);
        self.executor
            .fetch_all(&statement)
            .await?
            .iter()
            .map(|row| -> Result<(String, FluidProperties), StoreError> {
                let properties = FluidProperties {
                    density: row.real("density")?,
                    kinematic_viscosity: row.real("kinematic_viscosity")?,
                    vapor_pressure_kpa: row.optional_real("vapor_pressure_kpa")?,
                };
                Ok((row.text("fluid_name")?.to_owned(), properties))
            })
            .collect()
    }

    /// Delete a fluid. Succeeds when nothing matched.
    pub async fn delete_user_fluid(&self, username: &str, fluid_name: &str) -> Result<(), StoreError> {
        let statement = Statement::new(DELETE_FLUID).bind(username).bind(fluid_name);
        self.executor.run(&statement).await
    }

    /// Add a pipe material. Returns `false` when the name is already taken.
    pub async fn add_material(
        &self,
        username: &str,
        material_name: &str,
        roughness: f64,
    ) -> Result<bool, StoreError> {
        let statement = Statement::new(INSERT_MATERIAL)
            .bind(username)
            .bind(material_name)
            .bind(roughness);
        self.insert_unique(statement, "material").await
    }

    /// Fetch a user's materials keyed by name.
    pub async fn get_user_materials(&self, username: &str) -> Result<MaterialCatalog, StoreError> {
        let statement = Statement::new(SELECT_USER_MATERIALS).bind(username);
        self.executor
            .fetch_all(&statement)
            .await?
            .iter()
            .map(|row| -> Result<(String, f64), StoreError> {
                Ok((row.text("material_name")?.to_owned(), row.real("roughness")?))
            })
            .collect()
    }

    /// Delete a pipe material. Succeeds when nothing matched.
    pub async fn delete_user_material(
        &self,
        username: &str,
        material_name: &str,
    ) -> Result<(), StoreError> {
        let statement = Statement::new(DELETE_MATERIAL)
            .bind(username)
            .bind(material_name);
        self.executor.run(&statement).await
    }
}
