//! Warehouse and user lists needed to resolve names to ids
//!
//! Loaded fresh for every webhook invocation and passed down explicitly, so
//! concurrent invocations never share lookup state.

use tracing::info;

use super::client::OrderApi;
use super::error::SyncError;
use super::models::{User, Warehouse};
use crate::core_types::{UserId, WarehouseId};

#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub warehouses: Vec<Warehouse>,
    pub users: Vec<User>,
}

impl ReferenceData {
    pub fn new(warehouses: Vec<Warehouse>, users: Vec<User>) -> Self {
        Self { warehouses, users }
    }

    /// Issue `/warehouses` then `/users?showInactive=false`.
    pub async fn load(api: &dyn OrderApi) -> Result<Self, SyncError> {
        let warehouses = api.list_warehouses().await?;
        let users = api.list_users().await?;

        info!(
            "Warehouses found: {}",
            warehouses
                .iter()
                .map(|w| w.warehouse_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        info!(
            "User accounts found: {}",
            users
                .iter()
                .map(|u| u.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self::new(warehouses, users))
    }

    /// First warehouse flagged `isDefault`. Extra defaults are ignored.
    pub fn default_warehouse(&self) -> Result<&Warehouse, SyncError> {
        self.warehouses
            .iter()
            .find(|w| w.is_default)
            .ok_or(SyncError::NoDefaultWarehouse)
    }

    pub fn warehouse_id(&self, warehouse_name: &str) -> Result<WarehouseId, SyncError> {
        self.warehouses
            .iter()
            .find(|w| w.warehouse_name == warehouse_name)
            .map(|w| w.warehouse_id)
            .ok_or_else(|| SyncError::WarehouseNotFound(warehouse_name.to_string()))
    }

    /// Each warehouse has one responsible user whose name equals the warehouse name.
    pub fn user_id(&self, warehouse_name: &str) -> Result<UserId, SyncError> {
        self.users
            .iter()
            .find(|u| u.name == warehouse_name)
            .map(|u| u.user_id.clone())
            .ok_or_else(|| SyncError::UserNotFound(warehouse_name.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn warehouse(id: WarehouseId, name: &str, is_default: bool) -> Warehouse {
        Warehouse {
            warehouse_id: id,
            warehouse_name: name.to_string(),
            is_default,
        }
    }

    pub(crate) fn user(id: &str, name: &str) -> User {
        User {
            user_id: id.to_string(),
            name: name.to_string(),
            user_name: None,
        }
    }

    /// EAST (id 5, default) and WEST (id 7), one user per warehouse
    pub(crate) fn east_west() -> ReferenceData {
        ReferenceData::new(
            vec![warehouse(5, "EAST", true), warehouse(7, "WEST", false)],
            vec![user("u-east", "EAST"), user("u-west", "WEST")],
        )
    }

    #[test]
    fn test_lookups() {
        let refs = east_west();
        assert_eq!(refs.warehouse_id("WEST").unwrap(), 7);
        assert_eq!(refs.user_id("EAST").unwrap(), "u-east");
        assert_eq!(refs.default_warehouse().unwrap().warehouse_name, "EAST");
    }

    #[test]
    fn test_unknown_names_fail() {
        let refs = east_west();
        assert!(matches!(
            refs.warehouse_id("NORTH"),
            Err(SyncError::WarehouseNotFound(name)) if name == "NORTH"
        ));
        assert!(matches!(
            refs.user_id("NORTH"),
            Err(SyncError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_first_default_wins() {
        let refs = ReferenceData::new(
            vec![
                warehouse(1, "A", false),
                warehouse(2, "B", true),
                warehouse(3, "C", true),
            ],
            vec![],
        );
        assert_eq!(refs.default_warehouse().unwrap().warehouse_id, 2);
    }

    #[test]
    fn test_no_default_is_an_error() {
        let refs = ReferenceData::new(vec![warehouse(1, "A", false)], vec![]);
        assert!(matches!(
            refs.default_warehouse(),
            Err(SyncError::NoDefaultWarehouse)
        ));
    }
}
