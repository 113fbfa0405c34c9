use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permissions::Permission;
use super::roles::Role;
use super::storage::Storage;
use crate::errors::ServiceError;

/// The authenticated caller as seen by permission checks and audit columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<Role>,
}

pub struct PermissionChecker<'a> {
    current_user: Option<&'a CurrentUser>,
}

impl<'a> PermissionChecker<'a> {
    pub fn new(current_user: Option<&'a CurrentUser>) -> Self {
        Self { current_user }
    }

    fn roles(&self) -> &[Role] {
        self.current_user.map(|u| u.roles.as_slice()).unwrap_or(&[])
    }

    pub fn has(&self, permission: &Permission) -> bool {
        self.roles().iter().any(|r| permission.allowed_roles.contains(r))
    }

    /// Missing user is 401, a user without the permission is 403.
    pub fn validate_has(&self, permission: &Permission) -> Result<(), ServiceError> {
        if self.current_user.is_none() {
            return Err(ServiceError::Unauthorized);
        }
        if !self.has(permission) {
            return Err(ServiceError::Forbidden);
        }
        Ok(())
    }

    pub fn allowed_storage_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = Vec::new();
        for permission in Permission::all().iter().filter(|p| self.has(p)) {
            for storage in permission.allowed_storage {
                if !ids.contains(&storage.id) {
                    ids.push(storage.id);
                }
            }
        }
        ids
    }

    pub fn has_storage(&self, storage_id: &str) -> bool {
        self.allowed_storage_ids().contains(&storage_id)
    }

    pub fn validate_has_storage(&self, storage_id: &str) -> Result<(), ServiceError> {
        if self.current_user.is_none() {
            return Err(ServiceError::Unauthorized);
        }
        if !self.has_storage(storage_id) {
            return Err(ServiceError::Forbidden);
        }
        Ok(())
    }

    /// Storage grant check used for uploads: storages that bypass writing
    /// permissions only require an authenticated caller.
    pub fn validate_can_write_to(&self, storage: &Storage) -> Result<(), ServiceError> {
        if storage.bypass_writing_permissions {
            return if self.is_authenticated() { Ok(()) } else { Err(ServiceError::Unauthorized) };
        }
        self.validate_has_storage(storage.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_user.is_some()
    }

    /// Signed in but holding no role at all.
    pub fn is_empty_permissions(&self) -> bool {
        self.is_authenticated() && self.roles().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: Vec<Role>) -> CurrentUser {
        CurrentUser { id: Uuid::new_v4(), email: "u@example.com".into(), roles }
    }

    #[test]
    fn admin_has_everything() {
        let admin = user(vec![Role::Admin]);
        let checker = PermissionChecker::new(Some(&admin));
        assert!(Permission::all().iter().all(|p| checker.has(p)));
        assert!(checker.validate_has(&Permission::USER_DESTROY).is_ok());
    }

    #[test]
    fn custom_reads_but_cannot_write() {
        let custom = user(vec![Role::Custom]);
        let checker = PermissionChecker::new(Some(&custom));
        assert!(checker.has(&Permission::CUSTOMER_READ));
        assert!(checker.has(&Permission::USER_AUTOCOMPLETE));
        assert!(!checker.has(&Permission::USER_READ));
        assert!(matches!(checker.validate_has(&Permission::PRODUCT_CREATE), Err(ServiceError::Forbidden)));
    }

    #[test]
    fn anonymous_is_unauthorized() {
        let checker = PermissionChecker::new(None);
        assert!(!checker.has(&Permission::CUSTOMER_READ));
        assert!(matches!(checker.validate_has(&Permission::CUSTOMER_READ), Err(ServiceError::Unauthorized)));
        assert!(!checker.is_authenticated());
        assert!(!checker.is_empty_permissions());
    }

    #[test]
    fn storage_ids_follow_granted_permissions() {
        let admin = user(vec![Role::Admin]);
        let checker = PermissionChecker::new(Some(&admin));
        assert_eq!(checker.allowed_storage_ids(), vec!["productPhotos", "orderAttachments"]);
        assert!(checker.validate_has_storage("productPhotos").is_ok());

        let custom = user(vec![Role::Custom]);
        let checker = PermissionChecker::new(Some(&custom));
        assert!(checker.allowed_storage_ids().is_empty());
        assert!(matches!(checker.validate_has_storage("productPhotos"), Err(ServiceError::Forbidden)));
    }

    #[test]
    fn avatar_storage_needs_only_authentication() {
        let nobody = user(vec![]);
        let checker = PermissionChecker::new(Some(&nobody));
        assert!(checker.is_empty_permissions());
        assert!(checker.validate_can_write_to(&Storage::USER_AVATARS_PROFILES).is_ok());
        assert!(checker.validate_can_write_to(&Storage::PRODUCT_PHOTOS).is_err());
        assert!(matches!(
            PermissionChecker::new(None).validate_can_write_to(&Storage::USER_AVATARS_PROFILES),
            Err(ServiceError::Unauthorized)
        ));
    }
}
