use sea_orm::TransactionTrait;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use super::ServiceContext;
use crate::errors::{ServiceError, ServiceResult};
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};
use crate::repositories::file::FileInput;
use crate::repositories::user::{self as repo, RolesUpdateMode, UserFilter, UserInput, UserRecord, UserUpdateInput};
use crate::security::{CurrentUser, Role};

/// A JSON field that accepts either a single value or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self { OneOrMany::Many(Vec::new()) }
}

impl<T: PartialEq> OneOrMany<T> {
    /// Values in submission order, duplicates removed.
    pub fn into_unique(self) -> Vec<T> {
        let items = match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(vs) => vs,
        };
        let mut out: Vec<T> = Vec::with_capacity(items.len());
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }
        out
    }
}

/// `POST /api/user` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInvite {
    #[serde(default)]
    pub emails: OneOrMany<String>,
    #[serde(default)]
    pub roles: OneOrMany<Role>,
}

/// `PUT /api/user` payload. With only `id` and `roles` it replaces the role
/// set; any profile field turns it into a full edit where omitted fields are cleared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEdit {
    pub id: Uuid,
    #[serde(default)]
    pub roles: OneOrMany<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub avatars: Option<Vec<FileInput>>,
}

impl UserEdit {
    fn touches_profile(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some() || self.phone_number.is_some() || self.avatars.is_some()
    }
}

fn require_user<'a>(ctx: &ServiceContext<'a>) -> ServiceResult<&'a CurrentUser> {
    ctx.current_user.ok_or(ServiceError::Unauthorized)
}

/// Invites users by email and grants them roles.
pub struct UserCreator<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> UserCreator<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self { Self { ctx } }

    /// Find or create each email, then add the roles. Existing roles are kept.
    #[instrument(skip(self, data))]
    pub async fn execute(&self, data: UserInvite) -> ServiceResult<()> {
        require_user(&self.ctx)?;
        let mut emails: Vec<String> = Vec::new();
        for email in data.emails.into_unique() {
            let email = email.trim().to_string();
            if !email.is_empty() && !emails.contains(&email) {
                emails.push(email);
            }
        }
        let roles = data.roles.into_unique();
        if emails.is_empty() || roles.is_empty() {
            return Err(ServiceError::validation("errors.validation.message"));
        }

        let txn = self.ctx.db.begin().await?;
        {
            let ctx = self.ctx.repo(&txn);
            for email in &emails {
                let user_id = match repo::find_by_email(&txn, email).await? {
                    Some(existing) => existing.id,
                    None => repo::create(&ctx, UserInput { email: email.clone(), ..Default::default() }).await?.user.id,
                };
                repo::update_roles(&txn, user_id, &roles, RolesUpdateMode::Add).await?;
            }
        }
        txn.commit().await?;
        info!(count = emails.len(), "users invited");
        Ok(())
    }
}

/// Edits another user's roles (and optionally profile).
pub struct UserEditor<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> UserEditor<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self { Self { ctx } }

    #[instrument(skip(self, data), fields(user_id = %data.id))]
    pub async fn update(&self, data: UserEdit) -> ServiceResult<UserRecord> {
        let current = require_user(&self.ctx)?;
        let full_edit = data.touches_profile();
        let roles = data.roles.clone().into_unique();

        let removes_own_admin = data.id == current.id
            && current.roles.contains(&Role::Admin)
            && !roles.contains(&Role::Admin);
        if removes_own_admin {
            return Err(ServiceError::validation("user.errors.revokingOwnPermission"));
        }

        let txn = self.ctx.db.begin().await?;
        let record = {
            let ctx = self.ctx.repo(&txn);
            if repo::find_live(&txn, data.id).await?.is_none() {
                return Err(ServiceError::validation("user.errors.userNotFound"));
            }
            if full_edit {
                let input = UserUpdateInput {
                    first_name: data.first_name,
                    last_name: data.last_name,
                    phone_number: data.phone_number,
                    roles: Some(roles),
                    avatars: data.avatars.unwrap_or_default(),
                };
                repo::update(&ctx, data.id, input).await?
            } else {
                repo::update_roles(&txn, data.id, &roles, RolesUpdateMode::Replace).await?;
                repo::find_by_id(&ctx, data.id).await?
            }
        };
        txn.commit().await?;
        info!(roles = ?record.roles, "user updated");
        Ok(record)
    }
}

pub struct UserDestroyer<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> UserDestroyer<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self { Self { ctx } }

    #[instrument(skip(self))]
    pub async fn destroy_all(&self, ids: &[Uuid]) -> ServiceResult<()> {
        let current = require_user(&self.ctx)?;
        if ids.contains(&current.id) {
            return Err(ServiceError::validation("user.errors.destroyingHimself"));
        }
        let txn = self.ctx.db.begin().await?;
        for id in ids {
            repo::destroy(&self.ctx.repo(&txn), *id).await?;
        }
        txn.commit().await?;
        info!(count = ids.len(), "users destroyed");
        Ok(())
    }
}

/// Read side of user management.
pub struct UserService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self { Self { ctx } }

    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<UserRecord> {
        repo::find_by_id(&self.ctx.read(), id).await
    }

    pub async fn find_and_count_all(&self, query: &ListQuery<UserFilter>) -> ServiceResult<FindAndCountAll<UserRecord>> {
        repo::find_and_count_all(&self.ctx.read(), query).await
    }

    pub async fn find_all_autocomplete(&self, search: Option<&str>, limit: Option<u64>) -> ServiceResult<Vec<AutocompleteItem>> {
        repo::find_all_autocomplete(self.ctx.db, search, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, test_storage};
    use sea_orm::DatabaseConnection;

    async fn seed_admin(db: &DatabaseConnection) -> anyhow::Result<CurrentUser> {
        let created = repo::create_from_auth(db, "root@example.com", Some("root"), &[Role::Admin], "hash".into()).await?;
        Ok(CurrentUser { id: created.id, email: created.email, roles: vec![Role::Admin] })
    }

    #[test]
    fn one_or_many_accepts_both_shapes() {
        let one: UserInvite = serde_json::from_str(r#"{"emails":"a@x.com","roles":"admin"}"#).unwrap();
        assert_eq!(one.emails.into_unique(), vec!["a@x.com".to_string()]);
        let many: UserInvite = serde_json::from_str(r#"{"emails":["a@x.com","a@x.com"],"roles":["custom","admin","custom"]}"#).unwrap();
        assert_eq!(many.emails.into_unique().len(), 1);
        assert_eq!(many.roles.into_unique(), vec![Role::Custom, Role::Admin]);
    }

    #[tokio::test]
    async fn invite_creates_missing_users_and_adds_roles() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let me = seed_admin(&db).await?;
        let ctx = ServiceContext::new(&db, &storage, Some(&me));

        let invite = UserInvite {
            emails: OneOrMany::Many(vec![" new@example.com ".into(), "root@example.com".into()]),
            roles: OneOrMany::One(Role::Custom),
        };
        UserCreator::new(ctx).execute(invite).await?;

        let users = UserService::new(ctx);
        let all = users.find_and_count_all(&ListQuery::default()).await?;
        assert_eq!(all.count, 2);
        let root = users.find_by_id(me.id).await?;
        assert_eq!(root.roles, vec![Role::Admin, Role::Custom]);
        let new_user = repo::find_by_email(&db, "new@example.com").await?.expect("invited");
        assert_eq!(repo::find_roles(&db, new_user.id).await?, vec![Role::Custom]);
        Ok(())
    }

    #[tokio::test]
    async fn invite_requires_emails_and_roles() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let me = seed_admin(&db).await?;
        let creator = UserCreator::new(ServiceContext::new(&db, &storage, Some(&me)));
        let no_roles = UserInvite { emails: OneOrMany::One("x@example.com".into()), roles: OneOrMany::default() };
        assert!(matches!(creator.execute(no_roles).await, Err(ServiceError::Validation(_))));
        let blank = UserInvite { emails: OneOrMany::One("  ".into()), roles: OneOrMany::One(Role::Admin) };
        assert!(matches!(creator.execute(blank).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn editor_guards_own_admin_role_and_unknown_users() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let me = seed_admin(&db).await?;
        let editor = UserEditor::new(ServiceContext::new(&db, &storage, Some(&me)));

        let own = UserEdit { id: me.id, roles: OneOrMany::One(Role::Custom), ..Default::default() };
        let err = editor.update(own).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(k) if k == "user.errors.revokingOwnPermission"));

        let ghost = UserEdit { id: Uuid::new_v4(), roles: OneOrMany::One(Role::Custom), ..Default::default() };
        let err = editor.update(ghost).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(k) if k == "user.errors.userNotFound"));

        let other = repo::create_from_auth(&db, "o@example.com", Some("o"), &[Role::Admin], "hash".into()).await?;
        let edited = editor.update(UserEdit { id: other.id, roles: OneOrMany::One(Role::Custom), ..Default::default() }).await?;
        assert_eq!(edited.roles, vec![Role::Custom]);
        assert_eq!(edited.user.first_name.as_deref(), Some("o"));

        let full = UserEdit {
            id: other.id,
            roles: OneOrMany::Many(vec![]),
            first_name: Some("Otto".into()),
            last_name: Some("Berg".into()),
            ..Default::default()
        };
        let edited = editor.update(full).await?;
        assert!(edited.roles.is_empty());
        assert_eq!(edited.user.full_name.as_deref(), Some("Otto Berg"));
        Ok(())
    }

    #[tokio::test]
    async fn destroyer_refuses_self() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let me = seed_admin(&db).await?;
        let other = repo::create_from_auth(&db, "o@example.com", None, &[], "hash".into()).await?;
        let destroyer = UserDestroyer::new(ServiceContext::new(&db, &storage, Some(&me)));

        let err = destroyer.destroy_all(&[other.id, me.id]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(k) if k == "user.errors.destroyingHimself"));
        destroyer.destroy_all(&[other.id]).await?;
        assert!(repo::find_live(&db, other.id).await?.is_none());

        let items = UserService::new(ServiceContext::new(&db, &storage, Some(&me))).find_all_autocomplete(Some("root"), None).await?;
        assert_eq!(items.len(), 1);
        Ok(())
    }
}
