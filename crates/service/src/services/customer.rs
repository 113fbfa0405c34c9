use sea_orm::TransactionTrait;
use tracing::{info, instrument};
use uuid::Uuid;

use models::customer;

use super::ServiceContext;
use crate::errors::ServiceResult;
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};
use crate::repositories::customer::{self as repo, CustomerFilter, CustomerInput};

pub struct CustomerService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> CustomerService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self { Self { ctx } }

    #[instrument(skip(self, data))]
    pub async fn create(&self, data: CustomerInput) -> ServiceResult<customer::Model> {
        let txn = self.ctx.db.begin().await?;
        let record = repo::create(&self.ctx.repo(&txn), data).await?;
        txn.commit().await?;
        info!(customer_id = %record.id, "customer created");
        Ok(record)
    }

    #[instrument(skip(self, data))]
    pub async fn update(&self, id: Uuid, data: CustomerInput) -> ServiceResult<customer::Model> {
        let txn = self.ctx.db.begin().await?;
        let record = repo::update(&self.ctx.repo(&txn), id, data).await?;
        txn.commit().await?;
        Ok(record)
    }

    /// Soft-delete every id, or none of them.
    #[instrument(skip(self))]
    pub async fn destroy_all(&self, ids: &[Uuid]) -> ServiceResult<()> {
        let txn = self.ctx.db.begin().await?;
        for id in ids {
            repo::destroy(&self.ctx.repo(&txn), *id).await?;
        }
        txn.commit().await?;
        info!(count = ids.len(), "customers destroyed");
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<customer::Model> {
        repo::find_by_id(&self.ctx.read(), id).await
    }

    pub async fn find_all_autocomplete(&self, search: Option<&str>, limit: Option<u64>) -> ServiceResult<Vec<AutocompleteItem>> {
        repo::find_all_autocomplete(self.ctx.db, search, limit).await
    }

    pub async fn find_and_count_all(&self, query: &ListQuery<CustomerFilter>) -> ServiceResult<FindAndCountAll<customer::Model>> {
        repo::find_and_count_all(&self.ctx.read(), query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::test_support::{admin, get_db, test_storage};

    fn input(name: &str) -> CustomerInput {
        CustomerInput { name: name.into(), birthdate: None, gender: None }
    }

    #[tokio::test]
    async fn destroy_all_is_all_or_nothing() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let me = admin();
        let svc = CustomerService::new(ServiceContext::new(&db, &storage, Some(&me)));

        let a = svc.create(input("Alpha")).await?;
        let b = svc.create(input("Beta")).await?;

        let err = svc.destroy_all(&[a.id, Uuid::new_v4()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(svc.find_by_id(a.id).await.is_ok());

        svc.destroy_all(&[a.id, b.id]).await?;
        let all = svc.find_and_count_all(&ListQuery::default()).await?;
        assert_eq!(all.count, 0);
        Ok(())
    }

    #[tokio::test]
    async fn update_and_autocomplete() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let me = admin();
        let svc = CustomerService::new(ServiceContext::new(&db, &storage, Some(&me)));

        let c = svc.create(input("Alpha")).await?;
        let updated = svc.update(c.id, input("  Gamma ")).await?;
        assert_eq!(updated.name, "Gamma");

        let found = svc.find_all_autocomplete(Some("gam"), None).await?;
        assert_eq!(found, vec![AutocompleteItem { id: c.id.to_string(), label: "Gamma".into() }]);
        assert!(svc.create(input("  ")).await.is_err());
        Ok(())
    }
}
