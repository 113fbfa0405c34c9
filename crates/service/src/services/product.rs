use sea_orm::TransactionTrait;
use tracing::{info, instrument};
use uuid::Uuid;

use super::ServiceContext;
use crate::errors::ServiceResult;
use crate::pagination::{AutocompleteItem, FindAndCountAll, ListQuery};
use crate::repositories::product::{self as repo, ProductFilter, ProductInput, ProductRecord};

pub struct ProductService<'a> {
    ctx: ServiceContext<'a>,
}

impl<'a> ProductService<'a> {
    pub fn new(ctx: ServiceContext<'a>) -> Self { Self { ctx } }

    #[instrument(skip(self, data))]
    pub async fn create(&self, data: ProductInput) -> ServiceResult<ProductRecord> {
        let txn = self.ctx.db.begin().await?;
        let record = repo::create(&self.ctx.repo(&txn), data).await?;
        txn.commit().await?;
        info!(product_id = %record.product.id, "product created");
        Ok(record)
    }

    #[instrument(skip(self, data))]
    pub async fn update(&self, id: Uuid, data: ProductInput) -> ServiceResult<ProductRecord> {
        let txn = self.ctx.db.begin().await?;
        let record = repo::update(&self.ctx.repo(&txn), id, data).await?;
        txn.commit().await?;
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn destroy_all(&self, ids: &[Uuid]) -> ServiceResult<()> {
        let txn = self.ctx.db.begin().await?;
        for id in ids {
            repo::destroy(&self.ctx.repo(&txn), *id).await?;
        }
        txn.commit().await?;
        info!(count = ids.len(), "products destroyed");
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> ServiceResult<ProductRecord> {
        repo::find_by_id(&self.ctx.read(), id).await
    }

    pub async fn find_all_autocomplete(&self, search: Option<&str>, limit: Option<u64>) -> ServiceResult<Vec<AutocompleteItem>> {
        repo::find_all_autocomplete(self.ctx.db, search, limit).await
    }

    pub async fn find_and_count_all(&self, query: &ListQuery<ProductFilter>) -> ServiceResult<FindAndCountAll<ProductRecord>> {
        repo::find_and_count_all(&self.ctx.read(), query).await
    }
}
