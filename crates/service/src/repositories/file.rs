use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use models::file;

use super::RepoCtx;
use crate::errors::ServiceError;
use crate::filter::now;
use crate::storage::LocalStorage;

/// File as submitted inside an entity payload. Files flagged `new` are
/// inserted; the others identify files to keep.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub size_in_bytes: Option<i64>,
    pub private_url: Option<String>,
    pub public_url: Option<String>,
    #[serde(default)]
    pub new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub name: String,
    pub size_in_bytes: Option<i64>,
    pub private_url: Option<String>,
    pub public_url: Option<String>,
    pub download_url: Option<String>,
}

/// Owner of a set of files: table, column and row.
#[derive(Debug, Clone, Copy)]
pub struct Relation<'a> {
    pub belongs_to: &'a str,
    pub belongs_to_column: &'a str,
    pub belongs_to_id: Uuid,
}

impl<'a> Relation<'a> {
    pub fn new(belongs_to: &'a str, belongs_to_column: &'a str, belongs_to_id: Uuid) -> Self {
        Self { belongs_to, belongs_to_column, belongs_to_id }
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if self.belongs_to.is_empty() || self.belongs_to_column.is_empty() || self.belongs_to_id.is_nil() {
            return Err(ServiceError::Internal("file relation requires belongs_to, belongs_to_column and belongs_to_id".into()));
        }
        Ok(())
    }
}

/// Make the live files of `relation` match `files`: drop the ones not
/// submitted, insert the ones flagged `new`.
pub async fn replace_relation_files<C: ConnectionTrait>(
    ctx: &RepoCtx<'_, C>,
    relation: Relation<'_>,
    files: &[FileInput],
) -> Result<(), ServiceError> {
    relation.validate()?;

    let kept: Vec<Uuid> = files.iter().filter(|f| !f.new).filter_map(|f| f.id).collect();
    let mut stale = file::Entity::update_many()
        .col_expr(file::Column::DeletedAt, Expr::value(now()))
        .filter(file::Column::BelongsTo.eq(relation.belongs_to))
        .filter(file::Column::BelongsToColumn.eq(relation.belongs_to_column))
        .filter(file::Column::BelongsToId.eq(relation.belongs_to_id))
        .filter(file::Column::DeletedAt.is_null());
    if !kept.is_empty() {
        stale = stale.filter(file::Column::Id.is_not_in(kept));
    }
    let removed = stale.exec(ctx.conn).await?;

    let mut added = 0;
    for input in files.iter().filter(|f| f.new) {
        file::validate_name(&input.name)?;
        if let Some(private_url) = &input.private_url {
            LocalStorage::validate_private_url(private_url)?;
        }
        let ts = now();
        file::ActiveModel {
            id: Set(Uuid::new_v4()),
            belongs_to: Set(relation.belongs_to.to_string()),
            belongs_to_id: Set(relation.belongs_to_id),
            belongs_to_column: Set(relation.belongs_to_column.to_string()),
            name: Set(input.name.trim().to_string()),
            size_in_bytes: Set(input.size_in_bytes),
            private_url: Set(input.private_url.clone()),
            public_url: Set(input.public_url.clone()),
            created_by_id: Set(ctx.user_id()),
            updated_by_id: Set(ctx.user_id()),
            created_at: Set(ts),
            updated_at: Set(ts),
            deleted_at: Set(None),
        }
        .insert(ctx.conn)
        .await?;
        added += 1;
    }
    debug!(belongs_to = relation.belongs_to, column = relation.belongs_to_column, removed = removed.rows_affected, added, "relation files replaced");
    Ok(())
}

pub async fn find_for<C: ConnectionTrait>(conn: &C, relation: Relation<'_>) -> Result<Vec<file::Model>, ServiceError> {
    Ok(file::Entity::find()
        .filter(file::Column::BelongsTo.eq(relation.belongs_to))
        .filter(file::Column::BelongsToColumn.eq(relation.belongs_to_column))
        .filter(file::Column::BelongsToId.eq(relation.belongs_to_id))
        .filter(file::Column::DeletedAt.is_null())
        .order_by_asc(file::Column::CreatedAt)
        .all(conn)
        .await?)
}

/// `download_url` is the public URL when set, otherwise the storage download
/// link for the private URL.
pub fn fill_download_url(files: Vec<file::Model>, storage: &LocalStorage) -> Vec<FileRecord> {
    files
        .into_iter()
        .map(|f| {
            let download_url = f
                .public_url
                .clone()
                .or_else(|| f.private_url.as_deref().map(|p| storage.download_url(p)));
            FileRecord {
                id: f.id,
                name: f.name,
                size_in_bytes: f.size_in_bytes,
                private_url: f.private_url,
                public_url: f.public_url,
                download_url,
            }
        })
        .collect()
}

pub async fn find_records<C: ConnectionTrait>(ctx: &RepoCtx<'_, C>, relation: Relation<'_>) -> Result<Vec<FileRecord>, ServiceError> {
    let files = find_for(ctx.conn, relation).await?;
    Ok(fill_download_url(files, ctx.storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, test_storage};

    fn new_file(name: &str, private_url: &str) -> FileInput {
        FileInput { name: name.into(), private_url: Some(private_url.into()), size_in_bytes: Some(3), new: true, ..Default::default() }
    }

    #[tokio::test]
    async fn replace_keeps_submitted_and_drops_the_rest() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        let owner = Uuid::new_v4();
        let rel = Relation::new("products", "photos", owner);

        replace_relation_files(&ctx, rel, &[new_file("a.png", "product/photos/a.png"), new_file("b.png", "product/photos/b.png")]).await?;
        let files = find_records(&ctx, rel).await?;
        assert_eq!(files.len(), 2);
        assert!(files[0].download_url.as_deref().unwrap().contains("privateUrl=product%2Fphotos%2F"));

        let keep = FileInput { id: Some(files[0].id), name: files[0].name.clone(), ..Default::default() };
        replace_relation_files(&ctx, rel, &[keep, new_file("c.png", "product/photos/c.png")]).await?;
        let names: Vec<String> = find_records(&ctx, rel).await?.into_iter().map(|f| f.name).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&files[0].name));
        assert!(names.contains(&"c.png".to_string()));

        replace_relation_files(&ctx, rel, &[]).await?;
        assert!(find_records(&ctx, rel).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn rejects_escaping_private_urls() -> anyhow::Result<()> {
        let db = get_db().await?;
        let storage = test_storage();
        let ctx = RepoCtx::new(&db, None, &storage);
        let rel = Relation::new("orders", "attachments", Uuid::new_v4());
        let err = replace_relation_files(&ctx, rel, &[new_file("x", "../../etc/passwd")]).await;
        assert!(matches!(err, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[test]
    fn public_url_wins_over_private() {
        let storage = test_storage();
        let ts = now();
        let model = file::Model {
            id: Uuid::new_v4(),
            belongs_to: "products".into(),
            belongs_to_id: Uuid::new_v4(),
            belongs_to_column: "photos".into(),
            name: "p.png".into(),
            size_in_bytes: None,
            private_url: Some("product/photos/p.png".into()),
            public_url: Some("https://cdn.example.com/p.png".into()),
            created_by_id: None,
            updated_by_id: None,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
        };
        let records = fill_download_url(vec![model], &storage);
        assert_eq!(records[0].download_url.as_deref(), Some("https://cdn.example.com/p.png"));
    }
}
