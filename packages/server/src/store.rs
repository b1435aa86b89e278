//! [`BatchesStore`] backed by the relational database.

use async_trait::async_trait;
use batches_common::{
    BatchSpec, BatchSpecMount, BatchesStore, GetBatchSpecMountOpts, GetBatchSpecOpts,
    ListBatchSpecMountsOpts, StoreError,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::entity::{batch_spec, batch_spec_mount};

pub struct DatabaseStore {
    db: DatabaseConnection,
}

impl DatabaseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn db_err(err: DbErr) -> StoreError {
    StoreError::Database(err.to_string())
}

impl From<batch_spec::Model> for BatchSpec {
    fn from(model: batch_spec::Model) -> Self {
        Self {
            id: model.id,
            rand_id: model.rand_id,
        }
    }
}

impl From<batch_spec_mount::Model> for BatchSpecMount {
    fn from(model: batch_spec_mount::Model) -> Self {
        Self {
            batch_spec_id: model.batch_spec_id,
            rand_id: model.rand_id,
            path: model.path,
            file_name: model.file_name,
            size: model.size,
            content: model.content,
            modified_at: model.modified_at,
        }
    }
}

#[async_trait]
impl BatchesStore for DatabaseStore {
    async fn get_batch_spec(&self, opts: GetBatchSpecOpts) -> Result<BatchSpec, StoreError> {
        batch_spec::Entity::find()
            .filter(batch_spec::Column::RandId.eq(&opts.rand_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(BatchSpec::from)
            .ok_or_else(|| StoreError::NotFound(format!("batch spec {}", opts.rand_id)))
    }

    async fn get_batch_spec_mount(
        &self,
        opts: GetBatchSpecMountOpts,
    ) -> Result<BatchSpecMount, StoreError> {
        batch_spec_mount::Entity::find()
            .filter(batch_spec_mount::Column::RandId.eq(&opts.rand_id))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(BatchSpecMount::from)
            .ok_or_else(|| StoreError::NotFound(format!("batch spec mount {}", opts.rand_id)))
    }

    async fn count_batch_spec_mounts(
        &self,
        opts: ListBatchSpecMountsOpts,
    ) -> Result<u64, StoreError> {
        let mut query = batch_spec_mount::Entity::find();
        if let Some(rand_id) = &opts.rand_id {
            query = query.filter(batch_spec_mount::Column::RandId.eq(rand_id));
        }
        if let Some(batch_spec_id) = opts.batch_spec_id {
            query = query.filter(batch_spec_mount::Column::BatchSpecId.eq(batch_spec_id));
        }
        query.count(&self.db).await.map_err(db_err)
    }

    async fn upsert_batch_spec_mount(
        &self,
        mount: &BatchSpecMount,
    ) -> Result<BatchSpecMount, StoreError> {
        let owner = batch_spec::Entity::find_by_id(mount.batch_spec_id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if owner.is_none() {
            return Err(StoreError::NotFound(format!(
                "batch spec with id {}",
                mount.batch_spec_id
            )));
        }

        let now = Utc::now();
        let model = batch_spec_mount::ActiveModel {
            rand_id: Set(Uuid::now_v7().to_string()),
            batch_spec_id: Set(mount.batch_spec_id),
            path: Set(mount.path.clone()),
            file_name: Set(mount.file_name.clone()),
            size: Set(mount.size),
            content: Set(mount.content.clone()),
            modified_at: Set(mount.modified_at),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        batch_spec_mount::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    batch_spec_mount::Column::BatchSpecId,
                    batch_spec_mount::Column::Path,
                    batch_spec_mount::Column::FileName,
                ])
                .update_columns([
                    batch_spec_mount::Column::Size,
                    batch_spec_mount::Column::Content,
                    batch_spec_mount::Column::ModifiedAt,
                    batch_spec_mount::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        batch_spec_mount::Entity::find()
            .filter(batch_spec_mount::Column::BatchSpecId.eq(mount.batch_spec_id))
            .filter(batch_spec_mount::Column::Path.eq(&mount.path))
            .filter(batch_spec_mount::Column::FileName.eq(&mount.file_name))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(BatchSpecMount::from)
            .ok_or_else(|| StoreError::Database("batch spec mount missing after upsert".into()))
    }
}
