use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batch_spec_mount")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Opaque external identifier, kept across upserts.
    #[sea_orm(unique)]
    pub rand_id: String,

    /// Owning `batch_spec.id`. Together with `path` and `file_name` the upsert key.
    #[sea_orm(unique_key = "spec_path_file")]
    pub batch_spec_id: i64,
    #[sea_orm(unique_key = "spec_path_file")]
    pub path: String,
    #[sea_orm(unique_key = "spec_path_file")]
    pub file_name: String,

    #[sea_orm(belongs_to, from = "batch_spec_id", to = "id")]
    pub batch_spec: HasOne<super::batch_spec::Entity>,

    /// Purposefully denormalized so existence checks never touch `content`.
    pub size: i64,

    #[serde(skip)]
    pub content: Vec<u8>,

    /// Client-reported modification time.
    pub modified_at: DateTimeUtc,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
