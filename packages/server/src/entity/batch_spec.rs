use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batch_spec")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Opaque external identifier.
    #[sea_orm(unique)]
    pub rand_id: String,

    #[sea_orm(has_many)]
    pub mounts: HasMany<super::batch_spec_mount::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
