use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Seating occupancy, shared by tables and chairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyStatus {
    Available,
    Occupied,
    Reserved,
    Cleaning,
}

impl OccupancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyStatus::Available => "available",
            OccupancyStatus::Occupied => "occupied",
            OccupancyStatus::Reserved => "reserved",
            OccupancyStatus::Cleaning => "cleaning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(OccupancyStatus::Available),
            "occupied" => Some(OccupancyStatus::Occupied),
            "reserved" => Some(OccupancyStatus::Reserved),
            "cleaning" => Some(OccupancyStatus::Cleaning),
            _ => None,
        }
    }
}

/// A physical table. Its chairs are generated once at creation time, one
/// per seat of `capacity`, and each tracks occupancy independently.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema, Validate)]
#[sea_orm(table_name = "dining_tables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub restaurant_id: Uuid,

    #[validate(length(min = 1, max = 20, message = "Table number must be 1-20 characters"))]
    pub number: String,

    pub section: Option<String>,
    pub capacity: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chair::Entity")]
    Chairs,
}

impl Related<super::chair::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chairs.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
