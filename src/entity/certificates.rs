//! 证书实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub enrollment_id: i64,
    #[sea_orm(unique)]
    pub certificate_number: String,
    pub file_path: Option<String>,
    pub issued_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::enrollments::Entity",
        from = "Column::EnrollmentId",
        to = "super::enrollments::Column::Id"
    )]
    Enrollment,
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_certificate(self) -> crate::models::certificates::entities::Certificate {
        use chrono::{DateTime, Utc};

        crate::models::certificates::entities::Certificate {
            id: self.id,
            enrollment_id: self.enrollment_id,
            certificate_number: self.certificate_number,
            file_path: self.file_path,
            issued_at: DateTime::<Utc>::from_timestamp(self.issued_at, 0).unwrap_or_default(),
        }
    }
}
