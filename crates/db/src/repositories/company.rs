//! Company repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use benefit_core::application::CompanySnapshot;

use super::convert::now;
use crate::entities::companies;

/// Company repository.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<companies::Model>, DbErr> {
        companies::Entity::find_by_id(id).one(&self.db).await
    }

    /// Finds a company by its business id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_business_id(
        &self,
        business_id: &str,
    ) -> Result<Option<companies::Model>, DbErr> {
        companies::Entity::find()
            .filter(companies::Column::BusinessId.eq(business_id))
            .one(&self.db)
            .await
    }

    /// Creates a company from registry data.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, e.g. on a duplicate business id.
    pub async fn create(
        &self,
        company: &CompanySnapshot,
        bank_account_number: Option<&str>,
    ) -> Result<companies::Model, DbErr> {
        let now = now();
        companies::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(company.name.clone()),
            business_id: Set(company.business_id.clone()),
            company_form_code: Set(company.company_form_code),
            street_address: Set(company.address.street_address.clone()),
            postcode: Set(company.address.postcode.clone()),
            city: Set(company.address.city.clone()),
            bank_account_number: Set(bank_account_number.map(str::to_string)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }
}
