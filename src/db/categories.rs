//! Category CRUD with the creator joined in.

use crate::api::{from_row, to_row, Embed, Query, RowStore, Select, StoreError, Table};
use crate::libs::category::{Category, CategoryUpdate, NewCategory};
use crate::libs::error::{Error, Result};
use crate::libs::row_id::RowId;

const CATEGORY_COLUMNS: &[&str] = &["category_id", "name", "description", "color", "created_at", "creator_id"];

pub struct Categories<'a, S: RowStore> {
    store: &'a S,
}

impl<'a, S: RowStore> Categories<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Category columns plus the creator's username.
    fn select() -> Select {
        Select::columns(CATEGORY_COLUMNS).embed(Embed::new("creator", Table::Users, "creator_id", &["user_id", "username"]))
    }

    fn by_id(category_id: &RowId) -> Query {
        Query::new(Table::Categories).eq("category_id", category_id)
    }

    /// All categories, newest first.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let query = Query::new(Table::Categories)
            .select(Self::select())
            .order_by("created_at", false);
        self.store.fetch(&query).await?.into_iter().map(from_row).collect()
    }

    pub async fn get(&self, category_id: &RowId) -> Result<Category> {
        let row = self.store.fetch_one(&Self::by_id(category_id).select(Self::select())).await?;
        from_row(row)
    }

    pub async fn create(&self, category: &NewCategory) -> Result<Category> {
        if category.name.trim().is_empty() {
            return Err(Error::required("name"));
        }
        let row = self
            .store
            .insert(Table::Categories, to_row(category)?, &Self::select())
            .await?;
        from_row(row)
    }

    pub async fn update(&self, category_id: &RowId, update: &CategoryUpdate) -> Result<Category> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(Error::required("name"));
        }
        let changes = to_row(update)?;
        if changes.is_empty() {
            return self.get(category_id).await;
        }
        let rows = self.store.update(&Self::by_id(category_id), changes).await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound.into());
        }
        self.get(category_id).await
    }

    /// Deletes the category. Tasks that referenced it keep existing with no category.
    pub async fn delete(&self, category_id: &RowId) -> Result<Category> {
        let rows = self.store.delete(&Self::by_id(category_id)).await?;
        let row = rows.into_iter().next().ok_or(StoreError::NotFound)?;
        from_row(row)
    }
}
