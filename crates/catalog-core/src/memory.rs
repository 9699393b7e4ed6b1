//! In-memory stores
//!
//! Process-local stores for development and tests. Uniqueness checks and
//! inserts happen under a single write lock, so two concurrent creates with
//! the same email cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    CatalogError, NewProduct, NewUser, Product, ProductRepository, Result, User, UserRepository,
};

/// Stored record with its soft-delete marker
#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    deleted: bool,
}

impl<T> Entry<T> {
    fn live(value: T) -> Self {
        Self {
            value,
            deleted: false,
        }
    }
}

fn page<T>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

// ============================================================================
// Users
// ============================================================================

/// In-memory credential store
#[derive(Default)]
pub struct MemoryUserStore {
    // Insertion order doubles as creation order.
    users: RwLock<Vec<Entry<User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut users = self.users.write().await;

        if users.iter().any(|e| e.value.email == user.email) {
            return Err(CatalogError::duplicate("email"));
        }
        if users.iter().any(|e| e.value.username == user.username) {
            return Err(CatalogError::duplicate("username"));
        }

        let user = user.into_user();
        users.push(Entry::live(user.clone()));
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|e| !e.deleted && e.value.id == id)
            .map(|e| e.value.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|e| !e.deleted && e.value.email == email)
            .map(|e| e.value.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|e| !e.deleted && e.value.username == username)
            .map(|e| e.value.clone()))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(page(
            users.iter().filter(|e| !e.deleted).map(|e| e.value.clone()),
            limit,
            offset,
        ))
    }

    async fn update(&self, user: &User) -> Result<User> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|e| e.value.id != user.id && e.value.username == user.username)
        {
            return Err(CatalogError::duplicate("username"));
        }

        let entry = users
            .iter_mut()
            .find(|e| !e.deleted && e.value.id == user.id)
            .ok_or_else(|| CatalogError::NotFound(format!("user {}", user.id)))?;

        entry.value.username = user.username.clone();
        entry.value.first_name = user.first_name.clone();
        entry.value.last_name = user.last_name.clone();
        entry.value.is_active = user.is_active;
        entry.value.updated_at = Utc::now();

        Ok(entry.value.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut users = self.users.write().await;
        let entry = users
            .iter_mut()
            .find(|e| !e.deleted && e.value.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("user {id}")))?;

        entry.deleted = true;
        entry.value.is_active = false;
        Ok(())
    }
}

// ============================================================================
// Products
// ============================================================================

/// In-memory product store
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<Vec<Entry<Product>>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn list_where<F>(&self, filter: F, limit: i64, offset: i64) -> Vec<Product>
    where
        F: Fn(&Product) -> bool,
    {
        let products = self.products.read().await;
        // Newest first, matching the SQL store.
        page(
            products
                .iter()
                .rev()
                .filter(|e| !e.deleted && filter(&e.value))
                .map(|e| e.value.clone()),
            limit,
            offset,
        )
    }
}

#[async_trait]
impl ProductRepository for MemoryProductStore {
    async fn create(&self, product: NewProduct) -> Result<Product> {
        let mut products = self.products.write().await;

        if products.iter().any(|e| e.value.sku == product.sku) {
            return Err(CatalogError::duplicate("sku"));
        }

        let product = product.into_product();
        products.push(Entry::live(product.clone()));
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products
            .iter()
            .find(|e| !e.deleted && e.value.id == id)
            .map(|e| e.value.clone()))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Product>> {
        Ok(self.list_where(|_| true, limit, offset).await)
    }

    async fn list_by_category(
        &self,
        category: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>> {
        Ok(self
            .list_where(|p| p.category == category, limit, offset)
            .await)
    }

    async fn list_by_owner(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>> {
        Ok(self
            .list_where(|p| p.user_id == user_id, limit, offset)
            .await)
    }

    async fn update(&self, product: &Product) -> Result<Product> {
        let mut products = self.products.write().await;

        if products
            .iter()
            .any(|e| e.value.id != product.id && e.value.sku == product.sku)
        {
            return Err(CatalogError::duplicate("sku"));
        }

        let entry = products
            .iter_mut()
            .find(|e| !e.deleted && e.value.id == product.id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {}", product.id)))?;

        let stored = &mut entry.value;
        stored.name = product.name.clone();
        stored.description = product.description.clone();
        stored.price = product.price;
        stored.stock = product.stock;
        stored.category = product.category.clone();
        stored.sku = product.sku.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut products = self.products.write().await;
        let entry = products
            .iter_mut()
            .find(|e| !e.deleted && e.value.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("product {id}")))?;

        entry.deleted = true;
        Ok(())
    }
}
