//! Ownership guard for product mutations
//!
//! The caller may update or delete a product only when they are its recorded
//! owner. The role claim is not consulted and there is no admin override.

use catalog_core::Product;
use thiserror::Error;

use super::middleware::AuthenticatedUser;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("caller is not the owner of this resource")]
    NotOwner,
}

/// Succeeds only when `caller` owns `product`
pub fn ensure_owner(product: &Product, caller: &AuthenticatedUser) -> Result<(), AuthorizationError> {
    if product.is_owned_by(caller.user_id) {
        Ok(())
    } else {
        Err(AuthorizationError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn product_owned_by(owner: Uuid) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Lamp".to_string(),
            description: String::new(),
            price: 20.0,
            stock: 4,
            category: "home".to_string(),
            sku: "LAMP-1".to_string(),
            user_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn caller(user_id: Uuid, role: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            email: "caller@example.com".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_owner_passes() {
        let owner = Uuid::new_v4();
        let product = product_owned_by(owner);
        assert!(ensure_owner(&product, &caller(owner, "user")).is_ok());
    }

    #[test]
    fn test_non_owner_rejected_even_as_admin() {
        let product = product_owned_by(Uuid::new_v4());

        assert_eq!(
            ensure_owner(&product, &caller(Uuid::new_v4(), "user")),
            Err(AuthorizationError::NotOwner)
        );
        assert_eq!(
            ensure_owner(&product, &caller(Uuid::new_v4(), "admin")),
            Err(AuthorizationError::NotOwner)
        );
    }
}
