// src/services/seed.rs

use crate::{
    config::AdminSeed,
    error::AppError,
    models::user::NewAdmin,
    store::Store,
    utils::hash::hash_password,
};

/// Creates the configured administrator unless one with the same admin ID
/// already exists. Returns whether a row was written.
pub async fn seed_admin(store: &dyn Store, seed: &AdminSeed) -> Result<bool, AppError> {
    if store.find_admin_by_admin_id(&seed.admin_id).await?.is_some() {
        return Ok(false);
    }

    tracing::info!("Seeding admin user: {}", seed.admin_id);
    let password_hash = hash_password(&seed.password)?;

    store
        .create_admin(NewAdmin {
            admin_id: seed.admin_id.clone(),
            email: seed.email.trim().to_lowercase(),
            password_hash,
            first_name: seed.first_name.clone(),
            last_name: seed.last_name.clone(),
        })
        .await?;

    tracing::info!("Admin user created successfully.");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{store::MemoryStore, utils::hash::verify_password};

    fn seed() -> AdminSeed {
        AdminSeed {
            admin_id: "ADMIN001".to_string(),
            email: "Admin@Example.com".to_string(),
            password: "admin123".to_string(),
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_admin_is_idempotent() {
        let store = MemoryStore::new();

        assert!(seed_admin(&store, &seed()).await.unwrap());
        assert!(!seed_admin(&store, &seed()).await.unwrap());

        let admin = store
            .find_admin_by_admin_id("ADMIN001")
            .await
            .unwrap()
            .expect("seeded admin");
        assert_eq!(admin.email, "admin@example.com");
        assert!(verify_password("admin123", &admin.password_hash).unwrap());
    }
}
