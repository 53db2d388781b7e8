//! User service: registration, authentication and staff management.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use scp_common::{AppError, AppResult, IdGenerator};
use scp_db::{
    entities::{supplier, user, user::Role},
    repositories::{SupplierRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::services::access::Viewer;

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub phone: Option<String>,

    pub role: Role,

    /// Company name. Required for supplier-side roles (a new supplier is
    /// registered); optional business name for consumers.
    pub company_name: Option<String>,
}

/// Input for creating a staff account inside an existing supplier company.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,

    pub phone: Option<String>,

    pub role: Role,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    supplier_repo: SupplierRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, supplier_repo: SupplierRepository) -> Self {
        Self {
            user_repo,
            supplier_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    ///
    /// Supplier-side roles register a new supplier company alongside the
    /// user; consumers stand alone.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let supplier_id = if input.role.is_supplier_side() {
            let company_name = input
                .company_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| {
                    AppError::BadRequest(
                        "Company name is required for supplier roles".to_string(),
                    )
                })?;

            let supplier_model = supplier::ActiveModel {
                id: Set(self.id_gen.generate()),
                company_name: Set(company_name.to_string()),
                description: Set(None),
                city: Set(None),
                is_verified: Set(false),
                is_active: Set(true),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            };

            Some(self.supplier_repo.create(supplier_model).await?.id)
        } else {
            None
        };

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let company_name = if input.role == Role::Consumer {
            input.company_name
        } else {
            None
        };

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            name: Set(input.name),
            phone: Set(input.phone),
            role: Set(input.role),
            supplier_id: Set(supplier_id),
            company_name: Set(company_name),
            token: Set(Some(token)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Authenticate by email and password.
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        Ok(user)
    }

    /// Authenticate by access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Forbidden("Account is deactivated".to_string()));
        }

        Ok(user)
    }

    /// Regenerate a user's access token.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    // ========== Staff management ==========

    /// List staff of the viewer's supplier company.
    pub async fn list_staff(
        &self,
        viewer: &Viewer,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<user::Model>> {
        viewer.require(viewer.permissions().can_manage_users, "manage users")?;
        let supplier_id = viewer.supplier_scope()?;

        self.user_repo
            .find_by_supplier(supplier_id, limit, until_id)
            .await
    }

    /// Create a staff account inside the viewer's company.
    pub async fn create_staff(
        &self,
        viewer: &Viewer,
        input: CreateStaffInput,
    ) -> AppResult<user::Model> {
        viewer.require(viewer.permissions().can_manage_users, "manage users")?;
        let supplier_id = viewer.supplier_scope()?.to_string();

        input.validate()?;

        if !input.role.is_supplier_side() {
            return Err(AppError::BadRequest(
                "Staff accounts must have a supplier role".to_string(),
            ));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            password_hash: Set(hash_password(&input.password)?),
            name: Set(input.name),
            phone: Set(input.phone),
            role: Set(input.role),
            supplier_id: Set(Some(supplier_id)),
            company_name: Set(None),
            token: Set(Some(self.id_gen.generate_token())),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Deactivate a staff account of the viewer's company (soft delete).
    pub async fn deactivate_staff(&self, viewer: &Viewer, user_id: &str) -> AppResult<user::Model> {
        viewer.require(viewer.permissions().can_manage_users, "manage users")?;
        let supplier_id = viewer.supplier_scope()?;

        let target = self.user_repo.get_by_id(user_id).await?;

        if target.supplier_id.as_deref() != Some(supplier_id) {
            return Err(AppError::Forbidden(
                "User belongs to another company".to_string(),
            ));
        }

        if target.id == viewer.user_id {
            return Err(AppError::BadRequest(
                "Cannot deactivate your own account".to_string(),
            ));
        }

        let mut active: user::ActiveModel = target.into();
        active.is_active = Set(false);
        // Kill the session as well
        active.token = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let h1 = hash_password("password123").unwrap();
        let h2 = hash_password("password123").unwrap();
        assert_ne!(h1, h2);
    }
}
