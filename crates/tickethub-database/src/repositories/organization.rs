//! Organization and membership repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use tickethub_core::error::{AppError, ErrorKind};
use tickethub_core::result::AppResult;
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_entity::organization::{
    CreateOrganization, MemberRole, Organization, OrganizationMember,
};

/// Repository for organization and membership operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new organization and enroll the owner as an admin member.
    ///
    /// Both rows are written in one transaction so an organization can never
    /// exist without at least one admin.
    pub async fn create(&self, org: &CreateOrganization) -> AppResult<Organization> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let organization = sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (id, name, description, logo_url, owner_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW(), NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&org.name)
        .bind(&org.description)
        .bind(&org.logo_url)
        .bind(org.owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create organization", e)
        })?;

        sqlx::query(
            "INSERT INTO organization_members (id, user_id, organization_id, role, created_at) \
             VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(Uuid::new_v4())
        .bind(org.owner_id)
        .bind(organization.id)
        .bind(MemberRole::Admin)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to enroll organization owner", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(organization)
    }

    /// Find an organization by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Organization>> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find organization", e)
            })
    }

    /// List organizations the user belongs to, with pagination.
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Organization>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM organizations o \
             JOIN organization_members m ON m.organization_id = o.id \
             WHERE m.user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count organizations", e)
        })?;

        let organizations = sqlx::query_as::<_, Organization>(
            "SELECT o.* FROM organizations o \
             JOIN organization_members m ON m.organization_id = o.id \
             WHERE m.user_id = $1 ORDER BY o.name ASC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list organizations", e)
        })?;

        Ok(PageResponse::new(
            organizations,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Update an organization's profile fields.
    pub async fn update(&self, org: &Organization) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "UPDATE organizations SET name = $2, description = $3, logo_url = $4, \
             updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(org.id)
        .bind(&org.name)
        .bind(&org.description)
        .bind(&org.logo_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update organization", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Organization {} not found", org.id)))
    }

    /// Delete an organization. Fails while events still reference it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                    AppError::conflict("Organization still has events and cannot be deleted")
                }
                _ => AppError::with_source(
                    ErrorKind::Database,
                    "Failed to delete organization",
                    e,
                ),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Organization {id} not found")));
        }
        Ok(())
    }

    /// Find a user's membership in an organization.
    pub async fn find_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find membership", e))
    }

    /// List all members of an organization.
    pub async fn list_members(&self, organization_id: Uuid) -> AppResult<Vec<OrganizationMember>> {
        sqlx::query_as::<_, OrganizationMember>(
            "SELECT * FROM organization_members WHERE organization_id = $1 ORDER BY created_at ASC",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list members", e))
    }

    /// Add a member to an organization.
    pub async fn add_member(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> AppResult<OrganizationMember> {
        sqlx::query_as::<_, OrganizationMember>(
            "INSERT INTO organization_members (id, user_id, organization_id, role, created_at) \
             VALUES ($1, $2, $3, $4, NOW()) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(organization_id)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("User is already a member of this organization")
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to add member", e),
        })
    }

    /// Change a member's role.
    pub async fn update_member_role(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> AppResult<OrganizationMember> {
        sqlx::query_as::<_, OrganizationMember>(
            "UPDATE organization_members SET role = $3 \
             WHERE organization_id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update member role", e))?
        .ok_or_else(|| AppError::not_found("Membership not found"))
    }

    /// Remove a member from an organization.
    pub async fn remove_member(&self, organization_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove member", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Membership not found"));
        }
        Ok(())
    }
}
