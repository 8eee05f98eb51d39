//! Organization CRUD and membership service.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tickethub_core::error::AppError;
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_database::repositories::OrganizationRepository;
use tickethub_entity::organization::{
    CreateOrganization, MemberRole, Organization, OrganizationMember,
};

use crate::context::RequestContext;

/// Request to create a new organization.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateOrganizationRequest {
    /// Organization name.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Logo image URL.
    pub logo_url: Option<String>,
}

/// Request to update an existing organization.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateOrganizationRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<Option<String>>,
    /// New logo URL.
    pub logo_url: Option<Option<String>>,
}

/// Manages organizations and their memberships.
#[derive(Debug, Clone)]
pub struct OrganizationService {
    /// Organization repository.
    org_repo: Arc<OrganizationRepository>,
}

impl OrganizationService {
    /// Creates a new organization service.
    pub fn new(org_repo: Arc<OrganizationRepository>) -> Self {
        Self { org_repo }
    }

    /// Creates an organization owned by the current user.
    ///
    /// The owner is enrolled as an admin member in the same transaction.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Organization name must not be empty"));
        }

        let org = self
            .org_repo
            .create(&CreateOrganization {
                name: name.to_string(),
                description: req.description,
                logo_url: req.logo_url,
                owner_id: ctx.user_id,
            })
            .await?;

        info!(organization_id = %org.id, owner_id = %ctx.user_id, "Created organization");
        Ok(org)
    }

    /// Returns an organization the current user belongs to.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<Organization, AppError> {
        self.require_member(ctx, id).await?;
        self.org_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))
    }

    /// Lists the organizations the current user belongs to.
    pub async fn list_mine(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<Organization>, AppError> {
        self.org_repo.find_for_user(ctx.user_id, &page).await
    }

    /// Updates an organization's profile. Admin only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        self.require_admin(ctx, id).await?;

        let mut org = self
            .org_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))?;

        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Organization name must not be empty"));
            }
            org.name = name;
        }
        if let Some(description) = req.description {
            org.description = description;
        }
        if let Some(logo_url) = req.logo_url {
            org.logo_url = logo_url;
        }

        self.org_repo.update(&org).await
    }

    /// Deletes an organization. Admin only; refused while events remain.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        self.require_admin(ctx, id).await?;
        self.org_repo.delete(id).await?;
        info!(organization_id = %id, "Deleted organization");
        Ok(())
    }

    /// Lists members of an organization the current user belongs to.
    pub async fn list_members(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Vec<OrganizationMember>, AppError> {
        self.require_member(ctx, id).await?;
        self.org_repo.list_members(id).await
    }

    /// Adds a member. Admin only.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<OrganizationMember, AppError> {
        self.require_admin(ctx, id).await?;
        let member = self.org_repo.add_member(id, user_id, role).await?;
        info!(organization_id = %id, member_user_id = %user_id, role = %role, "Added member");
        Ok(member)
    }

    /// Changes a member's role. Admin only; the owner's role is fixed.
    pub async fn update_member_role(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<OrganizationMember, AppError> {
        self.require_admin(ctx, id).await?;

        let org = self
            .org_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))?;
        if org.owner_id == user_id {
            return Err(AppError::conflict("The organization owner's role is fixed"));
        }

        let member = self.org_repo.update_member_role(id, user_id, role).await?;
        info!(organization_id = %id, member_user_id = %user_id, role = %role, "Changed member role");
        Ok(member)
    }

    /// Removes a member. Admin only; the owner cannot be removed.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        self.require_admin(ctx, id).await?;

        let org = self
            .org_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Organization {id} not found")))?;
        if org.owner_id == user_id {
            return Err(AppError::conflict("The organization owner cannot be removed"));
        }

        self.org_repo.remove_member(id, user_id).await
    }

    /// Ensures the current user is a member of the organization.
    pub async fn require_member(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
    ) -> Result<OrganizationMember, AppError> {
        self.org_repo
            .find_member(organization_id, ctx.user_id)
            .await?
            .ok_or_else(|| AppError::authorization("Not a member of this organization"))
    }

    /// Ensures the current user is an admin of the organization.
    pub async fn require_admin(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
    ) -> Result<OrganizationMember, AppError> {
        let member = self.require_member(ctx, organization_id).await?;
        if !member.role.can_manage() {
            return Err(AppError::authorization(
                "Organization admin role required for this action",
            ));
        }
        Ok(member)
    }
}
