//! Event CRUD and public search service.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use tickethub_core::error::AppError;
use tickethub_core::types::pagination::{PageRequest, PageResponse};
use tickethub_database::repositories::EventRepository;
use tickethub_entity::event::{CreateEvent, Event};

use crate::context::RequestContext;
use crate::organization::service::OrganizationService;

/// Request to create a new event.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// Event description.
    pub description: String,
    /// Search tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to update an existing event.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateEventRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New tags.
    pub tags: Option<Vec<String>>,
}

/// Public search filters for the event listing.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct EventSearch {
    /// Substring match over name and description.
    pub query: Option<String>,
    /// Exact tag match.
    pub tag: Option<String>,
}

/// Manages events on behalf of organizations.
#[derive(Debug, Clone)]
pub struct EventService {
    /// Event repository.
    event_repo: Arc<EventRepository>,
    /// Organization service for membership checks.
    org_service: Arc<OrganizationService>,
}

impl EventService {
    /// Creates a new event service.
    pub fn new(event_repo: Arc<EventRepository>, org_service: Arc<OrganizationService>) -> Self {
        Self {
            event_repo,
            org_service,
        }
    }

    /// Creates an event under an organization. Admin only.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        req: CreateEventRequest,
    ) -> Result<Event, AppError> {
        self.org_service.require_admin(ctx, organization_id).await?;

        let name = req.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Event name must not be empty"));
        }

        let event = self
            .event_repo
            .create(&CreateEvent {
                organization_id,
                name: name.to_string(),
                description: req.description,
                tags: normalize_tags(req.tags),
            })
            .await?;

        info!(event_id = %event.id, organization_id = %organization_id, "Created event");
        Ok(event)
    }

    /// Returns an event by ID. Public; no membership required.
    pub async fn get(&self, id: Uuid) -> Result<Event, AppError> {
        self.event_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Event {id} not found")))
    }

    /// Lists an organization's events. Members only.
    pub async fn list_for_organization(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        page: PageRequest,
    ) -> Result<PageResponse<Event>, AppError> {
        self.org_service.require_member(ctx, organization_id).await?;
        self.event_repo.find_by_organization(organization_id, &page).await
    }

    /// Public event listing with optional search query and tag filter.
    pub async fn search(
        &self,
        search: EventSearch,
        page: PageRequest,
    ) -> Result<PageResponse<Event>, AppError> {
        let query = search
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());
        let tag = search
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        self.event_repo.search(query, tag, &page).await
    }

    /// Updates an event. Admin of the owning organization only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        req: UpdateEventRequest,
    ) -> Result<Event, AppError> {
        let mut event = self.get(id).await?;
        self.org_service
            .require_admin(ctx, event.organization_id)
            .await?;

        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::validation("Event name must not be empty"));
            }
            event.name = name;
        }
        if let Some(description) = req.description {
            event.description = description;
        }
        if let Some(tags) = req.tags {
            event.tags = normalize_tags(tags);
        }

        self.event_repo.update(&event).await
    }

    /// Deletes an event. Admin of the owning organization only.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        let event = self.get(id).await?;
        self.org_service
            .require_admin(ctx, event.organization_id)
            .await?;
        self.event_repo.delete(id).await?;
        info!(event_id = %id, "Deleted event");
        Ok(())
    }
}

/// Trim tags, drop empties, and dedupe while preserving order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
