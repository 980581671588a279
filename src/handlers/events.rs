use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{NaiveDateTime, Utc};
use domain::events::{self, EventFields};
use domain::identity::require_administrator;
use model::entities::{event, participation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentAccount;
use crate::schemas::{
    domain_error_response, invalidate_aggregates, ApiResponse, AppState, ErrorResponse,
};

/// Request body for creating or updating an event
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    /// Date and time of the event
    pub date: NaiveDateTime,
    #[validate(length(min = 1))]
    pub location: String,
}

/// Event response model
#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub location: String,
    /// Evaluated against the server clock at read time
    pub is_future: bool,
}

/// The public event listing: upcoming events first-to-last, the five most
/// recent past events, and the event ids the caller is registered for.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventsListResponse {
    pub future: Vec<EventResponse>,
    pub past: Vec<EventResponse>,
    /// Empty for anonymous callers and accounts without a linked member
    pub registered_event_ids: Vec<i32>,
}

/// Participation response model
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipationResponse {
    pub id: i32,
    pub member_id: i32,
    pub event_id: i32,
    pub presence: bool,
    pub registered_at: NaiveDateTime,
    /// Full name of the member, when the join produced one
    pub member_name: Option<String>,
}

/// Response for a registration call
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub participation: ParticipationResponse,
    /// False when the member was already registered; the original row is
    /// returned unchanged
    pub created: bool,
}

/// Request body for updating a participation
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateParticipationRequest {
    /// Whether the member actually attended
    pub presence: bool,
}

fn event_response(model: event::Model, now: NaiveDateTime) -> EventResponse {
    let is_future = model.is_future(now);
    EventResponse {
        id: model.id,
        title: model.title,
        description: model.description,
        date: model.date,
        location: model.location,
        is_future,
    }
}

fn participation_response(
    model: participation::Model,
    member_name: Option<String>,
) -> ParticipationResponse {
    ParticipationResponse {
        id: model.id,
        member_id: model.member_id,
        event_id: model.event_id,
        presence: model.presence,
        registered_at: model.registered_at,
        member_name,
    }
}

/// Get the public event listing. No authentication required; with a bearer
/// token the caller's registrations are marked.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "events",
    responses(
        (status = 200, description = "Events retrieved successfully", body = ApiResponse<EventsListResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current))]
pub async fn get_events(
    State(state): State<AppState>,
    current: Option<CurrentAccount>,
) -> Result<Json<ApiResponse<EventsListResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_events function");
    let now = Utc::now().naive_utc();

    let split = match events::list_events(&state.db, now).await {
        Ok(split) => split,
        Err(err) => return Err(domain_error_response(err)),
    };

    let registered_event_ids = match current.as_ref().and_then(|c| c.0.member_id) {
        Some(member_id) => events::registered_event_ids(&state.db, member_id)
            .await
            .map_err(domain_error_response)?,
        None => Vec::new(),
    };

    debug!(
        "Listing {} future and {} past events",
        split.future.len(),
        split.past.len()
    );
    let response = ApiResponse {
        data: EventsListResponse {
            future: split.future.into_iter().map(|e| event_response(e, now)).collect(),
            past: split.past.into_iter().map(|e| event_response(e, now)).collect(),
            registered_event_ids,
        },
        message: "Events retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created successfully", body = ApiResponse<EventResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 422, description = "Invalid request", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn create_event(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EventResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_event function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    if let Err(e) = request.validate() {
        debug!("Event validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    let fields = EventFields {
        title: request.title,
        description: request.description,
        date: request.date,
        location: request.location,
    };

    match events::create_event(&state.db, fields).await {
        Ok(event) => {
            info!(event_id = event.id, "Event created");
            invalidate_aggregates(&state.cache).await;
            let now = Utc::now().naive_utc();
            let response = ApiResponse {
                data: event_response(event, now),
                message: "Event created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(err) => Err(domain_error_response(err)),
    }
}

/// Update an event
#[utoipa::path(
    put,
    path = "/api/v1/events/{event_id}",
    tag = "events",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
    ),
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event updated successfully", body = ApiResponse<EventResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn update_event(
    Path(event_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<EventResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_event function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    if let Err(e) = request.validate() {
        debug!("Event validation failed: {}", e);
        return Err(domain_error_response(domain::DomainError::Validation(
            e.to_string(),
        )));
    }

    let fields = EventFields {
        title: request.title,
        description: request.description,
        date: request.date,
        location: request.location,
    };

    match events::update_event(&state.db, event_id, fields).await {
        Ok(event) => {
            info!(event_id, "Event updated");
            invalidate_aggregates(&state.cache).await;
            let now = Utc::now().naive_utc();
            let response = ApiResponse {
                data: event_response(event, now),
                message: "Event updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Event update failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Delete an event. Its participations are removed; linked transactions
/// survive with the reference cleared.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    tag = "events",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn delete_event(
    Path(event_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_event function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    match events::delete_event(&state.db, event_id).await {
        Ok(()) => {
            info!(event_id, "Event deleted");
            invalidate_aggregates(&state.cache).await;
            let response = ApiResponse {
                data: format!("Event {} deleted", event_id),
                message: "Event deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Event deletion failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Register the caller's member for an event. Idempotent: registering again
/// returns the existing participation with `created = false`.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/register",
    tag = "events",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Registration recorded or already present", body = ApiResponse<RegistrationResponse>),
        (status = 403, description = "Account has no linked member", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn register_for_event(
    Path(event_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<RegistrationResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering register_for_event function");
    let now = Utc::now().naive_utc();

    match events::register_participation(&state.db, &current.0, event_id, now).await {
        Ok((participation, created)) => {
            info!(
                participation_id = participation.id,
                created, "Registration handled"
            );
            let message = if created {
                "Registration recorded successfully"
            } else {
                "Already registered for this event"
            };
            let response = ApiResponse {
                data: RegistrationResponse {
                    participation: participation_response(participation, None),
                    created,
                },
                message: message.to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Registration failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}

/// Get the participations for an event, joined with member names
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/participations",
    tag = "events",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Participations retrieved successfully", body = ApiResponse<Vec<ParticipationResponse>>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current), fields(account_id = current.0.id))]
pub async fn get_event_participations(
    Path(event_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Json<ApiResponse<Vec<ParticipationResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_event_participations function");
    require_administrator(&current.0).map_err(domain_error_response)?;

    match events::participations_for_event(&state.db, event_id).await {
        Ok(rows) => {
            debug!("Retrieved {} participations", rows.len());
            let data = rows
                .into_iter()
                .map(|(p, member)| participation_response(p, member.map(|m| m.full_name())))
                .collect();
            let response = ApiResponse {
                data,
                message: "Participations retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => Err(domain_error_response(err)),
    }
}

/// Toggle a participation's presence flag
#[utoipa::path(
    put,
    path = "/api/v1/participations/{participation_id}",
    tag = "events",
    params(
        ("participation_id" = i32, Path, description = "Participation ID"),
    ),
    request_body = UpdateParticipationRequest,
    responses(
        (status = 200, description = "Participation updated successfully", body = ApiResponse<ParticipationResponse>),
        (status = 403, description = "Administrator role required", body = ErrorResponse),
        (status = 404, description = "Participation not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, current, request), fields(account_id = current.0.id))]
pub async fn update_participation(
    Path(participation_id): Path<i32>,
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(request): Json<UpdateParticipationRequest>,
) -> Result<Json<ApiResponse<ParticipationResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_participation function");

    match events::update_participation(&state.db, &current.0, participation_id, request.presence)
        .await
    {
        Ok(participation) => {
            info!(participation_id, presence = participation.presence, "Participation updated");
            let response = ApiResponse {
                data: participation_response(participation, None),
                message: "Participation updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Participation update failed: {}", err);
            Err(domain_error_response(err))
        }
    }
}
