//! Events and member participation, including the idempotent registration
//! path: registering twice for the same event returns the existing row.

use chrono::NaiveDateTime;
use model::entities::{
    account, event, participation,
    prelude::{Event, Participation},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use tracing::{debug, info, instrument};

use crate::error::{DomainError, Result};
use crate::identity::require_administrator;

/// How many past events the listing keeps.
const PAST_EVENTS_LIMIT: u64 = 5;

/// Editable event fields.
#[derive(Debug, Clone)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub location: String,
}

/// The public event listing: upcoming events soonest-first, plus the most
/// recent past events, newest-first and capped.
#[derive(Debug, Clone)]
pub struct EventsSplit {
    pub future: Vec<event::Model>,
    pub past: Vec<event::Model>,
}

/// Split events into future and past relative to `now`.
pub async fn list_events(db: &DatabaseConnection, now: NaiveDateTime) -> Result<EventsSplit> {
    let future = Event::find()
        .filter(event::Column::Date.gte(now))
        .order_by_asc(event::Column::Date)
        .all(db)
        .await?;

    let past = Event::find()
        .filter(event::Column::Date.lt(now))
        .order_by_desc(event::Column::Date)
        .limit(PAST_EVENTS_LIMIT)
        .all(db)
        .await?;

    Ok(EventsSplit { future, past })
}

pub async fn get_event(db: &DatabaseConnection, event_id: i32) -> Result<event::Model> {
    Event::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("event"))
}

#[instrument(skip(db, fields), fields(title = %fields.title))]
pub async fn create_event(db: &DatabaseConnection, fields: EventFields) -> Result<event::Model> {
    let event = event::ActiveModel {
        title: Set(fields.title),
        description: Set(fields.description),
        date: Set(fields.date),
        location: Set(fields.location),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(event_id = event.id, "Event created");
    Ok(event)
}

#[instrument(skip(db, fields))]
pub async fn update_event(
    db: &DatabaseConnection,
    event_id: i32,
    fields: EventFields,
) -> Result<event::Model> {
    let event = get_event(db, event_id).await?;

    let mut active: event::ActiveModel = event.into();
    active.title = Set(fields.title);
    active.description = Set(fields.description);
    active.date = Set(fields.date);
    active.location = Set(fields.location);
    let event = active.update(db).await?;

    info!(event_id, "Event updated");
    Ok(event)
}

/// Delete an event. Participations go with it; transactions referencing it
/// keep their row and lose the reference, per the schema's FK rules.
#[instrument(skip(db))]
pub async fn delete_event(db: &DatabaseConnection, event_id: i32) -> Result<()> {
    let result = Event::delete_by_id(event_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::NotFound("event"));
    }
    info!(event_id, "Event deleted");
    Ok(())
}

/// Event ids a member has registered for, used to mark listings.
pub async fn registered_event_ids(db: &DatabaseConnection, member_id: i32) -> Result<Vec<i32>> {
    let rows: Vec<i32> = Participation::find()
        .select_only()
        .column(participation::Column::EventId)
        .filter(participation::Column::MemberId.eq(member_id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows)
}

/// Register the calling account's member for an event. Idempotent: a second
/// registration returns the existing row with `created = false` instead of
/// surfacing the uniqueness violation. Accounts without a linked member
/// cannot register at all.
#[instrument(skip(db, account), fields(account_id = account.id))]
pub async fn register_participation(
    db: &DatabaseConnection,
    account: &account::Model,
    event_id: i32,
    now: NaiveDateTime,
) -> Result<(participation::Model, bool)> {
    let Some(member_id) = account.member_id else {
        return Err(DomainError::Forbidden);
    };

    if Event::find_by_id(event_id).one(db).await?.is_none() {
        return Err(DomainError::NotFound("event"));
    }

    let existing = Participation::find()
        .filter(participation::Column::MemberId.eq(member_id))
        .filter(participation::Column::EventId.eq(event_id))
        .one(db)
        .await?;
    if let Some(participation) = existing {
        debug!(participation_id = participation.id, "Already registered");
        return Ok((participation, false));
    }

    let inserted = participation::ActiveModel {
        member_id: Set(member_id),
        event_id: Set(event_id),
        presence: Set(false),
        registered_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    match inserted {
        Ok(participation) => {
            info!(participation_id = participation.id, "Participation registered");
            Ok((participation, true))
        }
        // A concurrent registration may have won the unique index; fall back
        // to the row it created.
        Err(err) => {
            let existing = Participation::find()
                .filter(participation::Column::MemberId.eq(member_id))
                .filter(participation::Column::EventId.eq(event_id))
                .one(db)
                .await?;
            match existing {
                Some(participation) => Ok((participation, false)),
                None => Err(err.into()),
            }
        }
    }
}

/// Administrator-only presence toggle. `registered_at` is never touched.
#[instrument(skip(db, account), fields(account_id = account.id))]
pub async fn update_participation(
    db: &DatabaseConnection,
    account: &account::Model,
    participation_id: i32,
    presence: bool,
) -> Result<participation::Model> {
    require_administrator(account)?;

    let participation = Participation::find_by_id(participation_id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("participation"))?;

    let mut active: participation::ActiveModel = participation.into();
    active.presence = Set(presence);
    let participation = active.update(db).await?;

    info!(participation_id, presence, "Participation updated");
    Ok(participation)
}

/// Participations for one event, joined with their member for display.
pub async fn participations_for_event(
    db: &DatabaseConnection,
    event_id: i32,
) -> Result<Vec<(participation::Model, Option<model::entities::member::Model>)>> {
    if Event::find_by_id(event_id).one(db).await?.is_none() {
        return Err(DomainError::NotFound("event"));
    }

    let rows = Participation::find()
        .find_also_related(model::entities::prelude::Member)
        .filter(participation::Column::EventId.eq(event_id))
        .order_by_asc(participation::Column::RegisteredAt)
        .all(db)
        .await?;
    Ok(rows)
}
