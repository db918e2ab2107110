//! # Analytics Handlers
//!
//! Aggregates over tasks and time logs. Rows are fetched with narrow
//! selects and folded here, which keeps the arithmetic identical on
//! PostgreSQL and SQLite.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use entity::{sea_orm_active_enums::TaskStatus, tasks, time_logs, users};
use sea_orm::{ColumnTrait, EntityTrait, Iterable, QueryFilter, QuerySelect};
use uuid::Uuid;

use super::{load_project, ok, ApiResult};
use crate::{
    dto::analytics::{DailyHours, DateRangeQuery, MemberHours, ProjectSummary, TimeSeries},
    middleware::AuthenticatedUser,
    AppState,
};

/// Minutes as hours, rounded to two decimals.
pub fn minutes_to_hours(minutes: i64) -> f64 { round2(minutes as f64 / 60.0) }

fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Task counts of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCounts {
    pub total:      u64,
    pub by_status:  BTreeMap<String, u64>,
    pub completed:  u64,
    pub percentage: f64,
    pub overdue:    u64,
}

/// Fold `(status, due_date)` rows. A task is overdue when its due date is
/// before `today` and it is not done.
pub fn count_tasks(rows: &[(TaskStatus, Option<NaiveDate>)], today: NaiveDate) -> TaskCounts {
    let mut by_status: BTreeMap<String, u64> = TaskStatus::iter().map(|s| (s.to_string(), 0)).collect();
    let mut completed = 0;
    let mut overdue = 0;
    for (status, due_date) in rows {
        *by_status.entry(status.to_string()).or_default() += 1;
        if status.is_done() {
            completed += 1;
        }
        else if due_date.is_some_and(|due| due < today) {
            overdue += 1;
        }
    }
    let total = rows.len() as u64;
    let percentage = if total == 0 {
        0.0
    }
    else {
        round2(completed as f64 * 100.0 / total as f64)
    };
    TaskCounts {
        total,
        by_status,
        completed,
        percentage,
        overdue,
    }
}

/// Hours per day for every day of `from..=to`, zero-filled.
pub fn daily_hours(from: NaiveDate, to: NaiveDate, rows: &[(NaiveDate, i32)]) -> Vec<DailyHours> {
    let mut minutes: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (date, m) in rows {
        *minutes.entry(*date).or_default() += i64::from(*m);
    }
    from.iter_days()
        .take_while(|day| *day <= to)
        .map(|date| {
            DailyHours {
                date,
                hours: minutes_to_hours(minutes.get(&date).copied().unwrap_or(0)),
            }
        })
        .collect()
}

fn series(from: NaiveDate, to: NaiveDate, rows: &[(NaiveDate, i32)]) -> TimeSeries {
    let total: i64 = rows.iter().map(|(_, m)| i64::from(*m)).sum();
    TimeSeries {
        from,
        to,
        total_hours: minutes_to_hours(total),
        days: daily_hours(from, to, rows),
    }
}

pub async fn project_summary_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
) -> ApiResult<ProjectSummary> {
    load_project(&state.db, project_id).await?;
    state.gate().ensure_can_view(&user.principal, project_id).await?;

    let task_rows: Vec<(TaskStatus, Option<NaiveDate>)> = tasks::Entity::find()
        .select_only()
        .column(tasks::Column::Status)
        .column(tasks::Column::DueDate)
        .filter(tasks::Column::ProjectId.eq(project_id))
        .into_tuple()
        .all(&state.db)
        .await?;
    let counts = count_tasks(&task_rows, Utc::now().date_naive());

    let log_rows: Vec<(Uuid, i32)> = time_logs::Entity::find()
        .select_only()
        .column(time_logs::Column::UserId)
        .column(time_logs::Column::Minutes)
        .inner_join(tasks::Entity)
        .filter(tasks::Column::ProjectId.eq(project_id))
        .into_tuple()
        .all(&state.db)
        .await?;
    let mut minutes_by_user: HashMap<Uuid, i64> = HashMap::new();
    for (user_id, minutes) in &log_rows {
        *minutes_by_user.entry(*user_id).or_default() += i64::from(*minutes);
    }
    let total_minutes: i64 = minutes_by_user.values().sum();

    let names: HashMap<Uuid, String> = users::Entity::find()
        .select_only()
        .column(users::Column::Id)
        .column(users::Column::FullName)
        .filter(users::Column::Id.is_in(minutes_by_user.keys().copied()))
        .into_tuple::<(Uuid, String)>()
        .all(&state.db)
        .await?
        .into_iter()
        .collect();
    let mut hours_by_member: Vec<MemberHours> = minutes_by_user
        .into_iter()
        .map(|(user_id, minutes)| {
            MemberHours {
                user_id,
                full_name: names.get(&user_id).cloned(),
                hours: minutes_to_hours(minutes),
            }
        })
        .collect();
    hours_by_member.sort_by(|a, b| b.hours.total_cmp(&a.hours).then(a.user_id.cmp(&b.user_id)));

    ok(ProjectSummary {
        project_id,
        total_tasks: counts.total,
        tasks_by_status: counts.by_status,
        completed_tasks: counts.completed,
        completion_percentage: counts.percentage,
        overdue_tasks: counts.overdue,
        total_hours: minutes_to_hours(total_minutes),
        hours_by_member,
    })
}

pub async fn project_time_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    project_id: Uuid,
    range: DateRangeQuery,
) -> ApiResult<TimeSeries> {
    load_project(&state.db, project_id).await?;
    state.gate().ensure_can_view(&user.principal, project_id).await?;
    let (from, to) = range.resolve(Utc::now().date_naive())?;

    let rows: Vec<(NaiveDate, i32)> = time_logs::Entity::find()
        .select_only()
        .column(time_logs::Column::LogDate)
        .column(time_logs::Column::Minutes)
        .inner_join(tasks::Entity)
        .filter(tasks::Column::ProjectId.eq(project_id))
        .filter(time_logs::Column::LogDate.between(from, to))
        .into_tuple()
        .all(&state.db)
        .await?;
    ok(series(from, to, &rows))
}

/// The caller's own logged hours across all projects.
pub async fn my_time_handler(
    state: &AppState,
    user: &AuthenticatedUser,
    range: DateRangeQuery,
) -> ApiResult<TimeSeries> {
    let (from, to) = range.resolve(Utc::now().date_naive())?;
    let rows: Vec<(NaiveDate, i32)> = time_logs::Entity::find()
        .select_only()
        .column(time_logs::Column::LogDate)
        .column(time_logs::Column::Minutes)
        .filter(time_logs::Column::UserId.eq(user.principal.id))
        .filter(time_logs::Column::LogDate.between(from, to))
        .into_tuple()
        .all(&state.db)
        .await?;
    ok(series(from, to, &rows))
}
