//! Row seeding for adapter tests.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use opsflow_domain::id::{ClientId, MeetingId, ProjectId, UserId};
use opsflow_domain::record::{MeetingStatus, ProjectStatus};
use opsflow_domain::time::{self, Timestamp};

use crate::codec;
use crate::pool::Config;

pub(crate) async fn memory_pool() -> SqlitePool {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .unwrap()
    .pool()
    .clone()
}

pub(crate) async fn insert_client(
    pool: &SqlitePool,
    owner: UserId,
    name: &str,
    email: Option<&str>,
    company: Option<&str>,
    created_at: Timestamp,
) -> ClientId {
    let id = ClientId::new();
    sqlx::query(
        "INSERT INTO clients (id, owner_id, name, email, company, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(owner.to_string())
    .bind(name)
    .bind(email)
    .bind(company)
    .bind(time::to_storage(created_at))
    .execute(pool)
    .await
    .unwrap();
    id
}

pub(crate) async fn insert_meeting(
    pool: &SqlitePool,
    owner: UserId,
    client: Option<ClientId>,
    title: &str,
    start: Timestamp,
    end: Option<Timestamp>,
    status: MeetingStatus,
) -> MeetingId {
    let id = MeetingId::new();
    sqlx::query(
        "INSERT INTO meetings (id, owner_id, client_id, title, start_time, end_time, status) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(owner.to_string())
    .bind(client.map(|c| c.to_string()))
    .bind(title)
    .bind(time::to_storage(start))
    .bind(end.map(time::to_storage))
    .bind(status.as_str())
    .execute(pool)
    .await
    .unwrap();
    id
}

pub(crate) async fn insert_project(
    pool: &SqlitePool,
    owner: UserId,
    client: Option<ClientId>,
    name: &str,
    status: ProjectStatus,
    end_date: Option<NaiveDate>,
    updated_at: Timestamp,
) -> ProjectId {
    let id = ProjectId::new();
    sqlx::query(
        "INSERT INTO projects (id, owner_id, client_id, name, status, end_date, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(owner.to_string())
    .bind(client.map(|c| c.to_string()))
    .bind(name)
    .bind(status.as_str())
    .bind(end_date.map(codec::date_to_storage))
    .bind(time::to_storage(updated_at))
    .execute(pool)
    .await
    .unwrap();
    id
}

pub(crate) async fn insert_invoice(pool: &SqlitePool, owner: UserId, client: ClientId) {
    sqlx::query(
        "INSERT INTO invoices (id, owner_id, client_id, amount_cents, created_at) VALUES (?, ?, ?, 10000, ?)",
    )
    .bind(ClientId::new().to_string())
    .bind(owner.to_string())
    .bind(client.to_string())
    .bind(time::to_storage(time::now()))
    .execute(pool)
    .await
    .unwrap();
}

pub(crate) async fn insert_communication(
    pool: &SqlitePool,
    owner: UserId,
    client: ClientId,
    occurred_at: Timestamp,
) {
    sqlx::query(
        "INSERT INTO communications (id, owner_id, client_id, kind, occurred_at) VALUES (?, ?, ?, 'email', ?)",
    )
    .bind(ClientId::new().to_string())
    .bind(owner.to_string())
    .bind(client.to_string())
    .bind(time::to_storage(occurred_at))
    .execute(pool)
    .await
    .unwrap();
}
