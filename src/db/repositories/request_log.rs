use crate::entities::{prelude::*, request_logs};
use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

pub type RequestLog = request_logs::Model;

/// One API call as seen by the audit layer.
#[derive(Debug, Clone)]
pub struct NewRequestLog {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub struct RequestLogRepository {
    conn: DatabaseConnection,
}

impl RequestLogRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(&self, entry: NewRequestLog) -> Result<()> {
        let active_model = request_logs::ActiveModel {
            endpoint: Set(entry.endpoint),
            method: Set(entry.method),
            status_code: Set(i32::from(entry.status_code)),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            timestamp: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        RequestLogs::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    /// Most recent entries first
    pub async fn recent(&self, limit: u64) -> Result<Vec<RequestLog>> {
        let items = RequestLogs::find()
            .order_by_desc(request_logs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(items)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(RequestLogs::find().count(&self.conn).await?)
    }

    pub async fn count_with_status(&self, endpoint: &str, status_code: u16) -> Result<u64> {
        Ok(RequestLogs::find()
            .filter(request_logs::Column::Endpoint.eq(endpoint))
            .filter(request_logs::Column::StatusCode.eq(i32::from(status_code)))
            .count(&self.conn)
            .await?)
    }
}
