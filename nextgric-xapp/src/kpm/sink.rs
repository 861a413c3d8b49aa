//! KPI persistence.
//!
//! One row is appended to `xapp_kpi_metrics` per processed indication. The
//! row is a snapshot of the aggregated [`KpiRecord`] with a Unix timestamp
//! in seconds.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use nextgric_common::DbConfig;
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::{debug, info};

use crate::kpm::dispatcher::KpiRecord;

/// KPI sink failures. Always recoverable: the affected row is dropped.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("KPI database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("KPI sink unavailable: {0}")]
    Unavailable(String),
}

/// A persisted KPI snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KpiRow {
    pub kpi: KpiRecord,
    /// Seconds since the Unix epoch
    pub timestamp: i64,
}

impl KpiRow {
    /// Snapshot of `kpi` stamped with the current time.
    pub fn now(kpi: KpiRecord) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Self { kpi, timestamp }
    }
}

/// Destination of KPI snapshots.
pub trait KpiSink: Send {
    fn insert(&mut self, row: &KpiRow) -> Result<(), SinkError>;
}

/// SQLite-backed KPI sink.
pub struct SqliteKpiSink {
    conn: Connection,
}

impl SqliteKpiSink {
    pub fn in_memory() -> Result<Self, SinkError> {
        let conn = Connection::open_in_memory()?;
        let sink = Self { conn };
        sink.init_schema()?;
        Ok(sink)
    }

    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let conn = Connection::open(path)?;
        let sink = Self { conn };
        sink.init_schema()?;
        Ok(sink)
    }

    /// Opens the database named by `db`, stored as `<name>.sqlite3` in `dir`.
    ///
    /// Host, user, password and port describe a network server and are not
    /// used by the embedded engine.
    pub fn open_in_dir(db: &DbConfig, dir: &Path) -> Result<Self, SinkError> {
        debug!(
            host = %db.host,
            user = %db.user,
            port = db.port,
            "Network parameters unused by the embedded KPI database"
        );
        let path = Self::database_path(db, dir);
        let sink = Self::open(&path)?;
        info!(path = %path.display(), "KPI database and table initialized");
        Ok(sink)
    }

    pub fn database_path(db: &DbConfig, dir: &Path) -> PathBuf {
        dir.join(format!("{}.sqlite3", db.database))
    }

    fn init_schema(&self) -> Result<(), SinkError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS xapp_kpi_metrics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rru_prb_tot_dl REAL,
                rru_prb_tot_ul REAL,
                drb_pdcp_sdu_volume_dl REAL,
                drb_pdcp_sdu_volume_ul REAL,
                drb_rlc_sdu_delay_dl REAL,
                drb_ue_thp_dl REAL,
                drb_ue_thp_ul REAL,
                amf_ue_ngap_id INTEGER,
                ran_ue_id INTEGER,
                timestamp INTEGER NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn row_count(&self) -> Result<u64, SinkError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM xapp_kpi_metrics", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// All rows in insertion order.
    pub fn rows(&self) -> Result<Vec<KpiRow>, SinkError> {
        let mut stmt = self.conn.prepare(
            "SELECT rru_prb_tot_dl, rru_prb_tot_ul, drb_pdcp_sdu_volume_dl,
                    drb_pdcp_sdu_volume_ul, drb_rlc_sdu_delay_dl, drb_ue_thp_dl,
                    drb_ue_thp_ul, amf_ue_ngap_id, ran_ue_id, timestamp
             FROM xapp_kpi_metrics ORDER BY id",
        )?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            let amf_ue_ngap_id: i64 = row.get(7)?;
            let ran_ue_id: i64 = row.get(8)?;
            records.push(KpiRow {
                kpi: KpiRecord {
                    rru_prb_tot_dl: row.get(0)?,
                    rru_prb_tot_ul: row.get(1)?,
                    drb_pdcp_sdu_volume_dl: row.get(2)?,
                    drb_pdcp_sdu_volume_ul: row.get(3)?,
                    drb_rlc_sdu_delay_dl: row.get(4)?,
                    drb_ue_thp_dl: row.get(5)?,
                    drb_ue_thp_ul: row.get(6)?,
                    amf_ue_ngap_id: amf_ue_ngap_id as u64,
                    ran_ue_id: ran_ue_id as u64,
                },
                timestamp: row.get(9)?,
            });
        }
        Ok(records)
    }
}

impl KpiSink for SqliteKpiSink {
    fn insert(&mut self, row: &KpiRow) -> Result<(), SinkError> {
        let kpi = &row.kpi;
        // SQLite integers are signed; ids are stored bit-for-bit.
        self.conn.execute(
            "INSERT INTO xapp_kpi_metrics (
                rru_prb_tot_dl, rru_prb_tot_ul, drb_pdcp_sdu_volume_dl,
                drb_pdcp_sdu_volume_ul, drb_rlc_sdu_delay_dl, drb_ue_thp_dl,
                drb_ue_thp_ul, amf_ue_ngap_id, ran_ue_id, timestamp
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                kpi.rru_prb_tot_dl,
                kpi.rru_prb_tot_ul,
                kpi.drb_pdcp_sdu_volume_dl,
                kpi.drb_pdcp_sdu_volume_ul,
                kpi.drb_rlc_sdu_delay_dl,
                kpi.drb_ue_thp_dl,
                kpi.drb_ue_thp_ul,
                kpi.amf_ue_ngap_id as i64,
                kpi.ran_ue_id as i64,
                row.timestamp,
            ],
        )?;
        debug!("Metrics inserted");
        Ok(())
    }
}
