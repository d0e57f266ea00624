//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! Engines compute over an in-memory TransactionSnapshot — they
//! never execute SQL. The store is written once at ingest and read
//! back whole; there is no incremental update path.

use crate::{
    error::AnalyticsResult,
    snapshot::{Transaction, TransactionSnapshot},
};
use rusqlite::{params, Connection};

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &str) -> AnalyticsResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> AnalyticsResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> AnalyticsResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_transactions.sql"))?;
        Ok(())
    }

    /// Bulk-insert engineered transactions in a single database
    /// transaction. Insertion order is preserved by rowid.
    pub fn insert_transactions(&mut self, rows: &[Transaction]) -> AnalyticsResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO transaction_record
                   (invoice_no, customer_id, shopping_mall, category, payment_method,
                    invoice_date, quantity, price, total_sales, discount_amount, net_sales)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.invoice_no,
                    row.customer_id,
                    row.shopping_mall,
                    row.category,
                    row.payment_method,
                    row.invoice_date.to_string(),
                    row.quantity as i64,
                    row.price,
                    row.total_sales,
                    row.discount_amount,
                    row.net_sales,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn transaction_count(&self) -> AnalyticsResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM transaction_record", [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Load the whole processed table as an immutable snapshot.
    /// Rows come back in insertion order, so repeated loads are
    /// identical.
    pub fn load_snapshot(&self) -> AnalyticsResult<TransactionSnapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT invoice_no, customer_id, shopping_mall, category, payment_method,
                    invoice_date, quantity, price, total_sales, discount_amount, net_sales
             FROM transaction_record ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Transaction {
                    invoice_no: row.get(0)?,
                    customer_id: row.get(1)?,
                    shopping_mall: row.get(2)?,
                    category: row.get(3)?,
                    payment_method: row.get(4)?,
                    invoice_date: row.get::<_, String>(5)?.parse().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            5,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    quantity: row.get::<_, i64>(6)? as u32,
                    price: row.get(7)?,
                    total_sales: row.get(8)?,
                    discount_amount: row.get(9)?,
                    net_sales: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TransactionSnapshot::new(rows))
    }
}
