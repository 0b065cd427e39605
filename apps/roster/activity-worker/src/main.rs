//! Activity Worker Service - Entry Point
//!
//! Background worker that drains the user activity stream into the audit store.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    roster_activity_worker::run().await
}
