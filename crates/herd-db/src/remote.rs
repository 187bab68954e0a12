//! Object-store access for remote extract roots.

use crate::error::{StoreError, StoreResult};
use duckdb::Connection;
use herd_core::config::S3Config;
use herd_core::sql_utils::string_literal;

const DEFAULT_REGION: &str = "us-east-1";

/// Credentials and region taken from the process environment.
#[derive(Debug, Default)]
pub(crate) struct S3Credentials {
    pub(crate) region: Option<String>,
    pub(crate) access_key_id: Option<String>,
    pub(crate) secret_access_key: Option<String>,
}

impl S3Credentials {
    fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            region: var("AWS_REGION"),
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
        }
    }
}

/// Load `httpfs` and apply S3 settings to `conn`.
pub(crate) fn configure_s3(conn: &Connection, s3: &S3Config) -> StoreResult<()> {
    conn.execute_batch("INSTALL httpfs; LOAD httpfs;")
        .map_err(|e| StoreError::RemoteError(format!("failed to load httpfs: {e}")))?;

    let creds = S3Credentials::from_env();
    if creds.access_key_id.is_none() || creds.secret_access_key.is_none() {
        log::warn!("AWS credentials not set; S3 requests will be unsigned");
    }
    conn.execute_batch(&s3_settings_sql(s3, &creds))
        .map_err(|e| StoreError::RemoteError(format!("failed to apply S3 settings: {e}")))?;
    log::debug!("Configured S3 access ({} style)", s3.url_style);
    Ok(())
}

/// `SET` statements for the S3 settings. Config region wins over the
/// environment.
pub(crate) fn s3_settings_sql(s3: &S3Config, creds: &S3Credentials) -> String {
    let region = s3
        .region
        .as_deref()
        .or(creds.region.as_deref())
        .unwrap_or(DEFAULT_REGION);

    let mut sql = format!(
        "SET s3_region = {};\nSET s3_url_style = {};\n",
        string_literal(region),
        string_literal(&s3.url_style)
    );
    if let (Some(key), Some(secret)) = (&creds.access_key_id, &creds.secret_access_key) {
        sql.push_str(&format!(
            "SET s3_access_key_id = {};\nSET s3_secret_access_key = {};\n",
            string_literal(key),
            string_literal(secret)
        ));
    }
    sql
}
