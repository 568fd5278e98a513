use std::env;

use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub server_port: u16,
    /// Offset applied when turning timestamps into the calendar date users see.
    pub display_utc_offset_minutes: i32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            server_port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or_else(|| {
                    warn!("PORT not set or invalid, using default 3000");
                    3000
                }),
            display_utc_offset_minutes: env::var("DISPLAY_UTC_OFFSET_MINUTES")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(0),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.display_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                warn!(
                    "DISPLAY_UTC_OFFSET_MINUTES {} out of range, using UTC",
                    self.display_utc_offset_minutes
                );
                Utc.fix()
            })
    }

    /// Today's calendar date as seen by users of this deployment.
    pub fn local_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.display_offset()).date_naive()
    }
}
