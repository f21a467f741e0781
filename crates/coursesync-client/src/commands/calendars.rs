//! The `calendars` command.

use std::path::Path;

use coursesync_providers::CalendarClient;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Prints every calendar of the authorized account as `summary (id)`.
pub async fn list(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let calendar = super::google_calendar(config, config_path)?;
    let mut calendars = calendar.list_calendars().await?;
    calendars.sort_by(|a, b| b.is_primary.cmp(&a.is_primary).then(a.name.cmp(&b.name)));

    if calendars.is_empty() {
        println!("No calendars found.");
        return Ok(());
    }

    for info in &calendars {
        let marker = if info.is_primary { "  [primary]" } else { "" };
        let selected = if info.id == config.calendar_id
            || (info.is_primary && config.calendar_id == "primary")
        {
            "  <- sync target"
        } else {
            ""
        };
        println!("{} ({}){}{}", info.name, info.id, marker, selected);
    }
    Ok(())
}
