//! Calendar-feed adapter: lists the user's upcoming scheduled items from the
//! external calendar provider in a single call.

use reqwest::Client;
use serde::Deserialize;

use super::ClientError;

#[derive(Debug, Deserialize)]
pub struct AgendaItem {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<AgendaTime>,
}

#[derive(Debug, Deserialize)]
pub struct AgendaTime {
    /// Timed entries carry a dateTime; all-day entries only a date and are
    /// treated as unscheduled.
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AgendaListing {
    #[serde(default)]
    items: Vec<AgendaItem>,
}

#[derive(Clone)]
pub struct AgendaClient {
    client: Client,
    base_url: String,
}

impl AgendaClient {
    pub fn with_shared_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Upcoming items from the user's primary calendar, start time ascending.
    pub async fn list_upcoming(
        &self,
        bearer_token: &str,
        time_min: &str,
        max_results: u32,
    ) -> Result<Vec<AgendaItem>, ClientError> {
        let url = format!("{}/calendars/primary/events", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer_token)
            .query(&[
                ("timeMin", time_min),
                ("maxResults", &max_results.to_string()),
                ("orderBy", "startTime"),
                ("singleEvents", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let listing: AgendaListing = response.json().await?;
        Ok(listing.items)
    }
}
