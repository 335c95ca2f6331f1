//! Assignment-feed adapter: lists the user's enrolled courses, then the
//! upcoming graded items per course, on behalf of a caller-supplied bearer
//! token.

use reqwest::Client;
use serde::Deserialize;

use super::ClientError;

#[derive(Debug, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub course_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Absent for undated assignments; those cannot be scheduled and are
    /// dropped during normalization.
    pub due_at: Option<String>,
}

#[derive(Clone)]
pub struct LmsClient {
    client: Client,
    base_url: String,
}

impl LmsClient {
    pub fn with_shared_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Courses the token's owner is enrolled in as a student.
    pub async fn list_courses(&self, bearer_token: &str) -> Result<Vec<Course>, ClientError> {
        let url = format!("{}/api/v1/courses", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer_token)
            .query(&[
                ("enrollment_type", "student"),
                ("enrollment_state", "active"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        Ok(response.json().await?)
    }

    /// Upcoming graded items for one course, due date ascending.
    pub async fn list_upcoming_assignments(
        &self,
        bearer_token: &str,
        course_id: i64,
    ) -> Result<Vec<Assignment>, ClientError> {
        let url = format!("{}/api/v1/courses/{}/assignments", self.base_url, course_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer_token)
            .query(&[("bucket", "upcoming"), ("order_by", "due_at")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        Ok(response.json().await?)
    }
}
