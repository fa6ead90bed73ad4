//! Typed wrappers for the backend operations.

use crate::catalog::{AssessmentKind, Operation};
use crate::client::ApiClient;
use crate::errors::{ClientError, Result};
use crate::request::RequestDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Payload of a health endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy" | "up")
    }
}

impl ApiClient {
    /// Sends a catalog operation, with an optional JSON body.
    pub async fn call(&self, operation: Operation, body: Option<Value>) -> Result<Value> {
        let mut request = operation.request();
        request.body = body;
        self.execute(operation.service(), request).await
    }

    pub async fn register(&self, user: Value) -> Result<Value> {
        self.call(Operation::Register, Some(user)).await
    }

    pub async fn login(&self, credentials: Value) -> Result<Value> {
        self.call(Operation::Login, Some(credentials)).await
    }

    pub async fn profile(&self) -> Result<Value> {
        self.call(Operation::Profile, None).await
    }

    pub async fn update_profile(&self, profile: Value) -> Result<Value> {
        self.call(Operation::UpdateProfile, Some(profile)).await
    }

    pub async fn courses(&self) -> Result<Value> {
        self.call(Operation::ListCourses, None).await
    }

    pub async fn course(&self, course_id: &str) -> Result<Value> {
        self.call(Operation::GetCourse(course_id.into()), None).await
    }

    pub async fn modules(&self, course_id: &str) -> Result<Value> {
        self.call(Operation::ListModules(course_id.into()), None)
            .await
    }

    pub async fn lessons(&self, module_id: &str) -> Result<Value> {
        self.call(Operation::ListLessons(module_id.into()), None)
            .await
    }

    pub async fn lesson(&self, lesson_id: &str) -> Result<Value> {
        self.call(Operation::GetLesson(lesson_id.into()), None).await
    }

    pub async fn progress(&self) -> Result<Value> {
        self.call(Operation::GetProgress, None).await
    }

    pub async fn update_progress(&self, progress: Value) -> Result<Value> {
        self.call(Operation::UpdateProgress, Some(progress)).await
    }

    pub async fn course_progress(&self, course_id: &str) -> Result<Value> {
        self.call(Operation::GetCourseProgress(course_id.into()), None)
            .await
    }

    pub async fn assessment(&self, kind: AssessmentKind) -> Result<Value> {
        self.call(Operation::Assessment(kind), None).await
    }

    pub async fn submit_assessment(&self, kind: AssessmentKind, responses: Value) -> Result<Value> {
        self.call(
            Operation::SubmitAssessment(kind),
            Some(json!({ "responses": responses })),
        )
        .await
    }

    /// Opens a tutor chat session on the given topics.
    pub async fn chat_session(&self, topics: &[&str], context: Value) -> Result<Value> {
        self.call(
            Operation::ChatSession,
            Some(json!({ "topics": topics, "context": context })),
        )
        .await
    }

    pub async fn chat(&self, message: &str, session_id: Option<&str>) -> Result<Value> {
        let mut body = json!({ "message": message });
        if let Some(session_id) = session_id {
            body["session_id"] = Value::from(session_id);
        }
        self.call(Operation::Chat, Some(body)).await
    }

    pub async fn recommendations(&self) -> Result<Value> {
        self.call(Operation::Recommendations, None).await
    }

    pub async fn initialize_content(&self) -> Result<Value> {
        self.call(Operation::ContentInitialize, None).await
    }

    pub async fn health_check(&self) -> Result<HealthReport> {
        let body = self.call(Operation::HealthCheck, None).await?;
        parse_health(self, Operation::HealthCheck.service(), body)
    }

    /// Health of one service, probed at `<base>/health`.
    pub async fn service_health(&self, service: &str) -> Result<HealthReport> {
        let body = self
            .execute(service, RequestDescriptor::get("/health"))
            .await?;
        parse_health(self, service, body)
    }

    /// Health of every service known to the active environment, in configuration order.
    pub async fn all_service_health(&self) -> Vec<(String, Result<HealthReport>)> {
        let services: Vec<String> = self
            .resolver()
            .services()
            .into_iter()
            .map(String::from)
            .collect();

        let mut results = Vec::with_capacity(services.len());
        for service in services {
            let health = self.service_health(&service).await;
            results.push((service, health));
        }
        results
    }

    /// True if the backend health check answers successfully.
    pub async fn test_connection(&self) -> bool {
        match self.health_check().await {
            Ok(report) => {
                tracing::info!(status = %report.status, features = ?report.features, "backend connection successful");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "backend connection failed");
                false
            }
        }
    }
}

fn parse_health(client: &ApiClient, service: &str, body: Value) -> Result<HealthReport> {
    serde_json::from_value(body).map_err(|source| ClientError::Decode {
        url: client.resolver().health_url(service).unwrap_or_default(),
        source,
    })
}
