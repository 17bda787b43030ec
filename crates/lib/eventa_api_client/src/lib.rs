// @awa-component: API-EventaClient
//
//! # eventa_api_client
//!
//! Typed HTTP client for the Eventa REST API.
//!
//! [`EventaClient`] implements the backend traits from `eventa_core`. Every
//! request reads the current token from the client store and sends it as a
//! bearer credential; a missing token simply sends the request without one.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use eventa_core::backend::{AdminBackend, ApiError, AuthBackend, EventsBackend, SafetyBackend};
use eventa_core::config::ClientConfig;
use eventa_core::models::{
    ActivityEntry, AdminAnalytics, AdminNotification, Attendee, AuditLogEntry, Badge,
    CurrentUser, Event, EventUpdate, FinancialReport, LoginRequest, LoginResponse, ManagedUser,
    NewUser, SafetyAlert, SafetyStatistics, TimeRange, UserBadge, UserQuery, UserUpdate,
};
use eventa_core::safety::AlertFilter;
use eventa_core::store::TokenSource;

use error::{decode_list, error_from_response};

#[derive(Clone)]
pub struct EventaClient {
    http: Client,
    base: Url,
    base_label: String,
    tokens: Arc<dyn TokenSource>,
}

impl EventaClient {
    pub fn new(base: Url, tokens: Arc<dyn TokenSource>) -> Self {
        Self::with_http(Client::new(), base, tokens)
    }

    pub fn with_http(http: Client, base: Url, tokens: Arc<dyn TokenSource>) -> Self {
        let base_label = base.as_str().trim_end_matches('/').to_string();
        Self {
            http,
            base,
            base_label,
            tokens,
        }
    }

    pub fn from_config(
        config: &ClientConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(&config.api_url)?, tokens))
    }

    pub fn base_url(&self) -> &str {
        &self.base_label
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::Unreachable {
                base_url: self.base_label.clone(),
                message: "base URL cannot carry a path".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("{method} {url}");
        let builder = self.http.request(method, url);
        Ok(match self.tokens.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let resp = builder.send().await.map_err(|e| ApiError::Unreachable {
            base_url: self.base_label.clone(),
            message: e.to_string(),
        })?;
        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(error_from_response(resp).await)
        }
    }

    async fn read<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        resp.json()
            .await
            .map_err(|e| ApiError::Decode(format!("response parse error: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let resp = self.send(self.request(Method::GET, segments)?).await?;
        Self::read(resp).await
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let resp = self.send(builder).await?;
        let value: serde_json::Value = Self::read(resp).await?;
        decode_list(value, key)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.send(self.request(method, segments)?.json(body)).await?;
        Self::read(resp).await
    }

    /// Send a request whose response body is ignored.
    async fn call(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(|_| ())
    }
}

#[async_trait]
impl AuthBackend for EventaClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.send_json(
            Method::POST,
            &["auth", "login"],
            &LoginRequest { email, password },
        )
        .await
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.get(&["users", "profile"]).await
    }
}

#[async_trait]
impl EventsBackend for EventaClient {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        self.get_list(self.request(Method::GET, &["events"])?, "events")
            .await
    }

    async fn get_event(&self, id: &str) -> Result<Event, ApiError> {
        self.get(&["events", id]).await
    }

    async fn create_event(&self, event: &Event) -> Result<Event, ApiError> {
        self.send_json(Method::POST, &["events"], event).await
    }

    async fn update_event(&self, id: &str, changes: &EventUpdate) -> Result<(), ApiError> {
        self.call(self.request(Method::PUT, &["events", id])?.json(changes))
            .await
    }

    async fn delete_event(&self, id: &str) -> Result<(), ApiError> {
        self.call(self.request(Method::DELETE, &["events", id])?)
            .await
    }

    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>, ApiError> {
        self.get_list(
            self.request(Method::GET, &["events", event_id, "attendees"])?,
            "attendees",
        )
        .await
    }
}

#[async_trait]
impl SafetyBackend for EventaClient {
    async fn list_alerts(&self, filter: AlertFilter) -> Result<Vec<SafetyAlert>, ApiError> {
        let builder = self
            .request(Method::GET, &["safety", "admin", "alerts"])?
            .query(&filter.query_params());
        self.get_list(builder, "alerts").await
    }

    async fn live_feed(&self, limit: u32) -> Result<Vec<SafetyAlert>, ApiError> {
        let builder = self
            .request(Method::GET, &["safety", "admin", "feed"])?
            .query(&[("limit", limit)]);
        self.get_list(builder, "alerts").await
    }

    async fn unacknowledged_emergencies(&self) -> Result<Vec<SafetyAlert>, ApiError> {
        self.get_list(
            self.request(Method::GET, &["safety", "admin", "emergencies"])?,
            "alerts",
        )
        .await
    }

    async fn acknowledge_alert(&self, id: &str) -> Result<(), ApiError> {
        self.call(self.request(Method::POST, &["safety", "admin", "acknowledge", id])?)
            .await
    }

    async fn statistics(&self) -> Result<SafetyStatistics, ApiError> {
        self.get(&["safety", "admin", "statistics"]).await
    }
}

#[async_trait]
impl AdminBackend for EventaClient {
    async fn list_users(&self, query: &UserQuery) -> Result<Vec<ManagedUser>, ApiError> {
        let builder = self
            .request(Method::GET, &["admin", "users"])?
            .query(&query.query_params());
        self.get_list(builder, "users").await
    }

    async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.call(self.request(Method::POST, &["admin", "users"])?.json(user))
            .await
    }

    async fn update_user(&self, id: &str, changes: &UserUpdate) -> Result<(), ApiError> {
        self.call(self.request(Method::PUT, &["admin", "users", id])?.json(changes))
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.call(self.request(Method::DELETE, &["admin", "users", id])?)
            .await
    }

    async fn analytics(&self) -> Result<AdminAnalytics, ApiError> {
        self.get(&["admin", "analytics"]).await
    }

    async fn notifications(&self) -> Result<Vec<AdminNotification>, ApiError> {
        self.get_list(
            self.request(Method::GET, &["admin", "notifications"])?,
            "notifications",
        )
        .await
    }

    async fn activity(&self) -> Result<Vec<ActivityEntry>, ApiError> {
        self.get_list(self.request(Method::GET, &["admin", "activity"])?, "activity")
            .await
    }

    async fn financial(&self, range: TimeRange) -> Result<FinancialReport, ApiError> {
        let builder = self
            .request(Method::GET, &["admin", "financial"])?
            .query(&[("timeRange", range.as_str())]);
        let resp = self.send(builder).await?;
        Self::read(resp).await
    }

    async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, ApiError> {
        self.get_list(self.request(Method::GET, &["admin", "audit-logs"])?, "logs")
            .await
    }

    async fn list_badges(&self) -> Result<Vec<Badge>, ApiError> {
        self.get_list(self.request(Method::GET, &["admin", "badges"])?, "badges")
            .await
    }

    async fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>, ApiError> {
        self.get_list(
            self.request(Method::GET, &["admin", "users", user_id, "badges"])?,
            "badges",
        )
        .await
    }

    async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<(), ApiError> {
        self.call(self.request(
            Method::POST,
            &["admin", "users", user_id, "badges", badge_id],
        )?)
        .await
    }

    async fn remove_badge(&self, user_id: &str, badge_id: &str) -> Result<(), ApiError> {
        self.call(self.request(
            Method::DELETE,
            &["admin", "users", user_id, "badges", badge_id],
        )?)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl TokenSource for Fixed {
        fn token(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn client(base: &str) -> EventaClient {
        EventaClient::new(Url::parse(base).unwrap(), Arc::new(Fixed(None)))
    }

    #[test]
    fn endpoints_extend_the_base_path() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint(&["events", "e1"]).unwrap().as_str(),
            "http://localhost:5000/api/events/e1"
        );

        let trailing = client("http://localhost:5000/api/");
        assert_eq!(
            trailing.endpoint(&["users", "profile"]).unwrap().as_str(),
            "http://localhost:5000/api/users/profile"
        );
        assert_eq!(trailing.base_url(), "http://localhost:5000/api");
    }

    #[test]
    fn ids_are_escaped_as_one_segment() {
        let c = client("http://localhost:5000/api");
        assert_eq!(
            c.endpoint(&["events", "a/b c"]).unwrap().as_str(),
            "http://localhost:5000/api/events/a%2Fb%20c"
        );
    }

    #[test]
    fn from_config_uses_api_url() {
        let config = ClientConfig {
            api_url: "https://api.eventa.app/api".into(),
            ..Default::default()
        };
        let c = EventaClient::from_config(&config, Arc::new(Fixed(Some("t")))).unwrap();
        assert_eq!(c.base_url(), "https://api.eventa.app/api");
    }
}
