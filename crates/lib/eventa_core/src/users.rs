//! User management: listing, account creation and role changes.

use log::info;
use thiserror::Error;

use crate::backend::{AdminBackend, ApiError};
use crate::models::{ManagedUser, NewUser, RoleSet, UserQuery, UserUpdate};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid user: {0}")]
    Invalid(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Users matching `query`. The role filter is applied locally too, so rows
/// the backend returns for a wider role never leak through.
pub async fn list<B: AdminBackend + ?Sized>(
    backend: &B,
    query: &UserQuery,
) -> Result<Vec<ManagedUser>, ApiError> {
    let users = backend.list_users(query).await?;
    Ok(users.into_iter().filter(|u| query.role.matches(u)).collect())
}

pub fn validate(user: &NewUser) -> Result<(), UserError> {
    if user.name.trim().is_empty() {
        return Err(UserError::Invalid("name is required".into()));
    }
    let email = user.email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => return Err(UserError::Invalid(format!("not an email address: {email}"))),
    }
    if user.password.is_empty() {
        return Err(UserError::Invalid("password is required".into()));
    }
    Ok(())
}

pub async fn create<B: AdminBackend + ?Sized>(
    backend: &B,
    user: &NewUser,
) -> Result<(), UserError> {
    validate(user)?;
    backend.create_user(user).await?;
    let roles = RoleSet {
        is_admin: user.is_admin,
        is_organizer: user.is_organizer,
    };
    info!("created user {} ({})", user.email, roles.label());
    Ok(())
}

/// Grant admin and organizer rights.
pub async fn promote<B: AdminBackend + ?Sized>(backend: &B, id: &str) -> Result<(), ApiError> {
    backend.update_user(id, &UserUpdate::promote()).await?;
    info!("promoted user {id}");
    Ok(())
}

/// Revoke admin rights.
pub async fn demote<B: AdminBackend + ?Sized>(backend: &B, id: &str) -> Result<(), ApiError> {
    backend.update_user(id, &UserUpdate::demote()).await?;
    info!("demoted user {id}");
    Ok(())
}

pub async fn delete<B: AdminBackend + ?Sized>(backend: &B, id: &str) -> Result<(), ApiError> {
    backend.delete_user(id).await?;
    info!("deleted user {id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{
        ActivityEntry, AdminAnalytics, AdminNotification, AuditLogEntry, Badge, FinancialReport,
        RoleFilter, TimeRange, UserBadge,
    };

    fn row(id: &str, is_admin: bool, is_organizer: bool) -> ManagedUser {
        ManagedUser {
            id: id.into(),
            name: id.into(),
            email: format!("{id}@eventa.com"),
            is_admin,
            is_organizer,
            phone: None,
            created_at: None,
        }
    }

    /// Records every write and returns all rows for any query.
    #[derive(Default)]
    struct Directory {
        created: Mutex<Vec<NewUser>>,
        updates: Mutex<Vec<(String, UserUpdate)>>,
    }

    #[async_trait]
    impl AdminBackend for Directory {
        async fn list_users(&self, _query: &UserQuery) -> Result<Vec<ManagedUser>, ApiError> {
            Ok(vec![
                row("ada", true, false),
                row("ola", false, true),
                row("kofi", false, false),
            ])
        }
        async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
            self.created.lock().unwrap().push(user.clone());
            Ok(())
        }
        async fn update_user(&self, id: &str, changes: &UserUpdate) -> Result<(), ApiError> {
            if id == "ghost" {
                return Err(ApiError::NotFound("User not found".into()));
            }
            self.updates
                .lock()
                .unwrap()
                .push((id.to_string(), changes.clone()));
            Ok(())
        }
        async fn delete_user(&self, _id: &str) -> Result<(), ApiError> {
            Ok(())
        }
        async fn analytics(&self) -> Result<AdminAnalytics, ApiError> {
            Ok(AdminAnalytics::default())
        }
        async fn notifications(&self) -> Result<Vec<AdminNotification>, ApiError> {
            Ok(Vec::new())
        }
        async fn activity(&self) -> Result<Vec<ActivityEntry>, ApiError> {
            Ok(Vec::new())
        }
        async fn financial(&self, _range: TimeRange) -> Result<FinancialReport, ApiError> {
            Ok(FinancialReport::default())
        }
        async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, ApiError> {
            Ok(Vec::new())
        }
        async fn list_badges(&self) -> Result<Vec<Badge>, ApiError> {
            Ok(Vec::new())
        }
        async fn user_badges(&self, _user_id: &str) -> Result<Vec<UserBadge>, ApiError> {
            Ok(Vec::new())
        }
        async fn award_badge(&self, _user_id: &str, _badge_id: &str) -> Result<(), ApiError> {
            Ok(())
        }
        async fn remove_badge(&self, _user_id: &str, _badge_id: &str) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn new_user(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn role_filter_applies_to_backend_rows() {
        let backend = Directory::default();
        let organizers = list(
            &backend,
            &UserQuery {
                search: None,
                role: RoleFilter::Organizer,
            },
        )
        .await
        .expect("list");
        assert_eq!(organizers.len(), 1);
        assert_eq!(organizers[0].id, "ola");

        let everyone = list(&backend, &UserQuery::default()).await.expect("list");
        assert_eq!(everyone.len(), 3);
    }

    #[tokio::test]
    async fn invalid_accounts_never_reach_the_backend() {
        let backend = Directory::default();
        for bad in [
            new_user(" ", "a@eventa.com", "pw"),
            new_user("Ama", "not-an-email", "pw"),
            new_user("Ama", "@eventa.com", "pw"),
            new_user("Ama", "ama@eventa.com", ""),
        ] {
            let err = create(&backend, &bad).await.unwrap_err();
            assert!(matches!(err, UserError::Invalid(_)), "{bad:?}");
        }
        assert!(backend.created.lock().unwrap().is_empty());

        create(&backend, &new_user("Ama", "ama@eventa.com", "s3cret"))
            .await
            .expect("create");
        assert_eq!(backend.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn promote_and_demote_send_role_flags() {
        let backend = Directory::default();
        promote(&backend, "kofi").await.expect("promote");
        demote(&backend, "ada").await.expect("demote");

        let updates = backend.updates.lock().unwrap();
        assert_eq!(updates[0], ("kofi".to_string(), UserUpdate::promote()));
        assert_eq!(updates[1], ("ada".to_string(), UserUpdate::demote()));
    }

    #[tokio::test]
    async fn missing_user_is_reported() {
        let err = promote(&Directory::default(), "ghost").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
