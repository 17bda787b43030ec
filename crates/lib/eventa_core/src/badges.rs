//! Badge awards. Awarding a held badge or removing a missing one is a no-op.

use log::info;

use crate::backend::{AdminBackend, ApiError};
use crate::models::{Badge, BadgeChange, UserBadge};

pub async fn award<B: AdminBackend + ?Sized>(
    backend: &B,
    user_id: &str,
    badge_id: &str,
) -> Result<BadgeChange, ApiError> {
    match backend.award_badge(user_id, badge_id).await {
        Ok(()) => {
            info!("awarded badge {badge_id} to {user_id}");
            Ok(BadgeChange::Applied)
        }
        Err(ApiError::Conflict(_)) => Ok(BadgeChange::Unchanged),
        Err(e) => Err(e),
    }
}

pub async fn remove<B: AdminBackend + ?Sized>(
    backend: &B,
    user_id: &str,
    badge_id: &str,
) -> Result<BadgeChange, ApiError> {
    match backend.remove_badge(user_id, badge_id).await {
        Ok(()) => {
            info!("removed badge {badge_id} from {user_id}");
            Ok(BadgeChange::Applied)
        }
        Err(ApiError::NotFound(_)) => Ok(BadgeChange::Unchanged),
        Err(e) => Err(e),
    }
}

/// Catalogue entries with a flag for the ones `held` already contains.
pub fn annotate<'a>(catalogue: &'a [Badge], held: &[UserBadge]) -> Vec<(&'a Badge, bool)> {
    catalogue
        .iter()
        .map(|b| (b, held.iter().any(|h| h.badge_id == b.id)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::{
        ActivityEntry, AdminAnalytics, AdminNotification, AuditLogEntry, FinancialReport,
        ManagedUser, NewUser, TimeRange, UserQuery, UserUpdate,
    };

    /// Backend that answers 409/404 the way the real one does.
    #[derive(Default)]
    struct Awards {
        held: Mutex<BTreeSet<(String, String)>>,
    }

    #[async_trait]
    impl AdminBackend for Awards {
        async fn list_users(&self, _query: &UserQuery) -> Result<Vec<ManagedUser>, ApiError> {
            Ok(Vec::new())
        }
        async fn create_user(&self, _user: &NewUser) -> Result<(), ApiError> {
            Ok(())
        }
        async fn update_user(&self, _id: &str, _changes: &UserUpdate) -> Result<(), ApiError> {
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
        async fn award_badge(&self, user_id: &str, badge_id: &str) -> Result<(), ApiError> {
            if user_id == "ghost" {
                return Err(ApiError::NotFound("user not found".into()));
            }
            let fresh = self
                .held
                .lock()
                .unwrap()
                .insert((user_id.into(), badge_id.into()));
            if fresh {
                Ok(())
            } else {
                Err(ApiError::Conflict("badge already awarded".into()))
            }
        }
        async fn remove_badge(&self, user_id: &str, badge_id: &str) -> Result<(), ApiError> {
            let removed = self
                .held
                .lock()
                .unwrap()
                .remove(&(user_id.to_string(), badge_id.to_string()));
            if removed {
                Ok(())
            } else {
                Err(ApiError::NotFound("badge not held".into()))
            }
        }
    }

    #[tokio::test]
    async fn award_and_remove_are_idempotent() {
        let backend = Awards::default();
        assert_eq!(award(&backend, "u1", "vip").await, Ok(BadgeChange::Applied));
        assert_eq!(award(&backend, "u1", "vip").await, Ok(BadgeChange::Unchanged));
        assert_eq!(remove(&backend, "u1", "vip").await, Ok(BadgeChange::Applied));
        assert_eq!(remove(&backend, "u1", "vip").await, Ok(BadgeChange::Unchanged));
    }

    #[tokio::test]
    async fn award_to_unknown_user_fails() {
        let backend = Awards::default();
        assert!(matches!(
            award(&backend, "ghost", "vip").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn annotate_marks_held_badges() {
        let catalogue = vec![
            Badge {
                id: "vip".into(),
                name: "VIP".into(),
                description: None,
                icon: None,
            },
            Badge {
                id: "early".into(),
                name: "Early Bird".into(),
                description: None,
                icon: None,
            },
        ];
        let held = vec![UserBadge {
            user_id: "u1".into(),
            badge_id: "early".into(),
            awarded_at: None,
        }];
        let flags: Vec<bool> = annotate(&catalogue, &held).iter().map(|(_, h)| *h).collect();
        assert_eq!(flags, [false, true]);
    }
}
