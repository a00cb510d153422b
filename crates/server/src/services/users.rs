//! User operations.

use ordercast_core::{EventKind, NewUser, User, UserId, UserPatch};
use tracing::instrument;

use super::{NotificationBus, ServiceError};
use crate::db::Store;

/// User operations over the shared store and bus.
pub struct UserService<'a> {
    store: &'a Store,
    bus: &'a NotificationBus,
}

impl<'a> UserService<'a> {
    #[must_use]
    pub const fn new(store: &'a Store, bus: &'a NotificationBus) -> Self {
        Self { store, bus }
    }

    /// All users in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<User> {
        self.store.list_users()
    }

    /// Look up one user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserNotFound` if the id is unknown.
    pub fn get(&self, id: UserId) -> Result<User, ServiceError> {
        Ok(self.store.get_user(id)?)
    }

    /// Create a user and broadcast `USER_CREATED`.
    ///
    /// The event is published before the store lock is released, so
    /// listeners observe creations in commit order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateEmail` if the email is taken. Nothing is
    /// published on failure.
    #[instrument(skip(self, new), fields(email = %new.email))]
    pub fn create(&self, new: NewUser) -> Result<User, ServiceError> {
        let mut writer = self.store.write();
        let user = writer.create_user(new)?;
        let delivery = self.bus.publish(EventKind::UserCreated, &user);
        drop(writer);

        tracing::info!(
            user_id = %user.id,
            delivered = delivery.delivered,
            skipped = delivery.skipped,
            "user created"
        );
        Ok(user)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserNotFound` or `StoreError::DuplicateEmail`.
    #[instrument(skip(self, patch), fields(id = %id, empty = patch.is_empty()))]
    pub fn update(&self, id: UserId, patch: UserPatch) -> Result<User, ServiceError> {
        let user = self.store.write().update_user(id, patch)?;
        tracing::info!("user updated");
        Ok(user)
    }

    /// Delete a user. Their orders remain.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UserNotFound` if the id is unknown.
    #[instrument(skip(self), fields(id = %id))]
    pub fn delete(&self, id: UserId) -> Result<User, ServiceError> {
        let user = self.store.write().delete_user(id)?;
        tracing::info!("user deleted");
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ordercast_core::Email;
    use serde_json::Value;

    use super::*;
    use crate::db::StoreError;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Alice".to_owned(),
            email: Email::parse(email).unwrap(),
            age: Some(30),
        }
    }

    #[test]
    fn test_create_publishes_full_record() {
        let store = Store::new();
        let bus = NotificationBus::new(8);
        let mut sub = bus.subscribe();

        let user = UserService::new(&store, &bus)
            .create(new_user("a@b.com"))
            .unwrap();

        let frame: Value = serde_json::from_str(&sub.frames.try_recv().unwrap()).unwrap();
        assert_eq!(frame["event"], "USER_CREATED");
        assert_eq!(frame["data"], serde_json::to_value(&user).unwrap());
        assert!(sub.frames.try_recv().is_err());
    }

    #[test]
    fn test_duplicate_create_publishes_nothing() {
        let store = Store::new();
        let bus = NotificationBus::new(8);
        let users = UserService::new(&store, &bus);
        users.create(new_user("a@b.com")).unwrap();

        let mut sub = bus.subscribe();
        let err = users.create(new_user("A@B.com")).unwrap_err();

        assert_eq!(err, ServiceError::Store(StoreError::DuplicateEmail));
        assert!(sub.frames.try_recv().is_err());
    }

    #[test]
    fn test_update_and_delete_are_silent() {
        let store = Store::new();
        let bus = NotificationBus::new(8);
        let users = UserService::new(&store, &bus);
        let user = users.create(new_user("a@b.com")).unwrap();

        let mut sub = bus.subscribe();
        users
            .update(
                user.id,
                UserPatch {
                    age: Some(31),
                    ..UserPatch::default()
                },
            )
            .unwrap();
        users.delete(user.id).unwrap();

        assert!(sub.frames.try_recv().is_err());
        assert_eq!(
            users.get(user.id),
            Err(ServiceError::Store(StoreError::UserNotFound(user.id)))
        );
        assert!(users.list().is_empty());
    }
}
