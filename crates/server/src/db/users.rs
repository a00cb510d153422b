//! User mutations.
//!
//! Email uniqueness is enforced against the case-folded index in the same
//! critical section as the write, so two concurrent creates with `a@b.com`
//! and `A@B.com` cannot both succeed.

use chrono::Utc;
use ordercast_core::{NewUser, User, UserId, UserPatch};

use super::{StoreError, StoreWriter};

impl StoreWriter<'_> {
    /// Insert a new user with the next id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateEmail`] if any user already owns the
    /// email, ignoring case. The id sequence does not advance on failure.
    pub fn create_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        let tables = &mut *self.tables;
        let key = new.email.normalized();

        if tables.emails.contains_key(&key) {
            return Err(StoreError::DuplicateEmail);
        }

        let id = UserId::new(tables.next_user_id);
        let next = tables
            .next_user_id
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted("user"))?;

        let now = Utc::now();
        let user = User {
            id,
            name: new.name,
            email: new.email,
            age: new.age,
            created_at: now,
            updated_at: now,
        };

        tables.next_user_id = next;
        tables.emails.insert(key, id);
        tables.users.insert(id, user.clone());

        Ok(user)
    }

    /// Apply a partial update and refresh `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] if the user does not exist, or
    /// [`StoreError::DuplicateEmail`] if the new email belongs to a different
    /// user. Changing only the casing of one's own email is allowed.
    pub fn update_user(&mut self, id: UserId, patch: UserPatch) -> Result<User, StoreError> {
        let tables = &mut *self.tables;
        let current = tables
            .users
            .get(&id)
            .ok_or(StoreError::UserNotFound(id))?;

        let old_key = current.email.normalized();
        let new_key = patch.email.as_ref().map(ordercast_core::Email::normalized);

        if let Some(key) = &new_key
            && let Some(owner) = tables.emails.get(key)
            && *owner != id
        {
            return Err(StoreError::DuplicateEmail);
        }

        let mut updated = current.clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(email) = patch.email {
            updated.email = email;
        }
        if let Some(age) = patch.age {
            updated.age = Some(age);
        }
        updated.updated_at = Utc::now();

        if let Some(key) = new_key
            && key != old_key
        {
            tables.emails.remove(&old_key);
            tables.emails.insert(key, id);
        }
        tables.users.insert(id, updated.clone());

        Ok(updated)
    }

    /// Remove a user and free their email. The id is never reissued.
    ///
    /// Orders that reference the user are left in place.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UserNotFound`] if the user does not exist.
    pub fn delete_user(&mut self, id: UserId) -> Result<User, StoreError> {
        let tables = &mut *self.tables;
        let user = tables
            .users
            .remove(&id)
            .ok_or(StoreError::UserNotFound(id))?;
        tables.emails.remove(&user.email.normalized());
        Ok(user)
    }
}
