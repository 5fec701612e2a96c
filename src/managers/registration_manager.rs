use rand::Rng;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::realtime::{SharedBroadcaster, ViewerEvent};
use crate::state::document::{current_millis, local_timestamp};
use crate::state::{SharedStore, User};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Handles attendee check-in
pub struct RegistrationManager {
    store: SharedStore,
    broadcaster: SharedBroadcaster,
}

impl RegistrationManager {
    pub fn new(store: SharedStore, broadcaster: SharedBroadcaster) -> Self {
        Self { store, broadcaster }
    }

    /// All checked-in users
    pub async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.snapshot().await?.users)
    }

    /// Users who have not won anything yet
    pub async fn available_users(&self) -> Result<Vec<User>> {
        let doc = self.store.snapshot().await?;
        Ok(doc.available_users().into_iter().cloned().collect())
    }

    /// Check in an attendee. A phone number can only check in once.
    pub async fn check_in(&self, phone: Option<&str>, name: Option<&str>) -> Result<User> {
        let (phone, name) = match (non_empty(phone), non_empty(name)) {
            (Some(phone), Some(name)) => (phone, name),
            _ => return Err(AppError::validation("Please enter phone number and name")),
        };

        let user = self
            .store
            .transact(|doc| {
                if let Some(existing) = doc.find_user_by_phone(phone) {
                    return Err(AppError::Duplicate {
                        user: Box::new(existing.clone()),
                    });
                }

                let user = User {
                    id: new_user_id(),
                    phone: phone.to_string(),
                    phone_mask: mask_phone(phone),
                    name: name.to_string(),
                    time: local_timestamp(),
                };
                doc.users.push(user.clone());
                Ok(user)
            })
            .await?;

        info!("User {} checked in ({})", user.name, user.phone_mask);
        self.broadcaster
            .broadcast(ViewerEvent::UserCheckin(user.clone()));
        Ok(user)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Redact the middle four digits of an 11-digit phone number.
///
/// Anything that is not exactly eleven ASCII digits is returned as-is.
pub fn mask_phone(phone: &str) -> String {
    if phone.len() == 11 && phone.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}****{}", &phone[..3], &phone[7..])
    } else {
        phone.to_string()
    }
}

/// `user_<millis>_<9 base-36 chars>`
fn new_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("user_{}_{}", current_millis(), suffix)
}

/// Shared registration manager type
pub type SharedRegistrationManager = Arc<RegistrationManager>;

pub fn create_shared_registration_manager(
    store: SharedStore,
    broadcaster: SharedBroadcaster,
) -> SharedRegistrationManager {
    Arc::new(RegistrationManager::new(store, broadcaster))
}
