//! In-memory storage for form submissions.
//!
//! # Collections
//!
//! - `contacts` - Contact form messages
//! - `newsletter_subscribers` - Newsletter signups (unique by exact email)
//! - `job_applications` - Careers page applications
//! - `course_enrollments` - Courses page enrollments
//! - `users` - Site users (unique by username)
//!
//! Each collection sits behind its own [`Mutex`]. Every create operation
//! takes the lock once and performs the duplicate check, id assignment and
//! insert under it, so overlapping requests never share an id. Nothing
//! under a lock awaits or performs I/O.
//!
//! Data lives for the lifetime of the process only.

mod table;

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::instrument;

use codevente_core::{ContactId, EnrollmentId, JobApplicationId, SubscriberId, UserId};

use crate::models::{
    Contact, CourseEnrollment, JobApplication, NewContact, NewCourseEnrollment, NewJobApplication,
    NewNewsletterSubscriber, NewUser, NewsletterSubscriber, User,
};

pub use table::{Record, Table};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The newsletter email is already subscribed.
    #[error("email already subscribed to newsletter")]
    DuplicateSubscriber,

    /// The username is already taken.
    #[error("username already taken")]
    UsernameTaken,

    /// A collection ran out of ids.
    #[error("no ids left in {0}")]
    IdsExhausted(&'static str),

    /// A previous holder of the collection lock panicked.
    #[error("lock poisoned for {0}")]
    Poisoned(&'static str),
}

/// Process-wide store for all submissions.
///
/// Construct one at startup and share it through
/// [`AppState`](crate::state::AppState).
#[derive(Debug, Default)]
pub struct FormStore {
    contacts: Mutex<Table<Contact>>,
    newsletter_subscribers: Mutex<Table<NewsletterSubscriber>>,
    job_applications: Mutex<Table<JobApplication>>,
    course_enrollments: Mutex<Table<CourseEnrollment>>,
    users: Mutex<Table<User>>,
}

impl FormStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Contacts
    // =========================================================================

    /// Store a contact message.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` or `StoreError::IdsExhausted` on
    /// internal failure; there is no uniqueness constraint.
    #[instrument(skip_all)]
    pub fn create_contact(&self, new: NewContact) -> Result<Contact, StoreError> {
        let mut contacts = lock(&self.contacts, "contacts")?;
        contacts
            .insert_with(|id, now| Contact::new(ContactId::new(id), now, new))
            .ok_or(StoreError::IdsExhausted("contacts"))
    }

    /// All contact messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(lock(&self.contacts, "contacts")?.newest_first())
    }

    // =========================================================================
    // Newsletter
    // =========================================================================

    /// Subscribe an email to the newsletter.
    ///
    /// The duplicate check is an exact, case-sensitive string comparison
    /// against every existing subscriber.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateSubscriber` if the email is already
    /// subscribed; nothing is inserted in that case.
    #[instrument(skip_all)]
    pub fn create_newsletter_subscription(
        &self,
        new: NewNewsletterSubscriber,
    ) -> Result<NewsletterSubscriber, StoreError> {
        let mut subscribers = lock(&self.newsletter_subscribers, "newsletter_subscribers")?;

        if subscribers.iter().any(|s| s.email == new.email) {
            return Err(StoreError::DuplicateSubscriber);
        }

        subscribers
            .insert_with(|id, now| NewsletterSubscriber::new(SubscriberId::new(id), now, new))
            .ok_or(StoreError::IdsExhausted("newsletter_subscribers"))
    }

    /// All newsletter subscribers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn list_newsletter_subscriptions(&self) -> Result<Vec<NewsletterSubscriber>, StoreError> {
        Ok(lock(&self.newsletter_subscribers, "newsletter_subscribers")?.newest_first())
    }

    // =========================================================================
    // Job applications
    // =========================================================================

    /// Store a job application.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` or `StoreError::IdsExhausted` on
    /// internal failure.
    #[instrument(skip_all)]
    pub fn create_job_application(
        &self,
        new: NewJobApplication,
    ) -> Result<JobApplication, StoreError> {
        let mut applications = lock(&self.job_applications, "job_applications")?;
        applications
            .insert_with(|id, now| JobApplication::new(JobApplicationId::new(id), now, new))
            .ok_or(StoreError::IdsExhausted("job_applications"))
    }

    /// All job applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn list_job_applications(&self) -> Result<Vec<JobApplication>, StoreError> {
        Ok(lock(&self.job_applications, "job_applications")?.newest_first())
    }

    // =========================================================================
    // Course enrollments
    // =========================================================================

    /// Store a course enrollment.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` or `StoreError::IdsExhausted` on
    /// internal failure.
    #[instrument(skip_all)]
    pub fn create_course_enrollment(
        &self,
        new: NewCourseEnrollment,
    ) -> Result<CourseEnrollment, StoreError> {
        let mut enrollments = lock(&self.course_enrollments, "course_enrollments")?;
        enrollments
            .insert_with(|id, now| CourseEnrollment::new(EnrollmentId::new(id), now, new))
            .ok_or(StoreError::IdsExhausted("course_enrollments"))
    }

    /// All course enrollments, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn list_course_enrollments(&self) -> Result<Vec<CourseEnrollment>, StoreError> {
        Ok(lock(&self.course_enrollments, "course_enrollments")?.newest_first())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Store a user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UsernameTaken` if a user with the same username
    /// already exists.
    #[instrument(skip_all, fields(username = %new.username))]
    pub fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = lock(&self.users, "users")?;

        if users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::UsernameTaken);
        }

        users
            .insert_with(|id, now| User::new(UserId::new(id), now, new))
            .ok_or(StoreError::IdsExhausted("users"))
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users, "users")?.get(id.as_i32()).cloned())
    }

    /// Get a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Poisoned` if the collection lock is poisoned.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(lock(&self.users, "users")?
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    collection: &'static str,
) -> Result<MutexGuard<'a, T>, StoreError> {
    mutex.lock().map_err(|_| {
        tracing::error!(collection, "Store lock poisoned");
        StoreError::Poisoned(collection)
    })
}

impl Record for Contact {
    fn raw_id(&self) -> i32 {
        self.id.as_i32()
    }

    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

impl Record for NewsletterSubscriber {
    fn raw_id(&self) -> i32 {
        self.id.as_i32()
    }

    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

impl Record for JobApplication {
    fn raw_id(&self) -> i32 {
        self.id.as_i32()
    }

    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

impl Record for CourseEnrollment {
    fn raw_id(&self) -> i32 {
        self.id.as_i32()
    }

    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

impl Record for User {
    fn raw_id(&self) -> i32 {
        self.id.as_i32()
    }

    fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.created_at
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use codevente_core::Email;

    use super::*;

    fn contact(name: &str) -> NewContact {
        NewContact {
            name: name.to_owned(),
            email: Email::parse("client@example.com").unwrap(),
            company: None,
            service: None,
            budget: None,
            message: "We would like a quote".to_owned(),
            newsletter: false,
        }
    }

    fn subscriber(email: &str) -> NewNewsletterSubscriber {
        NewNewsletterSubscriber {
            email: Email::parse(email).unwrap(),
        }
    }

    #[test]
    fn test_contact_ids_strictly_increase() {
        let store = FormStore::new();
        let mut last = 0;
        for i in 0..5 {
            let stored = store.create_contact(contact(&format!("client {i}"))).unwrap();
            assert!(stored.id.as_i32() > last);
            last = stored.id.as_i32();
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_list_contacts_newest_first() {
        let store = FormStore::new();
        store.create_contact(contact("A")).unwrap();
        store.create_contact(contact("B")).unwrap();
        store.create_contact(contact("C")).unwrap();

        let names: Vec<String> = store
            .list_contacts()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["C", "B", "A"]);
    }

    #[test]
    fn test_duplicate_subscriber_is_rejected_without_insert() {
        let store = FormStore::new();
        let first = store
            .create_newsletter_subscription(subscriber("a@b.com"))
            .unwrap();
        assert_eq!(first.id.as_i32(), 1);

        let second = store.create_newsletter_subscription(subscriber("a@b.com"));
        assert!(matches!(second, Err(StoreError::DuplicateSubscriber)));
        assert_eq!(store.list_newsletter_subscriptions().unwrap().len(), 1);

        // The failed attempt did not consume an id.
        let third = store
            .create_newsletter_subscription(subscriber("c@d.com"))
            .unwrap();
        assert_eq!(third.id.as_i32(), 2);
    }

    #[test]
    fn test_subscriber_match_is_case_sensitive() {
        let store = FormStore::new();
        store
            .create_newsletter_subscription(subscriber("a@b.com"))
            .unwrap();
        assert!(
            store
                .create_newsletter_subscription(subscriber("A@b.com"))
                .is_ok()
        );
        assert_eq!(store.list_newsletter_subscriptions().unwrap().len(), 2);
    }

    #[test]
    fn test_collections_have_independent_ids() {
        let store = FormStore::new();
        store.create_contact(contact("A")).unwrap();
        store.create_contact(contact("B")).unwrap();
        let sub = store
            .create_newsletter_subscription(subscriber("a@b.com"))
            .unwrap();
        assert_eq!(sub.id.as_i32(), 1);
    }

    #[test]
    fn test_users_by_id_and_username() {
        let store = FormStore::new();
        let user = store
            .create_user(NewUser {
                username: "admin".to_owned(),
                password_hash: "$argon2id$stub".to_owned(),
            })
            .unwrap();

        assert_eq!(store.get_user(user.id).unwrap().unwrap().username, "admin");
        assert_eq!(
            store.get_user_by_username("admin").unwrap().unwrap().id,
            user.id
        );
        assert!(store.get_user_by_username("Admin").unwrap().is_none());
        assert!(store.get_user(UserId::new(99)).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let store = FormStore::new();
        let new = NewUser {
            username: "admin".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
        };
        store.create_user(new.clone()).unwrap();
        assert!(matches!(
            store.create_user(new),
            Err(StoreError::UsernameTaken)
        ));
    }

    #[test]
    fn test_concurrent_creates_get_distinct_gapless_ids() {
        let store = Arc::new(FormStore::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            store
                                .create_contact(contact(&format!("{t}-{i}")))
                                .unwrap()
                                .id
                                .as_i32()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<i32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();

        assert_eq!(ids, (1..=200).collect::<Vec<_>>());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = Arc::new(FormStore::new());

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.contacts.lock().unwrap();
            panic!("poison the contacts lock");
        })
        .join();

        assert!(matches!(
            store.create_contact(contact("A")),
            Err(StoreError::Poisoned("contacts"))
        ));
        assert!(matches!(
            store.list_contacts(),
            Err(StoreError::Poisoned("contacts"))
        ));
    }
}
