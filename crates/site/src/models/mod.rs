//! Domain models for the form intake API.
//!
//! Each submission kind has two shapes:
//!
//! - a `New*` input, built from a raw JSON payload by running it through the
//!   kind's validation [`Schema`](crate::validation::Schema)
//! - a stored record, carrying the server-assigned id and creation timestamp
//!
//! Stored records serialize with camelCase keys, matching what the site's
//! front end submits.

pub mod contact;
pub mod course_enrollment;
pub mod job_application;
pub mod newsletter;
pub mod user;

pub use contact::{Contact, NewContact};
pub use course_enrollment::{CourseEnrollment, NewCourseEnrollment};
pub use job_application::{JobApplication, NewJobApplication};
pub use newsletter::{NewNewsletterSubscriber, NewsletterSubscriber};
pub use user::{NewUser, User};
