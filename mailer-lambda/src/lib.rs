//! AWS backed collaborators for `template_mailer`.
//!
//! [`S3Store`] reads templates from and writes artifacts to Amazon S3,
//! [`SesMailer`] delivers messages through Amazon SES v2.

mod s3;
mod ses;

pub use crate::{s3::S3Store, ses::SesMailer};
