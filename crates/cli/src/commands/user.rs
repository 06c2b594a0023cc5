//! Operator lookups on user accounts.

use imagify_core::Email;
use imagify_server::db::UserRepository;

use super::{CommandError, connect};

/// Print a user's credit balance.
///
/// # Errors
///
/// Returns an error if the email is invalid, the user does not exist, or
/// the database is unreachable.
pub async fn credits(email: &str) -> Result<(), CommandError> {
    let email = Email::parse(email)?;
    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    #[allow(clippy::print_stdout)]
    {
        println!(
            "{} <{}> (id {}): {} credits",
            user.name, user.email, user.id, user.credit_balance
        );
    }

    Ok(())
}
