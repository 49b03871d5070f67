//! Login, logout, and profile commands.

use std::io::Write;

use clap::Subcommand;
use nyraa_storefront::{AppError, Storefront};

#[derive(Subcommand)]
pub enum LoginAction {
    /// Request a one-time password by email
    Otp { email: String },
    /// Exchange an emailed code for a session
    Verify { email: String, code: String },
    /// Email/password login (password read from stdin)
    Password { email: String },
    /// Google sign-in with an OAuth ID token
    Google { credential: String },
    /// Trigger the password-reset email
    Forgot { email: String },
}

pub async fn login(app: &Storefront, action: LoginAction) -> Result<(), AppError> {
    let sessions = app.sessions();

    match action {
        LoginAction::Otp { email } => {
            sessions.request_otp(&email).await?;
            println!("One-time password sent to {email}.");
            println!("Complete login with: nyraa login verify {email} <code>");
        }
        LoginAction::Verify { email, code } => {
            let session = sessions.login_with_otp(&email, &code).await?;
            greet(&session.user);
        }
        LoginAction::Password { email } => {
            let password = prompt_password()?;
            let session = sessions.login_with_password(&email, &password).await?;
            greet(&session.user);
        }
        LoginAction::Google { credential } => {
            let session = sessions.login_with_google(&credential).await?;
            greet(&session.user);
        }
        LoginAction::Forgot { email } => {
            sessions.forgot_password(&email).await?;
            println!("Password reset instructions sent to {email}.");
        }
    }

    Ok(())
}

pub fn logout(app: &Storefront) -> Result<(), AppError> {
    app.sessions().logout()?;
    println!("Logged out.");
    Ok(())
}

pub async fn profile(app: &Storefront) -> Result<(), AppError> {
    let user = app.sessions().verify().await?;

    println!("Profile");
    if let Some(name) = &user.name {
        println!("  name:  {name}");
    }
    if let Some(email) = &user.email {
        println!("  email: {email}");
    }
    if let Some(phone) = &user.phone {
        println!("  phone: {phone}");
    }
    Ok(())
}

fn greet(user: &nyraa_storefront::models::UserProfile) {
    let who = user
        .name
        .clone()
        .or_else(|| user.email.as_ref().map(ToString::to_string))
        .unwrap_or_else(|| "back".to_string());
    println!("Logged in. Welcome, {who}!");
}

fn prompt_password() -> Result<String, AppError> {
    print!("Password: ");
    let _ = std::io::stdout().flush();

    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .map_err(|e| AppError::State(nyraa_storefront::store::StateError::Io(e)))?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
