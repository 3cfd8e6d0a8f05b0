use super::output::print_user;
use anyhow::{Context, Result};
use feedline_application::FeedlineClient;
use feedline_core::user::{RegisterRequest, password_strength};
use std::io::{self, BufRead, Write};

/// Registration fields other than the password.
pub struct Registration {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub alias: String,
    pub date_of_birth: String,
}

fn read_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn login(client: &FeedlineClient, email: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password)?;
    let session = client.login(email, &password).await?;
    if let Some(user_id) = session.user_id {
        println!("Signed in as user {}", user_id);
    }
    Ok(())
}

pub async fn register(
    client: &FeedlineClient,
    fields: Registration,
    password: Option<String>,
) -> Result<()> {
    let password = read_password(password)?;
    tracing::debug!(strength = ?password_strength(&password), "Password strength");

    let request = RegisterRequest {
        email: fields.email,
        password,
        first_name: fields.first_name,
        last_name: fields.last_name,
        alias: fields.alias,
        date_of_birth: fields.date_of_birth,
    };
    let session = client.register(request).await?;
    if let Some(user_id) = session.user_id {
        println!("Account created; signed in as user {}", user_id);
    }
    Ok(())
}

pub async fn logout(client: &FeedlineClient) -> Result<()> {
    client.logout().await;
    println!("Signed out");
    Ok(())
}

/// Reports the state `start` restored; makes no further calls.
pub fn status(client: &FeedlineClient) -> Result<()> {
    let session = client.session().snapshot();
    match session.user_id {
        Some(user_id) if session.authenticated => println!("Signed in as user {}", user_id),
        _ => println!("Not signed in"),
    }
    Ok(())
}

pub async fn whoami(client: &FeedlineClient) -> Result<()> {
    let user = client.current_user().await?;
    print_user(&user);
    Ok(())
}
