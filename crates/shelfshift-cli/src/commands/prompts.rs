use color_eyre::Result;

/// Prompt for a password without echoing it.
pub fn prompt_password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        return Err(color_eyre::eyre::eyre!("Password cannot be empty"));
    }
    Ok(password)
}
