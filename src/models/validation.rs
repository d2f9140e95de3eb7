use anyhow::{Result, anyhow};

const MIN_FCM_TOKEN_LEN: usize = 20;
const MAX_FCM_TOKEN_LEN: usize = 200;

pub fn validate_fcm_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(anyhow!("Device token cannot be empty"));
    }

    if token.len() < MIN_FCM_TOKEN_LEN {
        return Err(anyhow!(
            "Device token too short (minimum {} characters)",
            MIN_FCM_TOKEN_LEN
        ));
    }

    if token.len() > MAX_FCM_TOKEN_LEN {
        return Err(anyhow!(
            "Device token too long (maximum {} characters)",
            MAX_FCM_TOKEN_LEN
        ));
    }

    let valid_chars = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'));

    if !valid_chars {
        return Err(anyhow!("Device token contains invalid characters"));
    }

    Ok(())
}
