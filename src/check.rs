use crate::{AppError, AppResult};

/// Fails with `Unauthorized` unless someone is logged in.
pub fn logged_in<'a>(caller: Option<&'a str>, message: &'static str) -> AppResult<&'a str> {
    caller.ok_or(AppError::Unauthorized(message))
}

pub fn non_empty(field: &'static str, value: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::invalid(field, "must be a non-empty string"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_in_needs_a_caller() {
        assert_eq!(logged_in(Some("u1"), "login first").unwrap(), "u1");
        assert!(matches!(logged_in(None, "login first"), Err(AppError::Unauthorized("login first"))));
    }

    #[test]
    fn non_empty_rejects_empty() {
        assert!(non_empty("chatId", "abc").is_ok());
        assert!(matches!(
            non_empty("chatId", ""),
            Err(AppError::InvalidArgument { field: "chatId", .. })
        ));
    }
}
