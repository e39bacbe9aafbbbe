// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::ids::Username;
use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: Username,
    pub token: Option<String>,
}

pub trait Authenticator {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError>;

    fn logout(&mut self) {}
}

impl<A: Authenticator + ?Sized> Authenticator for &mut A {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        (**self).login(username, password)
    }

    fn logout(&mut self) {
        (**self).logout();
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAuthenticator;

pub fn require_credentials(username: &str, password: &str) -> Result<(), StoreError> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(StoreError::validation(
            "Please enter username and password",
        ));
    }
    Ok(())
}

impl Authenticator for LocalAuthenticator {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        require_credentials(username, password)?;
        Ok(Session {
            username: Username::new(username.trim()),
            token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Authenticator, LocalAuthenticator};
    use crate::StoreError;

    #[test]
    fn local_login_needs_both_credentials() {
        let mut auth = LocalAuthenticator;
        for (user, pass) in [("", "secret"), ("admin", ""), ("  ", "x")] {
            let err = auth.login(user, pass).expect_err("missing credential");
            assert_eq!(
                err,
                StoreError::Validation("Please enter username and password".to_owned())
            );
        }

        let session = auth.login(" admin ", "secret").expect("login");
        assert_eq!(session.username.as_str(), "admin");
        assert_eq!(session.token, None);
    }
}
