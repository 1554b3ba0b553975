// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use triangle_feed::error::{auth_codes, AppError, Notice};

fn blocking(notice: Notice) -> String {
    match notice {
        Notice::Blocking(msg) => msg,
        Notice::Silent => panic!("expected a blocking notice"),
    }
}

#[test]
fn test_bad_credentials_share_one_notice() {
    let expected = blocking(
        AppError::identity(auth_codes::INVALID_LOGIN_CREDENTIALS, "x").login_notice(),
    );
    assert!(expected.contains("Continue with Google"));

    for code in [auth_codes::INVALID_CREDENTIAL, auth_codes::WRONG_PASSWORD] {
        let err = AppError::identity(code, "whatever the provider says");
        assert_eq!(blocking(err.login_notice()), expected);
    }
}

#[test]
fn test_unknown_account_notices() {
    let err = AppError::identity(auth_codes::USER_NOT_FOUND, "x");
    assert_eq!(
        blocking(err.login_notice()),
        "No account found with this email. Please sign up."
    );

    let err = AppError::NotFound("User ID ravi".to_string());
    assert!(blocking(err.login_notice()).starts_with("User ID not found."));
}

#[test]
fn test_other_login_failures_show_the_message() {
    let err = AppError::identity("auth/too-many-requests", "Too many attempts");
    assert_eq!(blocking(err.login_notice()), "Login failed: Too many attempts");

    let err = AppError::Network("connection refused".to_string());
    assert_eq!(
        blocking(err.login_notice()),
        "Login failed: Network error: connection refused"
    );
}

#[test]
fn test_cancelled_popups_are_silent() {
    for code in [
        auth_codes::POPUP_CLOSED_BY_USER,
        auth_codes::CANCELLED_POPUP_REQUEST,
    ] {
        assert_eq!(AppError::identity(code, "x").popup_notice(), Notice::Silent);
    }
}

#[test]
fn test_signup_notices() {
    let err = AppError::identity(auth_codes::EMAIL_ALREADY_IN_USE, "x");
    assert_eq!(
        blocking(err.signup_notice()),
        "This email is already registered. Please login instead."
    );

    let err = AppError::BadRequest("Passwords do not match.".to_string());
    assert_eq!(
        blocking(err.signup_notice()),
        "Signup failed: Passwords do not match."
    );
}
