// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Page routing and access guards.

use std::fmt;

/// Pages of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Login,
    Signup,
    VerifyEmail,
    Index,
    Profile,
    Download,
    Search,
    Short,
    Settings,
    Long,
    Onboarding,
}

impl Page {
    /// Resolve a page from a URL path (last segment, query ignored).
    ///
    /// An empty path is the index. Unknown pages yield `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segment = path.rsplit('/').next().unwrap_or("");
        let name = segment.strip_suffix(".html").unwrap_or(segment);

        Some(match name {
            "" | "index" => Page::Index,
            "login" => Page::Login,
            "signup" => Page::Signup,
            "verify-email" => Page::VerifyEmail,
            "profile" => Page::Profile,
            "download" => Page::Download,
            "search" => Page::Search,
            "short" => Page::Short,
            "settings" => Page::Settings,
            "long" => Page::Long,
            "onboarding" => Page::Onboarding,
            _ => return None,
        })
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Page::Login => "login.html",
            Page::Signup => "signup.html",
            Page::VerifyEmail => "verify-email.html",
            Page::Index => "index.html",
            Page::Profile => "profile.html",
            Page::Download => "download.html",
            Page::Search => "search.html",
            Page::Short => "short.html",
            Page::Settings => "settings.html",
            Page::Long => "long.html",
            Page::Onboarding => "onboarding.html",
        }
    }

    /// Pages that run the post-sign-in session handling.
    pub fn is_auth_page(self) -> bool {
        matches!(self, Page::Login | Page::Signup | Page::VerifyEmail)
    }

    /// Pages that require a signed-in identity.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Page::Index
                | Page::Profile
                | Page::Download
                | Page::Search
                | Page::Short
                | Page::Settings
                | Page::Long
                | Page::Onboarding
        )
    }

    /// Pages that additionally require a stored profile.
    pub fn requires_profile(self) -> bool {
        matches!(self, Page::Short)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Where a signed-out visitor of `page` must go, if anywhere.
pub fn signed_out_redirect(page: Page) -> Option<Page> {
    page.is_protected().then_some(Page::Login)
}

/// Where a visitor without a stored profile must go, if anywhere.
pub fn missing_profile_redirect(page: Page, has_profile: bool) -> Option<Page> {
    (page.requires_profile() && !has_profile).then_some(Page::Login)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_path_handles_queries_and_directories() {
        assert_eq!(Page::from_path("/app/short.html?videoId=abc"), Some(Page::Short));
        assert_eq!(Page::from_path("/"), Some(Page::Index));
        assert_eq!(Page::from_path(""), Some(Page::Index));
        assert_eq!(Page::from_path("verify-email.html"), Some(Page::VerifyEmail));
        assert_eq!(Page::from_path("/nope.html"), None);
    }

    #[test]
    fn guards() {
        assert_eq!(signed_out_redirect(Page::Settings), Some(Page::Login));
        assert_eq!(signed_out_redirect(Page::Login), None);
        assert_eq!(missing_profile_redirect(Page::Short, false), Some(Page::Login));
        assert_eq!(missing_profile_redirect(Page::Short, true), None);
        assert_eq!(missing_profile_redirect(Page::Index, false), None);
    }
}
