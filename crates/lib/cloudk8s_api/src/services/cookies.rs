//! Cookie service: the httpOnly cookie carrying the JWT.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Lifetime of the JWT cookie.
pub const JWT_COOKIE_MAX_AGE: Duration = Duration::hours(24);

/// Build the httpOnly, Secure, SameSite=Lax cookie holding `token`.
pub fn jwt_cookie(name: &str, token: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(JWT_COOKIE_MAX_AGE)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let cookie = jwt_cookie("goJWT_token", "a.b.c");
        assert_eq!(cookie.name(), "goJWT_token");
        assert_eq!(cookie.value(), "a.b.c");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::hours(24)));
    }
}
