use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::SameSite;

const FLASH_COOKIE: &str = "flash";

/// One-shot acknowledgments shown on the page after a redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    BookingCreated,
    LoggedOut,
}

impl Flash {
    fn key(&self) -> &'static str {
        match self {
            Flash::BookingCreated => "booking_created",
            Flash::LoggedOut => "logged_out",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "booking_created" => Some(Flash::BookingCreated),
            "logged_out" => Some(Flash::LoggedOut),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::BookingCreated => "Your booking has been successful!",
            Flash::LoggedOut => "You have signed out.",
        }
    }
}

pub fn set_flash(cookies: &Cookies, flash: Flash) {
    let mut cookie = Cookie::new(FLASH_COOKIE, flash.key());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookies.add(cookie);
}

/// Returns the pending flash, if any, and clears it.
pub fn take_flash(cookies: &Cookies) -> Option<Flash> {
    let flash = cookies.get(FLASH_COOKIE).and_then(|c| Flash::from_key(c.value()));
    if flash.is_some() {
        cookies.remove(Cookie::build((FLASH_COOKIE, "")).path("/").into());
    }
    flash
}
